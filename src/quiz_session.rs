use crate::question_bank::{Question, QuestionId};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::collections::VecDeque;

/// Coarse phase of a [`QuizSession`], derived from its state on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The pool is empty; there is nothing to present.
    Idle,
    /// A question is on screen and waiting for an answer.
    Presenting,
    /// The current question has been answered and feedback is visible.
    Answered,
}

/// Outcome of an [`QuizSession::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The current question has not been answered yet, or there is none.
    Ignored,
    /// Moved on to the next question of the current pass.
    Next,
    /// The pass was exhausted and a freshly shuffled one began.
    NewPass,
}

/// Owns the question pool and the traversal state for a single language and
/// category selection. Rebuilt wholesale by [`QuizSession::reset`].
#[derive(Debug, Clone)]
pub struct QuizSession {
    pool: Vec<Question>,
    /// Identifiers still to present this pass; the front is the current question.
    pending_order: VecDeque<QuestionId>,
    correct_count: usize,
    selected_answer: Option<String>,
    answered: bool,
    rng: StdRng,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::reset(Vec::new())
    }
}

impl QuizSession {
    /// Start a session over `questions` with an OS-seeded shuffle.
    pub fn reset(questions: Vec<Question>) -> Self {
        Self::reset_with_rng(questions, StdRng::from_os_rng())
    }

    /// Start a session whose shuffles are reproducible for a given seed.
    pub fn reset_seeded(questions: Vec<Question>, seed: u64) -> Self {
        Self::reset_with_rng(questions, StdRng::seed_from_u64(seed))
    }

    fn reset_with_rng(questions: Vec<Question>, rng: StdRng) -> Self {
        let mut session = Self {
            pool: questions,
            pending_order: VecDeque::new(),
            correct_count: 0,
            selected_answer: None,
            answered: false,
            rng,
        };
        session.begin_pass();
        session
    }

    /// Record `answer` for the current question.
    ///
    /// Returns `false` without touching any state when the current question was
    /// already answered or there is no current question.
    pub fn submit_answer(&mut self, answer: &str) -> bool {
        if self.answered {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        let correct = question.correct_answer == answer;

        self.answered = true;
        self.selected_answer = Some(answer.to_string());
        if correct {
            self.correct_count += 1;
        }
        true
    }

    /// Move past the answered question, reshuffling the whole pool once the
    /// pass is exhausted. Unanswered questions cannot be skipped.
    pub fn advance(&mut self) -> Advance {
        if !self.answered {
            return Advance::Ignored;
        }

        self.pending_order.pop_front();
        self.answered = false;
        self.selected_answer = None;

        if self.pending_order.is_empty() && !self.pool.is_empty() {
            self.begin_pass();
            Advance::NewPass
        } else {
            Advance::Next
        }
    }

    fn begin_pass(&mut self) {
        let mut order: Vec<QuestionId> = self.pool.iter().map(|question| question.id).collect();
        order.shuffle(&mut self.rng);
        self.pending_order = order.into();
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current_question().is_none() {
            SessionPhase::Idle
        } else if self.answered {
            SessionPhase::Answered
        } else {
            SessionPhase::Presenting
        }
    }

    pub fn current_question_id(&self) -> Option<QuestionId> {
        self.pending_order.front().copied()
    }

    pub fn current_question(&self) -> Option<&Question> {
        let id = self.current_question_id()?;
        self.pool.iter().find(|question| question.id == id)
    }

    pub fn total_questions(&self) -> usize {
        self.pool.len()
    }

    /// 1-based position of the current question within the pass, or 0 when
    /// nothing is being presented.
    pub fn question_number(&self) -> usize {
        if self.current_question().is_none() {
            return 0;
        }
        self.total_questions() - self.pending_order.len() + 1
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn pending_ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.pending_order.iter().copied()
    }

    /// Immutable snapshot handed to the renderer after each transition.
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase: self.phase(),
            question: self.current_question(),
            question_number: self.question_number(),
            total_questions: self.total_questions(),
            correct_count: self.correct_count,
            selected_answer: self.selected_answer(),
            answered: self.answered,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub phase: SessionPhase,
    pub question: Option<&'a Question>,
    pub question_number: usize,
    pub total_questions: usize,
    pub correct_count: usize,
    pub selected_answer: Option<&'a str>,
    pub answered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn question(id: QuestionId, correct: &str) -> Question {
        Question {
            id,
            category: "Law".to_string(),
            prompt: format!("Question {id}"),
            answer_options: vec!["A".to_string(), "B".to_string(), "X".to_string()],
            correct_answer: correct.to_string(),
        }
    }

    fn pool(size: QuestionId) -> Vec<Question> {
        (1..=size).map(|id| question(id, "A")).collect()
    }

    fn answer_and_advance(session: &mut QuizSession) -> Advance {
        assert!(session.submit_answer("A"));
        session.advance()
    }

    #[test]
    fn reset_builds_a_permutation_of_the_pool() {
        let session = QuizSession::reset_seeded(pool(6), 7);

        let mut pending: Vec<QuestionId> = session.pending_ids().collect();
        pending.sort_unstable();
        assert_eq!(pending, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.selected_answer(), None);
        assert!(!session.is_answered());
        assert_eq!(session.phase(), SessionPhase::Presenting);
    }

    #[test]
    fn every_question_is_visited_once_per_pass() {
        for seed in 0..20 {
            let mut session = QuizSession::reset_seeded(pool(8), seed);
            let mut seen = HashSet::new();
            for _ in 0..8 {
                let id = session.current_question_id().expect("question in pass");
                assert!(seen.insert(id), "question {id} repeated within a pass");
                answer_and_advance(&mut session);
            }
            assert_eq!(seen.len(), 8);
        }
    }

    #[test]
    fn exhausting_a_pass_reshuffles_the_full_pool() {
        let mut session = QuizSession::reset_seeded(pool(4), 3);
        for _ in 0..3 {
            assert_eq!(answer_and_advance(&mut session), Advance::Next);
        }
        assert_eq!(answer_and_advance(&mut session), Advance::NewPass);

        let mut pending: Vec<QuestionId> = session.pending_ids().collect();
        pending.sort_unstable();
        assert_eq!(pending, vec![1, 2, 3, 4]);
        assert!(!session.is_answered());
        assert_eq!(session.selected_answer(), None);
    }

    #[test]
    fn second_submission_is_ignored() {
        let mut session = QuizSession::reset_seeded(pool(3), 11);
        assert!(session.submit_answer("A"));
        assert_eq!(session.correct_count(), 1);

        assert!(!session.submit_answer("B"));
        assert!(!session.submit_answer("A"));
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.selected_answer(), Some("A"));
    }

    #[test]
    fn tally_only_grows_on_exact_matches() {
        let mut session = QuizSession::reset_seeded(pool(5), 5);
        let answers = ["A", "a", "B", "A ", "A"];
        let mut expected = 0;
        for answer in answers {
            let before = session.correct_count();
            assert!(session.submit_answer(answer));
            if answer == "A" {
                expected += 1;
            }
            assert!(session.correct_count() >= before);
            assert_eq!(session.correct_count(), expected);
            session.advance();
        }
        assert_eq!(session.correct_count(), 2);
    }

    #[test]
    fn empty_reset_is_idle_and_inert() {
        let mut session = QuizSession::reset_seeded(Vec::new(), 1);

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.current_question().is_none());
        assert_eq!(session.question_number(), 0);
        assert_eq!(session.total_questions(), 0);

        assert!(!session.submit_answer("A"));
        assert_eq!(session.advance(), Advance::Ignored);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.pending_ids().count(), 0);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = QuizSession::reset_seeded(pool(3), 9);
        let current = session.current_question_id();

        assert_eq!(session.advance(), Advance::Ignored);
        assert_eq!(session.current_question_id(), current);
        assert_eq!(session.question_number(), 1);
    }

    #[test]
    fn question_number_tracks_progress_and_wraps() {
        let mut session = QuizSession::reset_seeded(pool(5), 42);
        assert_eq!(session.question_number(), 1);

        answer_and_advance(&mut session);
        answer_and_advance(&mut session);
        assert_eq!(session.question_number(), 3);
        assert_eq!(session.total_questions(), 5);

        answer_and_advance(&mut session);
        answer_and_advance(&mut session);
        assert_eq!(session.question_number(), 5);
        assert_eq!(answer_and_advance(&mut session), Advance::NewPass);
        assert_eq!(session.question_number(), 1);
    }

    #[test]
    fn two_question_walkthrough() {
        let questions = vec![question(1, "A"), question(2, "B")];
        let mut session = QuizSession::reset_seeded(questions, 0);

        let first = session.current_question().cloned().expect("first question");
        let second_id = if first.id == 1 { 2 } else { 1 };

        assert!(session.submit_answer(&first.correct_answer));
        assert!(session.is_answered());
        assert_eq!(session.phase(), SessionPhase::Answered);
        assert_eq!(session.correct_count(), 1);

        assert_eq!(session.advance(), Advance::Next);
        assert_eq!(session.current_question_id(), Some(second_id));
        assert!(!session.is_answered());
        assert_eq!(session.question_number(), 2);

        assert!(session.submit_answer("X"));
        assert!(session.is_answered());
        assert_eq!(session.correct_count(), 1);

        assert_eq!(session.advance(), Advance::NewPass);
        let mut pending: Vec<QuestionId> = session.pending_ids().collect();
        pending.sort_unstable();
        assert_eq!(pending, vec![1, 2]);
        assert_eq!(session.question_number(), 1);
    }

    #[test]
    fn view_mirrors_session_state() {
        let mut session = QuizSession::reset_seeded(pool(2), 4);
        session.submit_answer("B");

        let view = session.view();
        assert_eq!(view.phase, SessionPhase::Answered);
        assert_eq!(view.question.map(|q| q.id), session.current_question_id());
        assert_eq!(view.question_number, 1);
        assert_eq!(view.total_questions, 2);
        assert_eq!(view.correct_count, 0);
        assert_eq!(view.selected_answer, Some("B"));
        assert!(view.answered);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let a = QuizSession::reset_seeded(pool(10), 99);
        let b = QuizSession::reset_seeded(pool(10), 99);
        assert_eq!(
            a.pending_ids().collect::<Vec<_>>(),
            b.pending_ids().collect::<Vec<_>>()
        );
    }
}
