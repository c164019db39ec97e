use crate::{App, log_util::log_debug};
use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

pub type QuestionId = u32;

/// A single multiple-choice question as stored in the bank files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "answers")]
    pub answer_options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl Question {
    /// Relative path of the illustration shown next to road-sign questions.
    pub fn sign_image_path(&self) -> Option<String> {
        (self.category == Category::Signs.label()).then(|| format!("signs/{}.png", self.id))
    }

    fn has_valid_answer(&self) -> bool {
        self.answer_options
            .iter()
            .filter(|option| **option == self.correct_answer)
            .count()
            == 1
    }
}

#[derive(Debug, Default, Deserialize)]
struct QuestionFile {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ar, Language::En, Language::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ar => "AR",
            Self::En => "EN",
            Self::Fr => "FR",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::RightToLeft,
            Self::En | Self::Fr => TextDirection::LeftToRight,
        }
    }

    pub fn file_name(self) -> String {
        format!("questions_{}.json", self.code())
    }

    pub fn next(self) -> Self {
        match self {
            Self::Ar => Self::En,
            Self::En => Self::Fr,
            Self::Fr => Self::Ar,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Ar => Self::Fr,
            Self::En => Self::Ar,
            Self::Fr => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = color_eyre::Report;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| eyre!("unknown language '{}' (expected one of ar, en, fr)", value))
    }
}

/// Closed set of category filters; `All` matches every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    All,
    Signs,
    Law,
    Safety,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Signs,
        Category::Law,
        Category::Safety,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Signs => "Signs",
            Self::Law => "Law",
            Self::Safety => "Safety",
        }
    }

    pub fn matches(self, question: &Question) -> bool {
        match self {
            Self::All => true,
            other => question.category == other.label(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Signs,
            Self::Signs => Self::Law,
            Self::Law => Self::Safety,
            Self::Safety => Self::All,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::All => Self::Safety,
            Self::Signs => Self::All,
            Self::Law => Self::Signs,
            Self::Safety => Self::Law,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = color_eyre::Report;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                eyre!(
                    "unknown category '{}' (expected one of All, Signs, Law, Safety)",
                    value
                )
            })
    }
}

/// Keep the questions that belong to `category`, preserving bank order.
pub fn filter_by_category(questions: &[Question], category: Category) -> Vec<Question> {
    questions
        .iter()
        .filter(|question| category.matches(question))
        .cloned()
        .collect()
}

/// Source of per-language question lists.
pub trait QuestionRepository {
    fn questions(&self, language: Language) -> &[Question];

    fn questions_for(&self, language: Language, category: Category) -> Vec<Question> {
        filter_by_category(self.questions(language), category)
    }
}

#[derive(Debug, Default, Clone)]
pub struct QuestionBank {
    by_language: HashMap<Language, Vec<Question>>,
}

#[derive(Debug)]
pub struct BankLoad {
    pub bank: QuestionBank,
    pub directory: PathBuf,
    pub error: Option<String>,
}

impl QuestionBank {
    pub fn from_questions(by_language: HashMap<Language, Vec<Question>>) -> Self {
        Self { by_language }
    }

    /// Load every supported language from `dir`. Languages whose file is
    /// missing or broken end up with an empty pool and a recorded error.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> BankLoad {
        let directory = dir.as_ref().to_path_buf();
        let mut by_language = HashMap::new();
        let mut error: Option<String> = None;

        for language in Language::ALL {
            let path = directory.join(language.file_name());
            match load_language_file(&path) {
                Ok(questions) => {
                    log_debug(&format!(
                        "Bank: loaded {} {} question(s) from {}",
                        questions.len(),
                        language.label(),
                        path.display()
                    ));
                    by_language.insert(language, questions);
                }
                Err(err) => {
                    App::push_error(&mut error, format!("{:#}", err));
                    by_language.insert(language, Vec::new());
                }
            }
        }

        BankLoad {
            bank: Self::from_questions(by_language),
            directory,
            error,
        }
    }

    pub fn len(&self, language: Language) -> usize {
        self.questions(language).len()
    }
}

impl QuestionRepository for QuestionBank {
    fn questions(&self, language: Language) -> &[Question] {
        self.by_language
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Parse one `questions_<code>.json` file, dropping questions whose correct
/// answer is not exactly one of their options.
pub fn load_language_file(path: &Path) -> Result<Vec<Question>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(eyre!("question bank not found at {}", path.display()));
        }
        Err(err) => {
            return Err(err)
                .wrap_err_with(|| format!("failed to read question bank {}", path.display()));
        }
    };

    let file: QuestionFile = serde_json::from_str(&contents)
        .wrap_err_with(|| format!("failed to parse question bank {}", path.display()))?;

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(file.questions.len());
    for question in file.questions {
        if !seen.insert(question.id) {
            return Err(eyre!(
                "duplicate question id {} in {}",
                question.id,
                path.display()
            ));
        }
        if !question.has_valid_answer() {
            log_debug(&format!(
                "Bank: dropped question {} from {}: correct answer is not a single listed option",
                question.id,
                path.display()
            ));
            continue;
        }
        questions.push(question);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn fixture_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
    }

    fn unique_temp_dir(label: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("drivetest-{label}-{unique}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn question(id: QuestionId, category: &str) -> Question {
        Question {
            id,
            category: category.to_string(),
            prompt: format!("prompt {id}"),
            answer_options: vec!["yes".to_string(), "no".to_string()],
            correct_answer: "yes".to_string(),
        }
    }

    #[test]
    fn category_filter_keeps_matching_questions_in_order() {
        let questions = vec![
            question(1, "Signs"),
            question(2, "Law"),
            question(3, "Signs"),
            question(4, "Safety"),
        ];

        let signs = filter_by_category(&questions, Category::Signs);
        assert_eq!(signs.iter().map(|q| q.id).collect::<Vec<_>>(), vec![1, 3]);

        let all = filter_by_category(&questions, Category::All);
        assert_eq!(all, questions);
    }

    #[test]
    fn category_filter_is_case_sensitive_on_question_tags() {
        let questions = vec![question(1, "signs"), question(2, "Parking")];
        assert!(filter_by_category(&questions, Category::Signs).is_empty());
        assert_eq!(filter_by_category(&questions, Category::All).len(), 2);
    }

    #[test]
    fn parses_known_selectors_and_rejects_others() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!(" AR ".parse::<Language>().unwrap(), Language::Ar);
        assert!("de".parse::<Language>().is_err());

        assert_eq!("safety".parse::<Category>().unwrap(), Category::Safety);
        assert!("Parking".parse::<Category>().is_err());
    }

    #[test]
    fn selectors_cycle_through_every_value() {
        let mut language = Language::Ar;
        for _ in 0..Language::ALL.len() {
            language = language.next();
        }
        assert_eq!(language, Language::Ar);
        assert_eq!(Language::Ar.previous(), Language::Fr);

        let mut category = Category::All;
        for _ in 0..Category::ALL.len() {
            category = category.next();
        }
        assert_eq!(category, Category::All);
        assert_eq!(Category::All.previous(), Category::Safety);
    }

    #[test]
    fn only_arabic_is_right_to_left() {
        assert_eq!(Language::Ar.direction(), TextDirection::RightToLeft);
        assert_eq!(Language::En.direction(), TextDirection::LeftToRight);
        assert_eq!(Language::Fr.direction(), TextDirection::LeftToRight);
    }

    #[test]
    fn sign_questions_point_at_their_image() {
        assert_eq!(
            question(12, "Signs").sign_image_path().as_deref(),
            Some("signs/12.png")
        );
        assert_eq!(question(12, "Law").sign_image_path(), None);
    }

    #[test]
    fn loads_fixture_bank_and_drops_invalid_answers() {
        let load = QuestionBank::load_dir(fixture_dir());

        let english = load.bank.questions(Language::En);
        assert_eq!(english.len(), 3);
        assert!(english.iter().all(|q| q.id != 99));
        assert_eq!(english[0].prompt, "What does a red octagonal sign mean?");
        assert_eq!(english[0].correct_answer, "Stop");

        assert_eq!(load.bank.len(Language::Fr), 2);
        assert!(load.bank.questions(Language::Ar).is_empty());
        let error = load.error.expect("missing arabic file is reported");
        assert!(error.contains("questions_ar.json"), "{error}");
    }

    #[test]
    fn repository_applies_category_filter() {
        let load = QuestionBank::load_dir(fixture_dir());
        let law = load.bank.questions_for(Language::En, Category::Law);
        assert_eq!(law.len(), 1);
        assert!(law.iter().all(|q| q.category == "Law"));
    }

    #[test]
    fn duplicate_ids_reject_the_file() {
        let dir = unique_temp_dir("duplicates");
        let path = dir.join("questions_en.json");
        fs::write(
            &path,
            r#"{"questions":[
                {"id":1,"category":"Law","question":"q","answers":["a","b"],"correctAnswer":"a"},
                {"id":1,"category":"Law","question":"q2","answers":["a","b"],"correctAnswer":"b"}
            ]}"#,
        )
        .unwrap();

        let err = load_language_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate question id 1"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_json_is_reported_with_path() {
        let dir = unique_temp_dir("malformed");
        let path = dir.join("questions_fr.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_language_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse question bank"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
