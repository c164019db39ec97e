use crate::view_managers::menu_manager::MENU_OPTIONS;
use crate::{
    App, AppView, config,
    question_bank::{Category, Language, TextDirection},
    quiz_session::SessionPhase,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, Wrap},
};

pub(crate) struct UiRenderer<'a> {
    app: &'a mut App,
}

impl<'a> UiRenderer<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn render(&mut self, frame: &mut Frame) {
        match self.app.view {
            AppView::Menu => self.render_menu(frame),
            AppView::Quiz => self.render_quiz(frame),
            AppView::Config => self.render_config(frame),
        }
    }

    fn header_title(app: &App) -> Line<'static> {
        Line::from(format!("Driving Test • {}", app.language.label()))
            .bold()
            .blue()
            .centered()
    }

    /// Header, body and a status panel tall enough for every status line.
    fn main_layout(
        frame: &Frame,
        status_lines: &[String],
    ) -> std::rc::Rc<[ratatui::layout::Rect]> {
        let status_height = u16::try_from(status_lines.len())
            .unwrap_or(u16::MAX)
            .clamp(3, 8)
            + 2;
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(status_height),
            ])
            .split(frame.area())
    }

    fn status_panel(lines: Vec<String>) -> Paragraph<'static> {
        Paragraph::new(lines.join("\n"))
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(Line::from("Status")))
    }

    fn render_menu(&mut self, frame: &mut Frame) {
        let app = &mut *self.app;

        let mut status_lines = Self::message_lines(app);
        status_lines.push(format!(
            "Questions loaded from {}: {}",
            app.questions_dir.display(),
            Language::ALL
                .iter()
                .map(|language| format!("{} {}", language.label(), app.bank.len(*language)))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        status_lines.push("Use ↑/↓ or j/k to choose. Press Enter to select.".to_string());
        status_lines
            .push("Press 1 or 2 for quick selection. Esc, Ctrl-C, or q to quit.".to_string());
        let layout = Self::main_layout(frame, &status_lines);

        frame.render_widget(
            Paragraph::new(Self::selector_lines(app))
                .block(Block::bordered().title(Self::header_title(app)))
                .centered(),
            layout[0],
        );

        let items: Vec<ListItem> = MENU_OPTIONS
            .iter()
            .map(|label| ListItem::new(*label))
            .collect();
        let mut menu_state = ListState::default();
        menu_state.select(Some(app.menu_index));

        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Menu")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            layout[1],
            &mut menu_state,
        );

        frame.render_widget(Self::status_panel(status_lines), layout[2]);
    }

    fn render_quiz(&mut self, frame: &mut Frame) {
        let app = &mut *self.app;
        let view = app.session.view();

        let mut status_lines = Self::message_lines(app);
        match view.phase {
            SessionPhase::Answered => {
                status_lines.push("Press n or Enter for the next question.".to_string())
            }
            SessionPhase::Presenting => status_lines.push(
                "Use ↑/↓ or j/k to choose, Enter to answer, or press 1-9 directly.".to_string(),
            ),
            SessionPhase::Idle => {
                status_lines.push("Pick another language or category.".to_string())
            }
        }
        status_lines.push(
            "←/→ or h/l switch language. Tab/Shift-Tab switch category. m menu, q quit."
                .to_string(),
        );
        let layout = Self::main_layout(frame, &status_lines);

        frame.render_widget(
            Paragraph::new(Self::selector_lines(app))
                .block(Block::bordered().title(Self::header_title(app)))
                .centered(),
            layout[0],
        );

        let alignment = text_alignment(app.language);
        let mut lines: Vec<Line> = Vec::new();

        if view.total_questions == 0 {
            lines.push(Line::from("No questions found for this category.").dark_gray());
        } else if let Some(question) = view.question {
            lines.push(
                Line::from(format!(
                    "Question {} from {}",
                    view.question_number, view.total_questions
                ))
                .bold()
                .cyan(),
            );
            lines.push(Line::from(vec![
                Span::raw(format!("Category: {}", question.category)),
                Span::raw("  •  "),
                Span::raw(format!("Correct Answers: {}", view.correct_count)).green(),
            ]));
            if let Some(image) = question.sign_image_path() {
                lines.push(Line::from(format!("Sign: {}", image)).italic());
            }
            lines.push(Line::default());
            lines.push(Line::from(question.prompt.clone()).bold());
            lines.push(Line::default());

            let cursor = app.option_index.min(question.answer_options.len().saturating_sub(1));
            for (index, option) in question.answer_options.iter().enumerate() {
                let is_correct = *option == question.correct_answer;
                let is_selected = view.selected_answer == Some(option.as_str());
                let marker = option_marker(view.answered, is_correct, is_selected);
                let prefix = if !view.answered && index == cursor {
                    "▶"
                } else {
                    " "
                };
                let mut style = option_style(view.answered, is_correct, is_selected);
                if !view.answered && index == cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                lines.push(Line::styled(
                    format!("{} {} {}. {}", prefix, marker, index + 1, option),
                    style,
                ));
            }

            if view.answered {
                lines.push(Line::default());
                if view.selected_answer == Some(question.correct_answer.as_str()) {
                    lines.push(Line::from("Correct!").green().bold());
                } else {
                    lines.push(
                        Line::from(format!(
                            "Incorrect. The correct answer is: {}",
                            question.correct_answer
                        ))
                        .red(),
                    );
                }
            }
        } else {
            lines.push(Line::from("Quiz complete!").dark_gray());
        }

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(alignment)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("Question"))),
            layout[1],
        );

        frame.render_widget(Self::status_panel(status_lines), layout[2]);
    }

    fn render_config(&mut self, frame: &mut Frame) {
        let app = &mut *self.app;

        let mut status_lines = Self::message_lines(app);
        status_lines.push("↑/↓ or j/k choose field. ←/→ or h/l cycle the value.".to_string());
        status_lines.push(
            "s save defaults, a play this selection now, r revert, m menu.".to_string(),
        );
        if app.config_form.dirty {
            status_lines.push("Unsaved changes".to_string());
        }
        if let Some(config_status) = &app.config_form.status {
            status_lines.push(config_status.clone());
        }
        let layout = Self::main_layout(frame, &status_lines);

        let config_path = config::config_file_path();
        let header_text = format!(
            "Config file: {}\nDefaults used when the trainer starts.",
            config_path.display()
        );

        frame.render_widget(
            Paragraph::new(header_text)
                .block(Block::bordered().title(Self::header_title(app)))
                .centered(),
            layout[0],
        );

        let items = vec![
            ListItem::new(format!(
                "Default language: {}",
                app.config_form.default_language.label()
            )),
            ListItem::new(format!(
                "Default category: {}",
                app.config_form.default_category.label()
            )),
            ListItem::new(format!(
                "Write debug log: {}",
                if app.config_form.write_debug_log {
                    "Enabled"
                } else {
                    "Disabled"
                }
            )),
        ];

        let mut list_state = ListState::default();
        list_state.select(Some(app.config_form.selected_index()));

        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Defaults")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            layout[1],
            &mut list_state,
        );

        frame.render_widget(Self::status_panel(status_lines), layout[2]);
    }

    fn selector_lines(app: &App) -> Vec<Line<'static>> {
        let languages = Language::ALL
            .iter()
            .map(|language| selector_span(language.label(), *language == app.language))
            .collect::<Vec<_>>();
        let categories = Category::ALL
            .iter()
            .map(|category| selector_span(category.label(), *category == app.category))
            .collect::<Vec<_>>();
        vec![Line::from(languages), Line::from(categories)]
    }

    fn message_lines(app: &App) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(error) = &app.error {
            lines.push(format!("Error: {}", error));
        }
        if let Some(status) = &app.status {
            lines.push(status.clone());
        }
        lines
    }
}

fn selector_span(label: &'static str, active: bool) -> Span<'static> {
    let text = format!(" {} ", label);
    if active {
        Span::styled(
            text,
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(text, Style::default().fg(Color::Gray))
    }
}

fn text_alignment(language: Language) -> Alignment {
    match language.direction() {
        TextDirection::RightToLeft => Alignment::Right,
        TextDirection::LeftToRight => Alignment::Left,
    }
}

fn option_marker(answered: bool, is_correct: bool, is_selected: bool) -> &'static str {
    match (answered, is_correct, is_selected) {
        (true, true, _) => "[✓]",
        (true, false, true) => "[✗]",
        _ => "[ ]",
    }
}

fn option_style(answered: bool, is_correct: bool, is_selected: bool) -> Style {
    match (answered, is_correct, is_selected) {
        (false, _, _) => Style::default(),
        (true, true, _) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        (true, false, true) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        (true, false, false) => Style::default().fg(Color::DarkGray),
    }
}
