//! Reading-comprehension prompt: the request a learner makes and the context
//! it turns into for the built-in prompt template.

use std::fmt;

use chrono::NaiveDate;

use crate::context::Context;
use crate::template::Template;

/// Built-in prompt template
pub const PROMPT_TEMPLATE: &str = include_str!("../templates/french_reading_comprehension.hbs");

pub const MIN_QUESTIONS: u8 = 1;
pub const MAX_QUESTIONS: u8 = 20;
pub const DEFAULT_QUESTIONS: u8 = 8;

/// How demanding the questions should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of question the prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    Vocabulary,
    MainIdea,
    Detail,
    Inference,
}

impl QuestionType {
    /// Every type, in prompt order
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Vocabulary,
        QuestionType::MainIdea,
        QuestionType::Detail,
        QuestionType::Inference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Vocabulary => "vocabulary",
            QuestionType::MainIdea => "main_idea",
            QuestionType::Detail => "detail",
            QuestionType::Inference => "inference",
        }
    }
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Everything needed to build a question-generation prompt
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub text: String,
    pub difficulty: Difficulty,
    pub question_count: u8,
    pub focus: Option<String>,
    pub date: NaiveDate,
}

impl QuestionRequest {
    /// Defaults: intermediate, 8 questions, no focus, today's date in UTC
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            difficulty: Difficulty::default(),
            question_count: DEFAULT_QUESTIONS,
            focus: None,
            date: chrono::Utc::now().date_naive(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Clamped to `MIN_QUESTIONS..=MAX_QUESTIONS`
    pub fn with_question_count(mut self, count: u8) -> Self {
        self.question_count = count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
        self
    }

    /// A blank focus means no focus
    pub fn with_focus(mut self, focus: Option<String>) -> Self {
        self.focus = focus.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// A third of the questions, rounded up, when a grammar focus is set
    pub fn focus_question_count(&self) -> u8 {
        if self.focus.is_some() {
            self.question_count.div_ceil(3)
        } else {
            0
        }
    }

    /// Context for [`PROMPT_TEMPLATE`]
    pub fn context(&self) -> Context {
        let question_types: Vec<&str> = QuestionType::ALL.iter().map(|t| t.as_str()).collect();

        Context::new()
            .with("text", self.text.as_str())
            .with("difficulty", self.difficulty.as_str())
            .with("questionCount", u32::from(self.question_count))
            .with("wordCount", self.word_count())
            .with("questionTypes", question_types)
            .with("currentDate", self.date.format("%Y-%m-%d").to_string())
            .with("focusCategory", self.focus.clone().unwrap_or_default())
            .with("focusQuestionCount", u32::from(self.focus_question_count()))
    }

    /// Render `template` with this request's context
    pub fn render_prompt(&self, template: &Template) -> String {
        template.render(&self.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Value;

    fn request() -> QuestionRequest {
        QuestionRequest::new("Le chat dort sur le canapé.")
            .with_date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Le chat  dort\nsur le canapé."), 6);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_defaults() {
        let req = request();
        assert_eq!(req.difficulty, Difficulty::Intermediate);
        assert_eq!(req.question_count, 8);
        assert_eq!(req.focus, None);
    }

    #[test]
    fn test_default_date_is_utc_today() {
        let before = chrono::Utc::now().date_naive();
        let date = QuestionRequest::new("Il neige.").date;
        let after = chrono::Utc::now().date_naive();
        assert!(date == before || date == after, "{} not in {}..={}", date, before, after);
    }

    #[test]
    fn test_question_count_clamped() {
        assert_eq!(request().with_question_count(0).question_count, 1);
        assert_eq!(request().with_question_count(50).question_count, 20);
    }

    #[test]
    fn test_focus_question_count() {
        assert_eq!(request().focus_question_count(), 0);
        let focused = request().with_focus(Some("subjonctif".to_string()));
        assert_eq!(focused.focus_question_count(), 3);
        assert_eq!(focused.clone().with_question_count(9).focus_question_count(), 3);
        assert_eq!(focused.with_question_count(10).focus_question_count(), 4);
    }

    #[test]
    fn test_blank_focus_is_none() {
        assert_eq!(request().with_focus(Some("  ".to_string())).focus, None);
    }

    #[test]
    fn test_context_keys() {
        let ctx = request()
            .with_difficulty(Difficulty::Advanced)
            .with_focus(Some("passé_composé".to_string()))
            .context();

        assert_eq!(ctx.get("difficulty"), Some(&Value::from("advanced")));
        assert_eq!(ctx.get("questionCount"), Some(&Value::Integer(8)));
        assert_eq!(ctx.get("wordCount"), Some(&Value::Integer(6)));
        assert_eq!(ctx.get("currentDate"), Some(&Value::from("2026-03-14")));
        assert_eq!(ctx.get("focusCategory"), Some(&Value::from("passé_composé")));
        assert_eq!(ctx.get("focusQuestionCount"), Some(&Value::Integer(3)));
        assert_eq!(
            ctx.sequence("questionTypes").map(|s| s.len()),
            Some(QuestionType::ALL.len())
        );
    }

    #[test]
    fn test_no_focus_is_empty_flag() {
        let ctx = request().context();
        assert!(!ctx.is_truthy("focusCategory"));
        assert_eq!(ctx.get("focusQuestionCount"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_builtin_template_is_clean() {
        let template = Template::parse(PROMPT_TEMPLATE);
        assert!(template.diagnostics().is_empty(), "{:?}", template.diagnostics());
        assert!(template.unresolved(&request().context()).is_empty());
    }
}
