pub mod generator;
pub mod session;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    /// Only populated for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Mcq,
    Fill,
    OneWord,
}

impl Question {
    pub fn new(kind: QuestionKind, question: String, answer: String, explanation: String) -> Self {
        Self {
            kind,
            question,
            options: Vec::new(),
            answer,
            explanation,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}
