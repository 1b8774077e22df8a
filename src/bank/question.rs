use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::classify::AnswerKey;
use crate::engine::normalize::{MalformedOptionError, normalize};

/// Category and sub-category value for questions that carry none.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Bank identifier of a question. Banks use either JSON numbers or strings and
/// the progress table must hand back exactly what the bank holds, so both are
/// kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl QuestionId {
    /// Last two characters of the id, used in `year#NN` labels.
    pub fn short_label(&self) -> String {
        let full = self.to_string();
        let count = full.chars().count();
        full.chars().skip(count.saturating_sub(2)).collect()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

fn default_facet() -> String {
    UNCATEGORIZED.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub year: u32,
    pub subject: String,
    #[serde(default = "default_facet")]
    pub category: String,
    #[serde(default = "default_facet")]
    pub sub_category: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: AnswerKey,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn label(&self) -> String {
        format!("{}#{}", self.year, self.id.short_label())
    }

    pub fn option_token(&self, index: usize) -> Option<Result<char, MalformedOptionError>> {
        self.options.get(index).map(|text| normalize(text))
    }

    /// Index of the option labelled `letter`, matched case-insensitively.
    pub fn option_for(&self, letter: char) -> Option<usize> {
        let wanted = letter.to_uppercase().next()?;
        (0..self.options.len()).find(|&i| self.option_token(i) == Some(Ok(wanted)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandwritingQuestion {
    pub id: QuestionId,
    pub year: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::QuestionKind;

    #[test]
    fn ids_round_trip_as_numbers_or_strings() {
        let ids: Vec<QuestionId> = serde_json::from_str(r#"[11301, "chi-113-02"]"#).unwrap();
        assert_eq!(ids[0], QuestionId::Number(11301));
        assert_eq!(ids[1], QuestionId::Text("chi-113-02".to_string()));
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[11301,"chi-113-02"]"#);
    }

    #[test]
    fn short_label_takes_last_two_chars() {
        assert_eq!(QuestionId::Number(11307).short_label(), "07");
        assert_eq!(QuestionId::Number(5).short_label(), "5");
        assert_eq!(QuestionId::from("法-12").short_label(), "12");
    }

    #[test]
    fn missing_facets_default_to_uncategorized() {
        let q: Question = serde_json::from_str(
            r#"{"id": 1, "year": 113, "subject": "刑法", "question": "q",
                "options": ["(A) a", "(B) b"], "answer": "B"}"#,
        )
        .unwrap();
        assert_eq!(q.category, UNCATEGORIZED);
        assert_eq!(q.sub_category, UNCATEGORIZED);
        assert_eq!(q.explanation, "");
        assert_eq!(q.answer.kind(), QuestionKind::Single);
        assert_eq!(q.label(), "113#1");
        assert_eq!(q.option_token(1), Some(Ok('B')));
        assert_eq!(q.option_token(2), None);
        assert_eq!(q.option_for('b'), Some(1));
        assert_eq!(q.option_for('A'), Some(0));
        assert_eq!(q.option_for('D'), None);
    }

    #[test]
    fn handwriting_type_field_maps_to_kind() {
        let q: HandwritingQuestion = serde_json::from_str(
            r#"{"id": "hw-1", "year": 112, "type": "公文", "title": "t", "prompt": "p",
                "reference": "r"}"#,
        )
        .unwrap();
        assert_eq!(q.kind, "公文");
        assert!(q.requirements.is_none());
    }
}
