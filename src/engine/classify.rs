use std::fmt;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

/// Separators marking an answer key where more than one option is accepted.
pub const DISPUTED_SEPARATORS: [&str; 2] = ["或", "/"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Exactly one correct option.
    Single,
    /// Every listed letter must be chosen, no more and no less.
    Multiple,
    /// Single choice, but any one of several letters is accepted.
    Disputed,
}

impl QuestionKind {
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::Single => "single",
            QuestionKind::Multiple => "multi-select",
            QuestionKind::Disputed => "disputed",
        }
    }

    pub fn accepts_many(self) -> bool {
        matches!(self, QuestionKind::Multiple)
    }
}

/// Decide the kind of a question from the shape of its answer key.
///
/// Rules apply in order: a multi-character key without a separator is
/// `Multiple`; a key containing a separator is `Disputed`; anything else is
/// `Single`. A key like `"A或BC"` therefore lands on `Disputed`.
pub fn classify(answer_key: &str) -> QuestionKind {
    let has_separator = DISPUTED_SEPARATORS.iter().any(|sep| answer_key.contains(sep));
    if answer_key.chars().count() > 1 && !has_separator {
        QuestionKind::Multiple
    } else if has_separator {
        QuestionKind::Disputed
    } else {
        QuestionKind::Single
    }
}

/// A raw answer key together with its classification, computed once at load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AnswerKey {
    raw: String,
    kind: QuestionKind,
}

impl AnswerKey {
    /// Keys are NFKC-folded like option labels, so `"Ａ"` grades as `"A"`.
    pub fn new(raw: &str) -> Self {
        let folded = ComposingNormalizerBorrowed::new_nfkc().normalize(raw);
        let raw = folded.trim().to_string();
        let kind = classify(&raw);
        Self { raw, kind }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }
}

impl From<String> for AnswerKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<AnswerKey> for String {
    fn from(key: AnswerKey) -> Self {
        key.raw
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
