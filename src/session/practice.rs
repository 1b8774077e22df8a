use thiserror::Error;

use crate::bank::question::QuestionId;
use crate::engine::filter::ViewMode;
use crate::engine::grading::Verdict;
use crate::engine::normalize::MalformedOptionError;
use crate::store::progress::{ProgressStoreUnavailable, UserProgress};

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("no exam is open")]
    NoExam,
    #[error("question {0} is not in the open bank")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    MalformedOption(#[from] MalformedOptionError),
}

/// What happened to the persisted copy after a state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    NotNeeded,
    Saved,
    /// The write failed; in-memory progress is kept so the user can retry.
    Failed(String),
}

impl SaveStatus {
    pub fn from_result(result: Result<(), ProgressStoreUnavailable>) -> Self {
        match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Failed(e.to_string()),
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            SaveStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub verdict: Verdict,
    pub answer: String,
    pub explanation: String,
    pub missed_changed: bool,
    pub save: SaveStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoriteOutcome {
    pub is_favorite: bool,
    pub save: SaveStatus,
}

/// Apply a verdict to the missed set. A wrong answer adds the question; a
/// right answer removes it only while reviewing missed questions. Returns
/// whether the set changed and therefore needs saving.
pub fn record_verdict(
    progress: &mut UserProgress,
    id: &QuestionId,
    verdict: Verdict,
    mode: ViewMode,
) -> bool {
    match verdict {
        Verdict::Incorrect => progress.missed.insert(id.clone()),
        Verdict::Correct if mode == ViewMode::Missed => progress.missed.remove(id),
        Verdict::Correct => false,
    }
}
