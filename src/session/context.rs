use crate::bank::catalog::ExamEntry;
use crate::engine::filter::{PoolFilter, ViewMode};
use crate::store::progress::UserProgress;

/// Everything the active session has selected so far. Owned and mutated by
/// the `Navigator`; everyone else reads it through the accessors.
#[derive(Clone, Debug)]
pub struct SessionContext {
    username: String,
    exam: Option<ExamEntry>,
    mode: ViewMode,
    filter: PoolFilter,
    progress: UserProgress,
    loaded_prefix: Option<String>,
}

impl SessionContext {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            exam: None,
            mode: ViewMode::Normal,
            filter: PoolFilter::default(),
            progress: UserProgress::default(),
            loaded_prefix: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn exam(&self) -> Option<&ExamEntry> {
        self.exam.as_ref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.exam.as_ref().map(|e| e.prefix.as_str())
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn filter(&self) -> &PoolFilter {
        &self.filter
    }

    pub fn subject(&self) -> Option<&str> {
        if self.filter.subject.is_empty() {
            None
        } else {
            Some(&self.filter.subject)
        }
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    /// Whether progress for `prefix` is already in memory.
    pub fn has_progress_for(&self, prefix: &str) -> bool {
        self.loaded_prefix.as_deref() == Some(prefix)
    }

    pub(crate) fn set_exam(&mut self, exam: ExamEntry) {
        self.exam = Some(exam);
        self.mode = ViewMode::Normal;
        self.filter = PoolFilter::default();
    }

    pub(crate) fn clear_exam(&mut self) {
        self.exam = None;
        self.filter = PoolFilter::default();
    }

    pub(crate) fn set_progress(&mut self, prefix: &str, progress: UserProgress) {
        self.progress = progress;
        self.loaded_prefix = Some(prefix.to_string());
    }

    pub(crate) fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub(crate) fn filter_mut(&mut self) -> &mut PoolFilter {
        &mut self.filter
    }

    pub(crate) fn progress_mut(&mut self) -> &mut UserProgress {
        &mut self.progress
    }
}
