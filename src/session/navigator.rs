use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info};

use crate::bank::catalog::{ExamCatalog, ExamEntry};
use crate::bank::library::{BankLibrary, BankLoadError};
use crate::bank::question::{Question, QuestionId};
use crate::engine::filter::{Facet, Pool, PoolFilter, ViewMode, filter_pool, subject_years, subjects};
use crate::engine::grading::grade_options;
use crate::export::document::{PrintDocument, export_title};
use crate::session::context::SessionContext;
use crate::session::handwriting::HandwritingDrill;
use crate::session::practice::{
    AnswerOutcome, FavoriteOutcome, PracticeError, SaveStatus, record_verdict,
};
use crate::store::progress::ProgressStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    ExamSelect,
    SubjectSelect,
    Quiz,
    Handwriting,
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("no exam with prefix {0}")]
    UnknownExam(String),
    #[error("{0} has no handwriting bank")]
    NoHandwriting(String),
    #[error("no exam is open")]
    NoExam,
    #[error(transparent)]
    Bank(#[from] BankLoadError),
}

/// Owns the session: which screen is showing, the open bank and the
/// user's progress for the open exam. Every state change goes through here.
pub struct Navigator {
    catalog: ExamCatalog,
    library: BankLibrary,
    store: ProgressStore,
    ctx: SessionContext,
    screen: Screen,
    bank: Option<Rc<Vec<Question>>>,
    handwriting: Option<HandwritingDrill>,
}

impl Navigator {
    pub fn new(
        username: &str,
        catalog: ExamCatalog,
        library: BankLibrary,
        store: ProgressStore,
    ) -> Self {
        Self {
            catalog,
            library,
            store,
            ctx: SessionContext::new(username),
            screen: Screen::ExamSelect,
            bank: None,
            handwriting: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn exams(&self) -> &[ExamEntry] {
        &self.catalog.exams
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// Open an exam: load its bank and, when the prefix differs from what is
    /// in memory, the user's progress. Returns a warning when progress could
    /// not be read. A bank that fails to load leaves the session untouched.
    pub fn enter_exam(&mut self, prefix: &str) -> Result<Option<String>, NavigationError> {
        let exam = self
            .catalog
            .by_prefix(prefix)
            .cloned()
            .ok_or_else(|| NavigationError::UnknownExam(prefix.to_string()))?;
        let bank = self.library.questions(&exam.bank)?;

        let mut warning = None;
        if !self.ctx.has_progress_for(&exam.prefix) {
            let loaded = self.store.load(self.ctx.username(), &exam.prefix);
            warning = loaded.warning.map(|w| w.to_string());
            self.ctx.set_progress(&exam.prefix, loaded.progress);
        }

        info!(exam = %exam.name, questions = bank.len(), "exam opened");
        self.ctx.set_exam(exam);
        self.bank = Some(bank);
        self.handwriting = None;
        self.screen = Screen::SubjectSelect;
        Ok(warning)
    }

    pub fn subjects(&self) -> Vec<String> {
        self.bank.as_deref().map(|b| subjects(b)).unwrap_or_default()
    }

    pub fn enter_subject(&mut self, subject: &str) -> Result<(), NavigationError> {
        let bank = self.bank.as_ref().ok_or(NavigationError::NoExam)?;
        *self.ctx.filter_mut() = PoolFilter::for_subject(bank, subject);
        self.screen = Screen::Quiz;
        debug!(subject, "subject selected");
        Ok(())
    }

    pub fn open_handwriting(&mut self) -> Result<(), NavigationError> {
        let exam = self.ctx.exam().ok_or(NavigationError::NoExam)?;
        let file = exam
            .handwriting
            .clone()
            .ok_or_else(|| NavigationError::NoHandwriting(exam.name.clone()))?;
        let bank = self.library.handwriting(&file)?;
        self.handwriting = Some(HandwritingDrill::new(bank));
        self.screen = Screen::Handwriting;
        Ok(())
    }

    pub fn back(&mut self) {
        self.screen = match self.screen {
            Screen::Quiz | Screen::Handwriting => Screen::SubjectSelect,
            Screen::SubjectSelect | Screen::ExamSelect => {
                self.ctx.clear_exam();
                self.bank = None;
                self.handwriting = None;
                Screen::ExamSelect
            }
        };
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.ctx.set_mode(mode);
    }

    pub fn cycle_mode(&mut self) -> ViewMode {
        let mode = self.ctx.mode().next();
        self.ctx.set_mode(mode);
        mode
    }

    pub fn available_years(&self) -> Vec<u32> {
        match (&self.bank, self.ctx.subject()) {
            (Some(bank), Some(subject)) => subject_years(bank, subject),
            _ => Vec::new(),
        }
    }

    pub fn toggle_year(&mut self, year: u32) {
        let years = &mut self.ctx.filter_mut().years;
        if !years.remove(&year) {
            years.insert(year);
        }
    }

    pub fn set_years(&mut self, years: impl IntoIterator<Item = u32>) {
        self.ctx.filter_mut().years = years.into_iter().collect();
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.ctx.filter_mut().keyword = keyword.to_string();
    }

    /// Changing the category drops any sub-category selection.
    pub fn select_category(&mut self, category: Facet) {
        let filter = self.ctx.filter_mut();
        filter.category = category;
        filter.sub_category = Facet::All;
    }

    pub fn select_sub_category(&mut self, sub_category: Facet) {
        self.ctx.filter_mut().sub_category = sub_category;
    }

    pub fn pool(&self) -> Pool<'_> {
        let bank: &[Question] = self.bank.as_deref().map(Vec::as_slice).unwrap_or(&[]);
        filter_pool(bank, self.ctx.filter(), self.ctx.mode(), self.ctx.progress())
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.bank.as_deref()?.iter().find(|q| &q.id == id)
    }

    /// Grade a submission and persist the missed set when it changed.
    pub fn submit_answer<S: AsRef<str>>(
        &mut self,
        id: &QuestionId,
        selected: &[S],
    ) -> Result<AnswerOutcome, PracticeError> {
        let prefix = self.ctx.prefix().ok_or(PracticeError::NoExam)?.to_string();
        let question = self
            .question(id)
            .ok_or_else(|| PracticeError::UnknownQuestion(id.clone()))?;
        let verdict = grade_options(selected, &question.answer)?;
        let answer = question.answer.raw().to_string();
        let explanation = question.explanation.clone();

        let mode = self.ctx.mode();
        let missed_changed = record_verdict(self.ctx.progress_mut(), id, verdict, mode);
        let save = if missed_changed {
            self.persist(&prefix)
        } else {
            SaveStatus::NotNeeded
        };
        debug!(%id, ?verdict, missed_changed, "answer graded");

        Ok(AnswerOutcome {
            verdict,
            answer,
            explanation,
            missed_changed,
            save,
        })
    }

    pub fn toggle_favorite(&mut self, id: &QuestionId) -> Result<FavoriteOutcome, PracticeError> {
        let prefix = self.ctx.prefix().ok_or(PracticeError::NoExam)?.to_string();
        let is_favorite = self.ctx.progress_mut().toggle_favorite(id);
        let save = self.persist(&prefix);
        Ok(FavoriteOutcome { is_favorite, save })
    }

    /// Write the in-memory progress as it stands; used to retry after a
    /// failed save.
    pub fn save_now(&mut self) -> Result<SaveStatus, PracticeError> {
        let prefix = self.ctx.prefix().ok_or(PracticeError::NoExam)?.to_string();
        Ok(self.persist(&prefix))
    }

    pub fn handwriting(&self) -> Option<&HandwritingDrill> {
        self.handwriting.as_ref()
    }

    pub fn handwriting_mut(&mut self) -> Option<&mut HandwritingDrill> {
        self.handwriting.as_mut()
    }

    /// Mark the current handwriting prompt practiced, or unmark it. Practiced
    /// prompts share the exam's favorites set.
    pub fn toggle_practiced(&mut self) -> Result<Option<FavoriteOutcome>, PracticeError> {
        let id = self
            .handwriting
            .as_ref()
            .and_then(|d| d.current())
            .map(|q| q.id.clone());
        match id {
            Some(id) => self.toggle_favorite(&id).map(Some),
            None => Ok(None),
        }
    }

    /// The visible pool as a printable document titled after the view mode.
    pub fn print_document(&self) -> Option<PrintDocument> {
        let subject = self.ctx.subject()?;
        let title = export_title(self.ctx.mode(), self.ctx.username(), subject);
        Some(PrintDocument::new(title, &self.pool().questions))
    }

    fn persist(&self, prefix: &str) -> SaveStatus {
        SaveStatus::from_result(self.store.save(self.ctx.username(), prefix, self.ctx.progress()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grading::Verdict;
    use crate::store::memory::MemoryTable;

    fn navigator(backend: &MemoryTable) -> Navigator {
        let library = BankLibrary::new(None);
        let catalog = library.catalog().unwrap();
        let store = ProgressStore::new(Box::new(backend.clone()));
        Navigator::new("amy", catalog, library, store)
    }

    fn first_prefix(nav: &Navigator) -> String {
        nav.exams()[0].prefix.clone()
    }

    #[test]
    fn starts_on_exam_select() {
        let nav = navigator(&MemoryTable::default());
        assert_eq!(nav.screen(), Screen::ExamSelect);
        assert!(nav.context().exam().is_none());
        assert!(nav.pool().questions.is_empty());
    }

    #[test]
    fn unknown_exam_keeps_menu() {
        let mut nav = navigator(&MemoryTable::default());
        let err = nav.enter_exam("Nope").unwrap_err();
        assert!(matches!(err, NavigationError::UnknownExam(_)));
        assert_eq!(nav.screen(), Screen::ExamSelect);
    }

    #[test]
    fn entering_exam_loads_progress_once_per_prefix() {
        let backend = MemoryTable::default();
        let mut nav = navigator(&backend);
        let prefix = first_prefix(&nav);

        assert!(nav.enter_exam(&prefix).unwrap().is_none());
        assert_eq!(nav.screen(), Screen::SubjectSelect);
        assert!(nav.context().has_progress_for(&prefix));

        // A failing store is not consulted again for the same prefix.
        backend.fail_reads(true);
        nav.back();
        assert!(nav.enter_exam(&prefix).unwrap().is_none());
    }

    #[test]
    fn entering_exam_resets_mode() {
        let mut nav = navigator(&MemoryTable::default());
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        nav.set_mode(ViewMode::Missed);
        nav.back();
        nav.enter_exam(&prefix).unwrap();
        assert_eq!(nav.context().mode(), ViewMode::Normal);
    }

    #[test]
    fn load_failure_is_a_warning() {
        let backend = MemoryTable::default();
        backend.fail_reads(true);
        let mut nav = navigator(&backend);
        let prefix = first_prefix(&nav);
        let warning = nav.enter_exam(&prefix).unwrap();
        assert!(warning.is_some());
        assert_eq!(nav.screen(), Screen::SubjectSelect);
        assert_eq!(nav.context().progress().missed.len(), 0);
    }

    #[test]
    fn subject_selects_every_year() {
        let mut nav = navigator(&MemoryTable::default());
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        let subject = nav.subjects()[0].clone();
        nav.enter_subject(&subject).unwrap();
        assert_eq!(nav.screen(), Screen::Quiz);
        let years: Vec<u32> = nav.context().filter().years.iter().rev().copied().collect();
        assert_eq!(years, nav.available_years());
        assert!(!nav.pool().questions.is_empty());
    }

    #[test]
    fn keyword_is_matched_exactly_as_entered() {
        let mut nav = navigator(&MemoryTable::default());
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        let subject = nav.subjects()[0].clone();
        nav.enter_subject(&subject).unwrap();
        let all: Vec<QuestionId> = nav.pool().questions.iter().map(|q| q.id.clone()).collect();

        let first = nav.pool().questions[0].question.clone();
        let word: String = first.chars().take(2).collect();
        nav.set_keyword(&format!(" {word}"));
        assert_eq!(nav.context().filter().keyword, format!(" {word}"));
        let padded: Vec<QuestionId> = nav
            .pool()
            .questions
            .iter()
            .map(|q| q.id.clone())
            .collect();
        let expected: Vec<QuestionId> = all
            .iter()
            .filter(|id| {
                nav.question(id)
                    .is_some_and(|q| q.question.contains(&format!(" {word}")))
            })
            .cloned()
            .collect();
        assert_eq!(padded, expected);

        nav.set_keyword("");
        assert_eq!(nav.pool().questions.len(), all.len());
    }

    #[test]
    fn back_walks_up_to_exam_select() {
        let mut nav = navigator(&MemoryTable::default());
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        let subject = nav.subjects()[0].clone();
        nav.enter_subject(&subject).unwrap();
        nav.back();
        assert_eq!(nav.screen(), Screen::SubjectSelect);
        nav.back();
        assert_eq!(nav.screen(), Screen::ExamSelect);
        assert!(nav.context().exam().is_none());
    }

    #[test]
    fn wrong_answer_is_saved_as_missed() {
        let backend = MemoryTable::default();
        let mut nav = navigator(&backend);
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        let subject = nav.subjects()[0].clone();
        nav.enter_subject(&subject).unwrap();

        let question = nav.pool().questions[0].clone();
        let wrong = question
            .options
            .iter()
            .find(|o| {
                let token = crate::engine::normalize::normalize(o).unwrap();
                !question.answer.raw().contains(token)
            })
            .unwrap()
            .clone();

        let outcome = nav.submit_answer(&question.id, &[wrong]).unwrap();
        assert_eq!(outcome.verdict, Verdict::Incorrect);
        assert!(outcome.missed_changed);
        assert_eq!(outcome.save, SaveStatus::Saved);
        assert_eq!(backend.writes(), 1);
        assert!(nav.context().progress().is_missed(&question.id));
    }

    #[test]
    fn submit_without_exam_fails() {
        let mut nav = navigator(&MemoryTable::default());
        let err = nav.submit_answer(&QuestionId::Number(1), &["(A)"]).unwrap_err();
        assert!(matches!(err, PracticeError::NoExam));
    }

    #[test]
    fn failed_save_keeps_memory_state() {
        let backend = MemoryTable::default();
        let mut nav = navigator(&backend);
        let prefix = first_prefix(&nav);
        nav.enter_exam(&prefix).unwrap();
        backend.fail_writes(true);

        let id = QuestionId::Number(42);
        let outcome = nav.toggle_favorite(&id).unwrap();
        assert!(outcome.is_favorite);
        assert!(outcome.save.warning().is_some());
        assert!(nav.context().progress().is_favorite(&id));

        backend.fail_writes(false);
        assert_eq!(nav.save_now().unwrap(), SaveStatus::Saved);
    }

    #[test]
    fn handwriting_requires_a_bank() {
        let mut nav = navigator(&MemoryTable::default());
        let with_essays = nav
            .exams()
            .iter()
            .find(|e| e.has_handwriting())
            .map(|e| e.prefix.clone())
            .unwrap();
        nav.enter_exam(&with_essays).unwrap();
        nav.open_handwriting().unwrap();
        assert_eq!(nav.screen(), Screen::Handwriting);
        let outcome = nav.toggle_practiced().unwrap().unwrap();
        assert!(outcome.is_favorite);

        let without = nav
            .exams()
            .iter()
            .find(|e| !e.has_handwriting())
            .map(|e| e.prefix.clone())
            .unwrap();
        nav.back();
        nav.back();
        nav.enter_exam(&without).unwrap();
        assert!(matches!(
            nav.open_handwriting(),
            Err(NavigationError::NoHandwriting(_))
        ));
    }
}
