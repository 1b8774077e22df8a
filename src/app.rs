use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use examdrill::bank::question::QuestionId;
use examdrill::config::Config;
use examdrill::engine::filter::{Facet, FacetCount};
use examdrill::export::text::PlainTextRenderer;
use examdrill::export::write_export;
use examdrill::session::{AnswerOutcome, Navigator, SaveStatus, Screen};

use crate::ui::components::filter_panel::FilterRow;
use crate::ui::components::menu::{Menu, MenuItem};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

const HANDWRITING_KEY: &str = "h";
const INFO_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Question,
    Filters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
    pub at: Instant,
}

/// Next or previous entry of a facet chooser, wrapping at both ends.
pub fn cycle_facet(counts: &[FacetCount], current: &Facet, forward: bool) -> Facet {
    if counts.is_empty() {
        return Facet::All;
    }
    let len = counts.len();
    let i = counts.iter().position(|fc| &fc.facet == current).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    counts[next].facet.clone()
}

pub struct App {
    pub nav: Navigator,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub focus: Focus,
    pub filter_row: FilterRow,
    pub year_cursor: usize,
    pub question_index: usize,
    pub selected: BTreeSet<usize>,
    /// Feedback for the last graded question, keyed by its id.
    pub outcome: Option<(QuestionId, AnswerOutcome)>,
    pub keyword_input: Option<LineInput>,
    pub draft_input: Option<LineInput>,
    pub show_reference: bool,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, nav: Navigator, theme: &'static Theme) -> Self {
        let mut app = Self {
            nav,
            menu: Menu::new(theme),
            theme,
            config,
            focus: Focus::Question,
            filter_row: FilterRow::Mode,
            year_cursor: 0,
            question_index: 0,
            selected: BTreeSet::new(),
            outcome: None,
            keyword_input: None,
            draft_input: None,
            show_reference: false,
            status: None,
            should_quit: false,
        };
        app.refresh_menu();
        app
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
            at: Instant::now(),
        });
    }

    /// Drop informational messages once they have been visible for a while.
    pub fn expire_status(&mut self) {
        if let Some(status) = &self.status {
            if status.kind == StatusKind::Info && status.at.elapsed() > INFO_TTL {
                self.status = None;
            }
        }
    }

    fn report_save(&mut self, save: &SaveStatus, saved_text: &str) {
        match save {
            SaveStatus::Failed(msg) => {
                self.set_status(StatusKind::Warning, format!("{msg} (press w to retry)"))
            }
            SaveStatus::Saved => self.set_status(StatusKind::Info, saved_text),
            SaveStatus::NotNeeded => {}
        }
    }

    // --- menus ---

    pub fn refresh_menu(&mut self) {
        match self.nav.screen() {
            Screen::ExamSelect => {
                let items = self
                    .nav
                    .exams()
                    .iter()
                    .enumerate()
                    .map(|(i, exam)| {
                        MenuItem::new(
                            &(i + 1).to_string(),
                            &format!("{} {}", exam.icon, exam.name).trim().to_string(),
                            &format!("progress columns {} / {}", exam.favorites_column(), exam.missed_column()),
                        )
                    })
                    .collect();
                let subtitle = format!("{} · {}", self.nav.context().username(), self.nav.store_description());
                self.menu.set_items("examdrill", &subtitle, items);
            }
            Screen::SubjectSelect => {
                let mut items: Vec<MenuItem> = self
                    .nav
                    .subjects()
                    .iter()
                    .enumerate()
                    .map(|(i, subject)| MenuItem::new(&(i + 1).to_string(), subject, "multiple choice"))
                    .collect();
                let exam = self.nav.context().exam();
                if exam.is_some_and(|e| e.has_handwriting()) {
                    items.push(MenuItem::new(HANDWRITING_KEY, "Handwriting", "essay and document prompts"));
                }
                let title = exam.map(|e| e.name.clone()).unwrap_or_default();
                self.menu.set_items(&title, "choose a subject", items);
            }
            Screen::Quiz | Screen::Handwriting => {}
        }
    }

    pub fn activate_menu(&mut self, index: usize) {
        let Some(item) = self.menu.items.get(index).cloned() else {
            return;
        };
        match self.nav.screen() {
            Screen::ExamSelect => {
                let Some(prefix) = self.nav.exams().get(index).map(|e| e.prefix.clone()) else {
                    return;
                };
                match self.nav.enter_exam(&prefix) {
                    Ok(Some(warning)) => self.set_status(StatusKind::Warning, warning),
                    Ok(None) => self.status = None,
                    Err(e) => self.set_status(StatusKind::Error, e.to_string()),
                }
                self.refresh_menu();
            }
            Screen::SubjectSelect if item.key == HANDWRITING_KEY => {
                match self.nav.open_handwriting() {
                    Ok(()) => {
                        self.show_reference = false;
                        self.draft_input = None;
                    }
                    Err(e) => self.set_status(StatusKind::Error, e.to_string()),
                }
            }
            Screen::SubjectSelect => match self.nav.enter_subject(&item.label) {
                Ok(()) => {
                    self.focus = Focus::Question;
                    self.filter_row = FilterRow::Mode;
                    self.year_cursor = 0;
                    self.reset_question();
                }
                Err(e) => self.set_status(StatusKind::Error, e.to_string()),
            },
            Screen::Quiz | Screen::Handwriting => {}
        }
    }

    pub fn go_back(&mut self) {
        if self.nav.screen() == Screen::Handwriting {
            self.commit_draft();
        }
        self.nav.back();
        self.keyword_input = None;
        self.reset_question();
        self.refresh_menu();
    }

    // --- quiz ---

    fn reset_question(&mut self) {
        self.question_index = 0;
        self.selected.clear();
    }

    pub fn current_question_id(&self) -> Option<QuestionId> {
        let pool = self.nav.pool();
        let index = self.question_index.min(pool.questions.len().saturating_sub(1));
        pool.questions.get(index).map(|q| q.id.clone())
    }

    /// The pool shrinks when a missed question is cleared or a filter
    /// changes; keep the index pointing at a real question.
    pub fn clamp_index(&mut self) {
        let len = self.nav.pool().questions.len();
        if self.question_index >= len {
            self.question_index = len.saturating_sub(1);
        }
    }

    pub fn next_question(&mut self) {
        let len = self.nav.pool().questions.len();
        if self.question_index + 1 < len {
            self.question_index += 1;
            self.selected.clear();
        }
    }

    pub fn prev_question(&mut self) {
        if self.question_index > 0 {
            self.question_index -= 1;
            self.selected.clear();
        }
    }

    /// Select option `index`. Multi-select questions toggle and wait for
    /// Enter; the others are graded straight away.
    pub fn pick_option(&mut self, index: usize) {
        let Some(id) = self.current_question_id() else {
            return;
        };
        let Some(question) = self.nav.question(&id) else {
            return;
        };
        if index >= question.options.len() {
            return;
        }
        let many = question.answer.kind().accepts_many();

        if self.outcome.as_ref().is_some_and(|(graded, _)| graded == &id) {
            self.outcome = None;
            self.selected.clear();
        }
        if many {
            if !self.selected.remove(&index) {
                self.selected.insert(index);
            }
        } else {
            self.selected = BTreeSet::from([index]);
            self.submit();
        }
    }

    /// Pick by option label rather than by position.
    pub fn pick_letter(&mut self, letter: char) {
        let index = self
            .current_question_id()
            .and_then(|id| self.nav.question(&id))
            .and_then(|question| question.option_for(letter));
        if let Some(index) = index {
            self.pick_option(index);
        }
    }

    pub fn submit(&mut self) {
        let Some(id) = self.current_question_id() else {
            return;
        };
        let Some(question) = self.nav.question(&id) else {
            return;
        };
        if self.selected.is_empty() {
            self.set_status(StatusKind::Info, "pick an option first");
            return;
        }
        let texts: Vec<String> = self
            .selected
            .iter()
            .filter_map(|&i| question.options.get(i).cloned())
            .collect();

        match self.nav.submit_answer(&id, &texts) {
            Ok(outcome) => {
                let saved = if outcome.verdict.is_correct() {
                    "cleared from missed"
                } else {
                    "added to missed"
                };
                self.report_save(&outcome.save, saved);
                self.outcome = Some((id, outcome));
                self.clamp_index();
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    pub fn toggle_favorite(&mut self) {
        let Some(id) = self.current_question_id() else {
            return;
        };
        match self.nav.toggle_favorite(&id) {
            Ok(outcome) => {
                let text = if outcome.is_favorite {
                    "added to favorites"
                } else {
                    "removed from favorites"
                };
                self.report_save(&outcome.save, text);
                self.clamp_index();
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    pub fn cycle_mode(&mut self) {
        let mode = self.nav.cycle_mode();
        self.reset_question();
        self.set_status(StatusKind::Info, format!("{} view", mode.label()));
    }

    pub fn save_now(&mut self) {
        match self.nav.save_now() {
            Ok(save) => self.report_save(&save, "progress saved"),
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    pub fn export(&mut self) {
        let Some(document) = self.nav.print_document() else {
            return;
        };
        let renderer = PlainTextRenderer::new(self.config.export_page_lines);
        match write_export(&document, &renderer, Path::new(&self.config.export_dir)) {
            Ok(path) => self.set_status(
                StatusKind::Info,
                format!("exported {} questions to {}", document.entries.len(), path.display()),
            ),
            Err(e) => self.set_status(StatusKind::Error, format!("{e:#}")),
        }
    }

    // --- filters ---

    pub fn adjust_filter(&mut self, forward: bool) {
        match self.filter_row {
            FilterRow::Mode => {
                // Three modes: going back one is going forward two.
                self.nav.cycle_mode();
                if !forward {
                    self.nav.cycle_mode();
                }
                self.reset_question();
            }
            FilterRow::Years => {
                let count = self.nav.available_years().len();
                if count > 0 {
                    self.year_cursor = if forward {
                        (self.year_cursor + 1) % count
                    } else {
                        (self.year_cursor + count - 1) % count
                    };
                }
            }
            FilterRow::Keyword => {}
            FilterRow::Category => {
                let next = {
                    let pool = self.nav.pool();
                    cycle_facet(&pool.categories, &self.nav.context().filter().category, forward)
                };
                self.nav.select_category(next);
                self.reset_question();
            }
            FilterRow::SubCategory => {
                let next = {
                    let pool = self.nav.pool();
                    cycle_facet(&pool.sub_categories, &self.nav.context().filter().sub_category, forward)
                };
                self.nav.select_sub_category(next);
                self.reset_question();
            }
        }
    }

    pub fn toggle_year_at_cursor(&mut self) {
        if let Some(year) = self.nav.available_years().get(self.year_cursor).copied() {
            self.nav.toggle_year(year);
            self.reset_question();
        }
    }

    pub fn start_keyword_edit(&mut self) {
        let current = self.nav.context().filter().keyword.clone();
        self.keyword_input = Some(LineInput::new(&current));
    }

    pub fn handle_keyword_key(&mut self, key: KeyEvent) {
        let Some(input) = self.keyword_input.as_mut() else {
            return;
        };
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Submit => {
                let keyword = input.value().to_string();
                self.keyword_input = None;
                self.nav.set_keyword(&keyword);
                self.reset_question();
            }
            InputResult::Cancel => self.keyword_input = None,
        }
    }

    // --- handwriting ---

    pub fn start_draft_edit(&mut self) {
        if let Some(drill) = self.nav.handwriting() {
            if drill.current().is_some() {
                self.draft_input = Some(LineInput::multiline(drill.draft()));
            }
        }
    }

    pub fn handle_draft_key(&mut self, key: KeyEvent) {
        let Some(input) = self.draft_input.as_mut() else {
            return;
        };
        if input.handle(key) != InputResult::Continue {
            self.commit_draft();
        }
    }

    fn commit_draft(&mut self) {
        if let Some(input) = self.draft_input.take() {
            if let Some(drill) = self.nav.handwriting_mut() {
                drill.set_draft(input.value().to_string());
            }
        }
    }

    pub fn handwriting_step(&mut self, forward: bool) {
        if let Some(drill) = self.nav.handwriting_mut() {
            if forward {
                drill.next();
            } else {
                drill.prev();
            }
        }
        self.show_reference = false;
    }

    pub fn toggle_handwriting_year(&mut self, slot: usize) {
        if let Some(drill) = self.nav.handwriting_mut() {
            if let Some(year) = drill.available_years().get(slot).copied() {
                drill.toggle_year(year);
            }
        }
    }

    pub fn cycle_handwriting_kind(&mut self) {
        if let Some(drill) = self.nav.handwriting_mut() {
            let mut choices = vec![Facet::All];
            choices.extend(drill.available_kinds().into_iter().map(Facet::Only));
            let i = choices.iter().position(|k| k == drill.kind()).unwrap_or(0);
            let next = choices[(i + 1) % choices.len()].clone();
            drill.set_kind(next);
        }
    }

    pub fn toggle_practiced(&mut self) {
        match self.nav.toggle_practiced() {
            Ok(Some(outcome)) => {
                let text = if outcome.is_favorite {
                    "marked practiced"
                } else {
                    "unmarked"
                };
                self.report_save(&outcome.save, text);
            }
            Ok(None) => {}
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[&str]) -> Vec<FacetCount> {
        let mut out = vec![FacetCount {
            facet: Facet::All,
            count: 0,
        }];
        out.extend(values.iter().map(|v| FacetCount {
            facet: Facet::Only(v.to_string()),
            count: 0,
        }));
        out
    }

    #[test]
    fn cycle_facet_wraps() {
        let c = counts(&["分則", "總則"]);
        assert_eq!(cycle_facet(&c, &Facet::All, true), Facet::Only("分則".to_string()));
        assert_eq!(cycle_facet(&c, &Facet::All, false), Facet::Only("總則".to_string()));
        assert_eq!(cycle_facet(&c, &Facet::Only("總則".to_string()), true), Facet::All);
    }

    #[test]
    fn cycle_facet_unknown_current_starts_over() {
        let c = counts(&["分則"]);
        assert_eq!(cycle_facet(&c, &Facet::Only("gone".to_string()), true), Facet::Only("分則".to_string()));
        assert_eq!(cycle_facet(&[], &Facet::Only("x".to_string()), true), Facet::All);
    }
}
