use chrono::{DateTime, Local};

use crate::bank::question::Question;
use crate::engine::filter::ViewMode;

/// Title for an export of `subject` in the given view.
pub fn export_title(mode: ViewMode, username: &str, subject: &str) -> String {
    match mode {
        ViewMode::Favorites => format!("[Favorites] {username}-{subject}"),
        ViewMode::Missed => format!("[Missed] {username}-{subject}"),
        ViewMode::Normal => format!("[Practice] {subject}"),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintEntry {
    pub heading: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl PrintEntry {
    fn from_question(number: usize, question: &Question) -> Self {
        Self {
            heading: format!(
                "{number}. [{}#{}] {}",
                question.year,
                question.id.short_label(),
                question.question
            ),
            options: question.options.clone(),
            answer: question.answer.raw().to_string(),
        }
    }

    /// The entry as printed lines, trailing blank line included.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.options.len() + 3);
        lines.push(self.heading.clone());
        lines.extend(self.options.iter().map(|o| format!("   {o}")));
        lines.push(format!("   Answer: {}", self.answer));
        lines.push(String::new());
        lines
    }
}

#[derive(Clone, Debug)]
pub struct PrintDocument {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub entries: Vec<PrintEntry>,
}

impl PrintDocument {
    /// Numbers the questions from 1 in the order given.
    pub fn new(title: String, questions: &[&Question]) -> Self {
        let entries = questions
            .iter()
            .enumerate()
            .map(|(i, q)| PrintEntry::from_question(i + 1, q))
            .collect();
        Self {
            title,
            generated_at: Local::now(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split the document into pages of at most `page_lines` lines. The
    /// first page opens with the title. An entry moves to a fresh page when
    /// it would not fit; one longer than a whole page is cut across pages.
    pub fn paginate(&self, page_lines: usize) -> Vec<Vec<String>> {
        let page_lines = page_lines.max(1);
        let mut pages: Vec<Vec<String>> = Vec::new();
        let mut page = vec![
            self.title.clone(),
            format!("Generated {}", self.generated_at.format("%Y-%m-%d %H:%M")),
            String::new(),
        ];
        page.truncate(page_lines);

        for entry in &self.entries {
            let lines = entry.lines();
            if !page.is_empty() && page.len() + lines.len() > page_lines {
                pages.push(std::mem::take(&mut page));
            }
            for line in lines {
                if page.len() == page_lines {
                    pages.push(std::mem::take(&mut page));
                }
                page.push(line);
            }
        }

        if !page.is_empty() {
            pages.push(page);
        }
        pages
    }
}

/// Turns a document into bytes for one output format.
pub trait DocumentRenderer {
    fn extension(&self) -> &'static str;
    fn render(&self, document: &PrintDocument) -> Vec<u8>;
}
