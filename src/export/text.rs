use crate::export::document::{DocumentRenderer, PrintDocument};

const FORM_FEED: char = '\u{c}';

/// Plain text, one form feed between pages.
pub struct PlainTextRenderer {
    pub page_lines: usize,
}

impl PlainTextRenderer {
    pub fn new(page_lines: usize) -> Self {
        Self { page_lines }
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &PrintDocument) -> Vec<u8> {
        let pages: Vec<String> = document
            .paginate(self.page_lines)
            .into_iter()
            .map(|lines| {
                let mut page = lines.join("\n");
                page.push('\n');
                page
            })
            .collect();
        pages.join(&FORM_FEED.to_string()).into_bytes()
    }
}
