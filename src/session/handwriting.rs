use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::bank::question::{HandwritingQuestion, QuestionId};
use crate::engine::filter::{Facet, filter_handwriting, handwriting_kinds, handwriting_years};

/// Characters written, not counting spaces or line breaks.
pub fn word_count(text: &str) -> usize {
    text.chars().filter(|c| *c != ' ' && *c != '\n').count()
}

/// One-at-a-time walk through a handwriting bank with year and type filters
/// and a scratch draft per question.
#[derive(Debug)]
pub struct HandwritingDrill {
    bank: Rc<Vec<HandwritingQuestion>>,
    years: BTreeSet<u32>,
    kind: Facet,
    index: usize,
    drafts: HashMap<QuestionId, String>,
}

impl HandwritingDrill {
    /// Starts with every year selected and no type restriction.
    pub fn new(bank: Rc<Vec<HandwritingQuestion>>) -> Self {
        let years = handwriting_years(&bank).into_iter().collect();
        Self {
            bank,
            years,
            kind: Facet::All,
            index: 0,
            drafts: HashMap::new(),
        }
    }

    pub fn available_years(&self) -> Vec<u32> {
        handwriting_years(&self.bank)
    }

    pub fn available_kinds(&self) -> Vec<String> {
        handwriting_kinds(&self.bank)
    }

    pub fn years(&self) -> &BTreeSet<u32> {
        &self.years
    }

    pub fn kind(&self) -> &Facet {
        &self.kind
    }

    pub fn pool(&self) -> Vec<&HandwritingQuestion> {
        filter_handwriting(&self.bank, &self.years, &self.kind)
    }

    /// 0-based index into the pool and the pool size.
    pub fn position(&self) -> (usize, usize) {
        let len = self.pool().len();
        (self.clamped(len), len)
    }

    pub fn current(&self) -> Option<&HandwritingQuestion> {
        let pool = self.pool();
        let index = self.clamped(pool.len());
        pool.get(index).copied()
    }

    pub fn has_prev(&self) -> bool {
        self.position().0 > 0
    }

    pub fn has_next(&self) -> bool {
        let (index, len) = self.position();
        index + 1 < len
    }

    pub fn next(&mut self) {
        let (index, len) = self.position();
        if index + 1 < len {
            self.index = index + 1;
        }
    }

    pub fn prev(&mut self) {
        let (index, _) = self.position();
        self.index = index.saturating_sub(1);
    }

    pub fn toggle_year(&mut self, year: u32) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    pub fn set_kind(&mut self, kind: Facet) {
        self.kind = kind;
    }

    pub fn draft(&self) -> &str {
        self.current()
            .and_then(|q| self.drafts.get(&q.id))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_draft(&mut self, text: String) {
        if let Some(id) = self.current().map(|q| q.id.clone()) {
            self.drafts.insert(id, text);
        }
    }

    // An index left over from a larger pool restarts at the first question.
    fn clamped(&self, len: usize) -> usize {
        if self.index < len { self.index } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essay(id: i64, year: u32, kind: &str) -> HandwritingQuestion {
        HandwritingQuestion {
            id: QuestionId::Number(id),
            year,
            kind: kind.to_string(),
            title: format!("題目{id}"),
            prompt: "請作文".to_string(),
            requirements: None,
            reference: String::new(),
        }
    }

    fn drill() -> HandwritingDrill {
        HandwritingDrill::new(Rc::new(vec![
            essay(1, 113, "作文"),
            essay(2, 113, "公文"),
            essay(3, 112, "作文"),
        ]))
    }

    #[test]
    fn word_count_skips_spaces_and_newlines() {
        assert_eq!(word_count("天地 玄黃\n宇宙"), 6);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("a\tb"), 3);
    }

    #[test]
    fn navigation_stops_at_the_ends() {
        let mut d = drill();
        assert!(!d.has_prev());
        d.prev();
        assert_eq!(d.position(), (0, 3));
        d.next();
        d.next();
        assert_eq!(d.position(), (2, 3));
        assert!(!d.has_next());
        d.next();
        assert_eq!(d.position(), (2, 3));
    }

    #[test]
    fn shrinking_pool_resets_out_of_range_index() {
        let mut d = drill();
        d.next();
        d.next();
        d.set_kind(Facet::Only("作文".to_string()));
        assert_eq!(d.position(), (0, 2));
        assert_eq!(d.current().map(|q| q.id.clone()), Some(QuestionId::Number(1)));
    }

    #[test]
    fn year_toggle_filters_pool() {
        let mut d = drill();
        d.toggle_year(113);
        let ids: Vec<_> = d.pool().iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids, vec![QuestionId::Number(3)]);
        d.toggle_year(112);
        assert!(d.current().is_none());
        assert_eq!(d.position(), (0, 0));
    }

    #[test]
    fn drafts_follow_the_current_question() {
        let mut d = drill();
        d.set_draft("第一篇".to_string());
        d.next();
        assert_eq!(d.draft(), "");
        d.prev();
        assert_eq!(d.draft(), "第一篇");
    }
}
