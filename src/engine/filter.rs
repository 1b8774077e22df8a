use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::bank::question::{HandwritingQuestion, Question, QuestionId};
use crate::store::progress::UserProgress;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    Favorites,
    Missed,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Normal, ViewMode::Favorites, ViewMode::Missed];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Normal => "normal",
            ViewMode::Favorites => "favorites",
            ViewMode::Missed => "missed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Normal => "Practice",
            ViewMode::Favorites => "Favorites",
            ViewMode::Missed => "Missed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Normal => ViewMode::Favorites,
            ViewMode::Favorites => ViewMode::Missed,
            ViewMode::Missed => ViewMode::Normal,
        }
    }

    /// Whether a question with `id` belongs to this view.
    pub fn admits(self, id: &QuestionId, progress: &UserProgress) -> bool {
        match self {
            ViewMode::Normal => true,
            ViewMode::Favorites => progress.favorites.contains(id),
            ViewMode::Missed => progress.missed.contains(id),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ViewMode::Normal),
            "favorites" | "fav" => Ok(ViewMode::Favorites),
            "missed" | "mis" => Ok(ViewMode::Missed),
            other => Err(format!("unknown view mode '{other}' (normal, favorites, missed)")),
        }
    }
}

/// A facet selection: everything, or one specific value.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Facet {
    #[default]
    All,
    Only(String),
}

impl Facet {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(v) => v == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Facet::All => "all",
            Facet::Only(v) => v,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacetCount {
    pub facet: Facet,
    pub count: usize,
}

/// The filter selections a user makes for the quiz view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolFilter {
    pub subject: String,
    pub years: BTreeSet<u32>,
    pub keyword: String,
    pub category: Facet,
    pub sub_category: Facet,
}

impl PoolFilter {
    /// Filter for `subject` with every year of that subject selected.
    pub fn for_subject(bank: &[Question], subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            years: subject_years(bank, subject).into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Result of filtering: the visible questions plus the chooser entries for
/// each facet, counted against the pool as it stood before that facet.
#[derive(Debug)]
pub struct Pool<'q> {
    pub questions: Vec<&'q Question>,
    pub categories: Vec<FacetCount>,
    pub sub_categories: Vec<FacetCount>,
}

pub fn filter_pool<'q>(
    bank: &'q [Question],
    filter: &PoolFilter,
    mode: ViewMode,
    progress: &UserProgress,
) -> Pool<'q> {
    let in_subject: Vec<&Question> = bank.iter().filter(|q| q.subject == filter.subject).collect();

    let base: Vec<&Question> = in_subject
        .iter()
        .copied()
        .filter(|q| filter.years.contains(&q.year))
        .filter(|q| filter.keyword.is_empty() || q.question.contains(filter.keyword.as_str()))
        .filter(|q| mode.admits(&q.id, progress))
        .collect();

    let categories = facet_counts(
        in_subject.iter().map(|q| q.category.as_str()),
        base.iter().map(|q| q.category.as_str()),
    );

    let by_category: Vec<&Question> = base
        .into_iter()
        .filter(|q| filter.category.matches(&q.category))
        .collect();

    let sub_categories = match &filter.category {
        Facet::All => Vec::new(),
        Facet::Only(category) => facet_counts(
            in_subject
                .iter()
                .filter(|q| &q.category == category)
                .map(|q| q.sub_category.as_str()),
            by_category.iter().map(|q| q.sub_category.as_str()),
        ),
    };

    let questions = by_category
        .into_iter()
        .filter(|q| filter.sub_category.matches(&q.sub_category))
        .collect();

    Pool {
        questions,
        categories,
        sub_categories,
    }
}

/// Chooser entries: `All` with the pool size, then every value seen in
/// `universe` (sorted) with how many of `pool` carry it.
fn facet_counts<'a>(
    universe: impl Iterator<Item = &'a str>,
    pool: impl Iterator<Item = &'a str>,
) -> Vec<FacetCount> {
    let mut counts: BTreeMap<&str, usize> = universe.map(|v| (v, 0)).collect();
    let mut total = 0;
    for value in pool {
        *counts.entry(value).or_insert(0) += 1;
        total += 1;
    }

    let mut facets = vec![FacetCount {
        facet: Facet::All,
        count: total,
    }];
    facets.extend(counts.into_iter().map(|(value, count)| FacetCount {
        facet: Facet::Only(value.to_string()),
        count,
    }));
    facets
}

/// Distinct subjects in bank order of first appearance.
pub fn subjects(bank: &[Question]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    bank.iter()
        .filter(|q| seen.insert(q.subject.as_str()))
        .map(|q| q.subject.clone())
        .collect()
}

/// Years present for `subject`, newest first.
pub fn subject_years(bank: &[Question], subject: &str) -> Vec<u32> {
    let years: BTreeSet<u32> = bank
        .iter()
        .filter(|q| q.subject == subject)
        .map(|q| q.year)
        .collect();
    years.into_iter().rev().collect()
}

pub fn handwriting_years(bank: &[HandwritingQuestion]) -> Vec<u32> {
    let years: BTreeSet<u32> = bank.iter().map(|q| q.year).collect();
    years.into_iter().rev().collect()
}

pub fn handwriting_kinds(bank: &[HandwritingQuestion]) -> Vec<String> {
    let kinds: BTreeSet<&str> = bank.iter().map(|q| q.kind.as_str()).collect();
    kinds.into_iter().map(str::to_string).collect()
}

pub fn filter_handwriting<'q>(
    bank: &'q [HandwritingQuestion],
    years: &BTreeSet<u32>,
    kind: &Facet,
) -> Vec<&'q HandwritingQuestion> {
    bank.iter()
        .filter(|q| years.contains(&q.year))
        .filter(|q| kind.matches(&q.kind))
        .collect()
}
