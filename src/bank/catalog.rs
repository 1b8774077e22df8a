use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::progress;

pub const CATALOG_FILE: &str = "catalog.toml";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("exam catalog {0} not found")]
    Missing(String),
    #[error("exam catalog is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("exam catalog lists no exams")]
    Empty,
}

/// One exam type: its display name, the prefix naming its progress columns,
/// and the bank resources it draws from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamEntry {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub icon: String,
    pub bank: String,
    #[serde(default)]
    pub handwriting: Option<String>,
}

impl ExamEntry {
    pub fn has_handwriting(&self) -> bool {
        self.handwriting.is_some()
    }

    pub fn favorites_column(&self) -> String {
        progress::favorites_column(&self.prefix)
    }

    pub fn missed_column(&self) -> String {
        progress::missed_column(&self.prefix)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExamCatalog {
    #[serde(default, rename = "exam")]
    pub exams: Vec<ExamEntry>,
}

impl ExamCatalog {
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let catalog: ExamCatalog = toml::from_str(content)?;
        if catalog.exams.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn by_prefix(&self, prefix: &str) -> Option<&ExamEntry> {
        self.exams.iter().find(|e| e.prefix == prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exam_tables() {
        let catalog = ExamCatalog::parse(
            r#"
[[exam]]
name = "國文"
prefix = "Chi"
icon = "📖"
bank = "chinese.json"
handwriting = "chinese_handwriting.json"

[[exam]]
name = "法學知識與英文"
prefix = "Eng"
bank = "law_and_english.json"
"#,
        )
        .unwrap();
        assert_eq!(catalog.exams.len(), 2);
        let chi = catalog.by_prefix("Chi").unwrap();
        assert!(chi.has_handwriting());
        assert_eq!(chi.favorites_column(), "Fav_Chi");
        assert_eq!(chi.missed_column(), "Mis_Chi");
        assert!(!catalog.by_prefix("Eng").unwrap().has_handwriting());
        assert!(catalog.by_prefix("Law").is_none());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(ExamCatalog::parse(""), Err(CatalogError::Empty)));
    }
}
