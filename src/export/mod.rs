pub mod document;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use document::{DocumentRenderer, PrintDocument};

/// File stem for a document title: anything outside letters, digits, `-`,
/// `_` and `.` becomes `_`. Letters include CJK.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() { "export".to_string() } else { stem }
}

/// Render `document` and write it into `dir`, returning the written path.
pub fn write_export(
    document: &PrintDocument,
    renderer: &dyn DocumentRenderer,
    dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create export directory {}", dir.display()))?;
    let path = dir.join(format!("{}.{}", file_stem(&document.title), renderer.extension()));
    fs::write(&path, renderer.render(document))
        .with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), entries = document.entries.len(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::text::PlainTextRenderer;

    #[test]
    fn file_stem_keeps_cjk() {
        assert_eq!(file_stem("[Favorites] amy-刑法"), "_Favorites__amy-刑法");
        assert_eq!(file_stem("a/b\\c"), "a_b_c");
        assert_eq!(file_stem("  "), "export");
    }

    #[test]
    fn writes_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let doc = PrintDocument::new("[Practice] 國文".to_string(), &[]);
        let path = write_export(&doc, &PlainTextRenderer::new(40), &target).unwrap();
        assert_eq!(path, target.join("_Practice__國文.txt"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("[Practice] 國文"));
    }
}
