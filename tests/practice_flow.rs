use std::fs;
use std::path::Path;

use regex::Regex;
use tempfile::TempDir;

use examdrill::bank::library::BankLibrary;
use examdrill::bank::question::QuestionId;
use examdrill::engine::filter::ViewMode;
use examdrill::engine::grading::Verdict;
use examdrill::export::text::PlainTextRenderer;
use examdrill::export::write_export;
use examdrill::session::{Navigator, SaveStatus, Screen};
use examdrill::store::json_store::JsonTable;
use examdrill::store::memory::MemoryTable;
use examdrill::store::table::ProgressTable;
use examdrill::store::ProgressStore;

const CATALOG: &str = r#"
[[exam]]
name = "刑法與消防法規"
prefix = "Law"
bank = "law.json"
"#;

const BANK: &str = r#"[
  {"id": 1, "year": 113, "subject": "刑法", "category": "總則",
   "question": "第一題", "options": ["(A) 甲", "(B) 乙", "(C) 丙", "(D) 丁"],
   "answer": "A", "explanation": "甲為正解"},
  {"id": 2, "year": 113, "subject": "刑法", "category": "總則",
   "question": "第二題", "options": ["(A) 甲", "(B) 乙", "(C) 丙", "(D) 丁"],
   "answer": "BC"},
  {"id": 3, "year": 112, "subject": "刑法", "category": "分則",
   "question": "第三題", "options": ["(A) 甲", "(B) 乙"],
   "answer": "A或B"}
]"#;

fn bank_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();
    fs::write(dir.path().join("law.json"), BANK).unwrap();
    dir
}

fn navigator(dir: &Path, store: ProgressStore) -> Navigator {
    let library = BankLibrary::new(Some(dir.to_path_buf()));
    let catalog = library.catalog().unwrap();
    Navigator::new("amy", catalog, library, store)
}

fn pool_ids(nav: &Navigator) -> Vec<QuestionId> {
    nav.pool().questions.iter().map(|q| q.id.clone()).collect()
}

fn cell(table: &ProgressTable, user: &str, column: &str) -> Option<String> {
    let row = table.find_row(user)?;
    let col = table.column_index(column)?;
    table.cell(row, col).map(str::to_string)
}

#[test]
fn answer_then_review_missed() {
    let dir = bank_dir();
    let backend = MemoryTable::default();
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(backend.clone())));

    assert!(nav.enter_exam("Law").unwrap().is_none());
    nav.enter_subject("刑法").unwrap();
    nav.set_years([113]);
    assert_eq!(nav.screen(), Screen::Quiz);
    assert_eq!(pool_ids(&nav), vec![QuestionId::Number(1), QuestionId::Number(2)]);

    let first = nav.submit_answer(&QuestionId::Number(1), &["(A) 甲"]).unwrap();
    assert_eq!(first.verdict, Verdict::Correct);
    assert!(!first.missed_changed);
    assert_eq!(first.save, SaveStatus::NotNeeded);
    assert_eq!(first.explanation, "甲為正解");
    assert_eq!(backend.writes(), 0);

    let second = nav.submit_answer(&QuestionId::Number(2), &["(B) 乙"]).unwrap();
    assert_eq!(second.verdict, Verdict::Incorrect);
    assert_eq!(second.answer, "BC");
    assert!(second.missed_changed);
    assert_eq!(second.save, SaveStatus::Saved);
    assert_eq!(backend.writes(), 1);
    assert_eq!(cell(&backend.table(), "amy", "Mis_Law").as_deref(), Some("[2]"));

    nav.set_mode(ViewMode::Missed);
    assert_eq!(pool_ids(&nav), vec![QuestionId::Number(2)]);

    // Clearing it in missed mode empties the view and saves again.
    let retry = nav
        .submit_answer(&QuestionId::Number(2), &["(C) 丙", "(B) 乙"])
        .unwrap();
    assert_eq!(retry.verdict, Verdict::Correct);
    assert!(retry.missed_changed);
    assert_eq!(backend.writes(), 2);
    assert!(pool_ids(&nav).is_empty());
    assert_eq!(cell(&backend.table(), "amy", "Mis_Law").as_deref(), Some("[]"));
}

#[test]
fn favorite_toggled_twice_restores_stored_value() {
    let dir = bank_dir();
    let backend = MemoryTable::with_table(ProgressTable {
        columns: vec!["Username".to_string(), "Fav_Law".to_string(), "Mis_Law".to_string()],
        rows: vec![vec![
            Some("amy".to_string()),
            Some("[3]".to_string()),
            Some("[]".to_string()),
        ]],
    });
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(backend.clone())));
    nav.enter_exam("Law").unwrap();
    assert!(nav.context().progress().is_favorite(&QuestionId::Number(3)));

    let on = nav.toggle_favorite(&QuestionId::Number(1)).unwrap();
    assert!(on.is_favorite);
    assert_eq!(cell(&backend.table(), "amy", "Fav_Law").as_deref(), Some("[1,3]"));

    let off = nav.toggle_favorite(&QuestionId::Number(1)).unwrap();
    assert!(!off.is_favorite);
    assert_eq!(backend.writes(), 2);
    assert_eq!(cell(&backend.table(), "amy", "Fav_Law").as_deref(), Some("[3]"));
}

#[test]
fn progress_survives_a_restart_through_the_file_store() {
    let dir = bank_dir();
    let store_dir = TempDir::new().unwrap();
    let path = store_dir.path().join("progress.json");

    {
        let table = JsonTable::with_path(path.clone()).unwrap();
        let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(table)));
        nav.enter_exam("Law").unwrap();
        nav.enter_subject("刑法").unwrap();
        nav.submit_answer(&QuestionId::Number(3), &["(B) 乙"]).unwrap();
        nav.submit_answer(&QuestionId::Number(1), &["(D) 丁"]).unwrap();
        nav.toggle_favorite(&QuestionId::Number(2)).unwrap();
    }

    let table = JsonTable::with_path(path).unwrap();
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(table)));
    nav.enter_exam("Law").unwrap();
    let progress = nav.context().progress();
    assert!(progress.is_missed(&QuestionId::Number(1)));
    assert!(!progress.is_missed(&QuestionId::Number(3)));
    assert!(progress.is_favorite(&QuestionId::Number(2)));
}

#[test]
fn unreadable_store_degrades_to_empty_progress() {
    let dir = bank_dir();
    let backend = MemoryTable::default();
    backend.fail_reads(true);
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(backend.clone())));

    let warning = nav.enter_exam("Law").unwrap();
    assert!(warning.unwrap().contains("load"));
    nav.enter_subject("刑法").unwrap();
    assert_eq!(pool_ids(&nav).len(), 3);

    // Saving needs a fresh read too, so it fails and keeps memory state.
    let outcome = nav.submit_answer(&QuestionId::Number(1), &["(B) 乙"]).unwrap();
    assert!(matches!(outcome.save, SaveStatus::Failed(_)));
    assert!(nav.context().progress().is_missed(&QuestionId::Number(1)));

    backend.fail_reads(false);
    assert_eq!(nav.save_now().unwrap(), SaveStatus::Saved);
    assert_eq!(cell(&backend.table(), "amy", "Mis_Law").as_deref(), Some("[1]"));
}

#[test]
fn missing_bank_keeps_the_menu() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(MemoryTable::default())));
    assert!(nav.enter_exam("Law").is_err());
    assert_eq!(nav.screen(), Screen::ExamSelect);
    assert!(nav.context().exam().is_none());
}

#[test]
fn export_lists_the_visible_pool() {
    let dir = bank_dir();
    let out = TempDir::new().unwrap();
    let mut nav = navigator(dir.path(), ProgressStore::new(Box::new(MemoryTable::default())));
    nav.enter_exam("Law").unwrap();
    nav.enter_subject("刑法").unwrap();
    nav.submit_answer(&QuestionId::Number(2), &["(A) 甲"]).unwrap();
    nav.set_mode(ViewMode::Missed);

    let document = nav.print_document().unwrap();
    assert_eq!(document.title, "[Missed] amy-刑法");
    let path = write_export(&document, &PlainTextRenderer::new(40), out.path()).unwrap();
    let text = fs::read_to_string(path).unwrap();

    let heading = Regex::new(r"(?m)^(\d+)\. \[(\d{3})#(\S{1,2})\] (.+)$").unwrap();
    let headings: Vec<_> = heading.captures_iter(&text).collect();
    assert_eq!(headings.len(), 1);
    assert_eq!(&headings[0][1], "1");
    assert_eq!(&headings[0][2], "113");
    assert_eq!(&headings[0][3], "2");
    assert_eq!(&headings[0][4], "第二題");
    assert!(Regex::new(r"(?m)^\s+Answer: BC$").unwrap().is_match(&text));
    assert!(!text.contains('\u{c}'));
}
