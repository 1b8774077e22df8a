use std::collections::BTreeMap;

use crate::bank::question::{Question, QuestionId};
use crate::engine::classify::QuestionKind;
use crate::engine::normalize::{MalformedOptionError, normalize};

/// Per-bank tally of question kinds plus every option that yields no token.
#[derive(Debug, Default)]
pub struct BankAudit {
    pub kinds: BTreeMap<&'static str, usize>,
    pub malformed: Vec<(QuestionId, MalformedOptionError)>,
}

impl BankAudit {
    pub fn total(&self) -> usize {
        self.kinds.values().sum()
    }

    pub fn count(&self, kind: QuestionKind) -> usize {
        self.kinds.get(kind.label()).copied().unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

pub fn audit(questions: &[Question]) -> BankAudit {
    let mut report = BankAudit::default();
    for question in questions {
        *report.kinds.entry(question.answer.kind().label()).or_insert(0) += 1;
        for option in &question.options {
            if let Err(e) = normalize(option) {
                report.malformed.push((question.id.clone(), e));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::AnswerKey;

    fn question(id: i64, answer: &str, options: &[&str]) -> Question {
        Question {
            id: QuestionId::Number(id),
            year: 113,
            subject: "國文".to_string(),
            category: "字音字形".to_string(),
            sub_category: "uncategorized".to_string(),
            question: "?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: AnswerKey::new(answer),
            explanation: String::new(),
        }
    }

    #[test]
    fn counts_kinds_and_flags_blank_options() {
        let bank = vec![
            question(1, "A", &["(A) x", "(B) y"]),
            question(2, "BC", &["(A) x", "(B) y", "(C) z"]),
            question(3, "A或C", &["(A) x", "()", "(C) z"]),
        ];
        let report = audit(&bank);
        assert_eq!(report.total(), 3);
        assert_eq!(report.count(QuestionKind::Single), 1);
        assert_eq!(report.count(QuestionKind::Multiple), 1);
        assert_eq!(report.count(QuestionKind::Disputed), 1);
        assert!(!report.is_clean());
        assert_eq!(report.malformed[0].0, QuestionId::Number(3));
    }

    #[test]
    fn bundled_banks_are_clean() {
        let mut library = crate::bank::BankLibrary::new(None);
        let catalog = library.catalog().unwrap();
        for exam in &catalog.exams {
            let bank = library.questions(&exam.bank).unwrap();
            let report = audit(&bank);
            assert!(report.is_clean(), "{}: {:?}", exam.bank, report.malformed);
        }
    }
}
