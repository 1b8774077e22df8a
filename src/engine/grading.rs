use std::collections::BTreeSet;

use crate::engine::classify::{AnswerKey, QuestionKind};
use crate::engine::normalize::{MalformedOptionError, normalize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

/// Judge a set of submitted tokens against an answer key of the given kind.
pub fn grade(tokens: &BTreeSet<char>, answer_key: &str, kind: QuestionKind) -> Verdict {
    let correct = match kind {
        QuestionKind::Single => single_token(tokens).is_some_and(|t| {
            let mut key = answer_key.chars();
            key.next() == Some(t) && key.next().is_none()
        }),
        QuestionKind::Disputed => single_token(tokens).is_some_and(|t| answer_key.contains(t)),
        QuestionKind::Multiple => sorted_chars(tokens.iter().copied()) == sorted_chars(answer_key.chars()),
    };
    if correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Normalize the chosen option texts and grade them against `key`.
pub fn grade_options<S: AsRef<str>>(
    selected: &[S],
    key: &AnswerKey,
) -> Result<Verdict, MalformedOptionError> {
    let tokens = selected
        .iter()
        .map(|text| normalize(text.as_ref()))
        .collect::<Result<BTreeSet<char>, _>>()?;
    Ok(grade(&tokens, key.raw(), key.kind()))
}

fn single_token(tokens: &BTreeSet<char>) -> Option<char> {
    if tokens.len() == 1 {
        tokens.iter().next().copied()
    } else {
        None
    }
}

fn sorted_chars(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut v: Vec<char> = chars.collect();
    v.sort_unstable();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &str) -> BTreeSet<char> {
        tokens.chars().collect()
    }

    #[test]
    fn single_matches_only_its_letter() {
        for k in ['A', 'B', 'C', 'D'] {
            let key = k.to_string();
            assert_eq!(grade(&set(&key), &key, QuestionKind::Single), Verdict::Correct);
            for t in ['A', 'B', 'C', 'D'].into_iter().filter(|t| *t != k) {
                assert_eq!(
                    grade(&set(&t.to_string()), &key, QuestionKind::Single),
                    Verdict::Incorrect
                );
            }
        }
    }

    #[test]
    fn single_rejects_two_tokens() {
        assert_eq!(grade(&set("AB"), "A", QuestionKind::Single), Verdict::Incorrect);
        assert_eq!(grade(&set(""), "A", QuestionKind::Single), Verdict::Incorrect);
    }

    #[test]
    fn multiple_requires_exact_set() {
        assert_eq!(grade(&set("ECB"), "BCE", QuestionKind::Multiple), Verdict::Correct);
        assert_eq!(grade(&set("BC"), "BCE", QuestionKind::Multiple), Verdict::Incorrect);
        assert_eq!(grade(&set("BCEA"), "BCE", QuestionKind::Multiple), Verdict::Incorrect);
    }

    #[test]
    fn disputed_accepts_any_listed_letter() {
        assert_eq!(grade(&set("A"), "A或C", QuestionKind::Disputed), Verdict::Correct);
        assert_eq!(grade(&set("C"), "A或C", QuestionKind::Disputed), Verdict::Correct);
        assert_eq!(grade(&set("B"), "A或C", QuestionKind::Disputed), Verdict::Incorrect);
        assert_eq!(grade(&set("AC"), "A或C", QuestionKind::Disputed), Verdict::Incorrect);
    }

    #[test]
    fn disputed_slash_key() {
        assert_eq!(grade(&set("B"), "A/B", QuestionKind::Disputed), Verdict::Correct);
        assert_eq!(grade(&set("D"), "A/B", QuestionKind::Disputed), Verdict::Incorrect);
    }

    #[test]
    fn grade_options_normalizes_labels() {
        let key = AnswerKey::new("BC");
        assert_eq!(grade_options(&["(B) 二", "(C) 三"], &key), Ok(Verdict::Correct));
        assert_eq!(grade_options(&["(B) 二"], &key), Ok(Verdict::Incorrect));
    }

    #[test]
    fn full_width_key_and_labels_grade_together() {
        let key = AnswerKey::new("Ａ");
        assert_eq!(grade_options(&["（Ａ）甲"], &key), Ok(Verdict::Correct));
        assert_eq!(grade_options(&["(A) 甲"], &key), Ok(Verdict::Correct));
        assert_eq!(grade_options(&["（Ｂ）乙"], &key), Ok(Verdict::Incorrect));
    }

    #[test]
    fn grade_options_surfaces_malformed_option() {
        let key = AnswerKey::new("A");
        assert!(grade_options(&["()"], &key).is_err());
    }
}
