use icu_normalizer::ComposingNormalizerBorrowed;
use thiserror::Error;

/// Characters stripped from an option label before the token is read.
const LABEL_DECORATION: [char; 3] = ['(', ')', '.'];

/// An option string with nothing left after its label decoration is removed.
/// This is a bank data problem, not a user input problem.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed option {option:?}: no answer token after stripping label")]
pub struct MalformedOptionError {
    pub option: String,
}

/// Extract the canonical answer token from an option's display text.
///
/// `"(A) some text"` and `"B. another"` yield `'A'` and `'B'`. Full-width
/// labels such as `"（Ｃ）"` are folded through NFKC first.
pub fn normalize(option_text: &str) -> Result<char, MalformedOptionError> {
    let folded = ComposingNormalizerBorrowed::new_nfkc().normalize(option_text);
    let stripped = folded.replace(LABEL_DECORATION, "");
    stripped
        .trim()
        .chars()
        .next()
        .and_then(|ch| ch.to_uppercase().next())
        .ok_or_else(|| MalformedOptionError {
            option: option_text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parenthesized_label() {
        assert_eq!(normalize("(A) some text"), Ok('A'));
    }

    #[test]
    fn dotted_label() {
        assert_eq!(normalize("B. another"), Ok('B'));
    }

    #[test]
    fn leading_whitespace_is_ignored() {
        assert_eq!(normalize("   (D)  四"), Ok('D'));
    }

    #[test]
    fn full_width_label_folds_to_ascii() {
        assert_eq!(normalize("（Ｃ）消防法"), Ok('C'));
        assert_eq!(normalize("Ｅ．以上皆是"), Ok('E'));
    }

    #[test]
    fn lowercase_label_is_uppercased() {
        assert_eq!(normalize("(b) lower"), Ok('B'));
    }

    #[test]
    fn decoration_only_is_malformed() {
        let err = normalize(" ( ). ").unwrap_err();
        assert_eq!(err.option, " ( ). ");
        assert!(normalize("").is_err());
    }
}
