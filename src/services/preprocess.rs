//! Text normalization applied before classification.

/// Replace links and user handles with fixed placeholders.
///
/// Words are split on single spaces and rejoined the same way, so spacing is
/// preserved. A word starting with `http` becomes `http`; a word starting with
/// `@` and longer than one character becomes `@user`.
pub fn preprocess(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.starts_with("http") {
                "http"
            } else if word.starts_with('@') && word.len() > 1 {
                "@user"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_links_and_handles() {
        assert_eq!(
            preprocess("here is a link https://www.youtube.com/ and user @twitter"),
            "here is a link http and user @user"
        );
    }

    #[test]
    fn lone_at_sign_is_kept() {
        assert_eq!(preprocess("meet me @ noon"), "meet me @ noon");
    }

    #[test]
    fn preserves_spacing_and_empty_input() {
        assert_eq!(preprocess("a  b"), "a  b");
        assert_eq!(preprocess(""), "");
    }
}
