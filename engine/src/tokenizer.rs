//! Quote-aware splitting of a command line.
//!
//! This is not a shell grammar: quotes group words and are stripped, a
//! backslash escapes a following space or quote outside single quotes, and
//! nothing else is interpreted. Other backslashes are kept so Windows paths
//! survive.

/// Splits `input` into tokens.
///
/// When the input ends in unquoted whitespace, an empty final token is
/// appended; it represents the argument the user is about to type.
///
/// # Examples
///
/// ```
/// use shellsense_engine::tokenize;
///
/// assert_eq!(
///     tokenize("git commit -m \"first commit\""),
///     vec!["git", "commit", "-m", "first commit"]
/// );
/// assert_eq!(tokenize("ls "), vec!["ls", ""]);
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted_token = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some('\'') => current.push(c),
            Some(_) | None
                if c == '\\' && chars.peek().is_some_and(|n| is_escapable(*n)) =>
            {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                quoted_token = true;
            }
            None if c.is_whitespace() => {
                if !current.is_empty() || quoted_token {
                    tokens.push(std::mem::take(&mut current));
                    quoted_token = false;
                }
            }
            None => current.push(c),
        }
    }

    let trailing_space = quote.is_none() && input.ends_with(char::is_whitespace);
    if !current.is_empty() || quoted_token || trailing_space {
        tokens.push(current);
    }
    tokens
}

fn is_escapable(c: char) -> bool {
    c.is_whitespace() || c == '"' || c == '\''
}

/// Returns `true` if the input ends in whitespace outside any quote.
pub fn ends_with_unquoted_space(input: &str) -> bool {
    input.ends_with(char::is_whitespace)
        && tokenize(input).last().is_some_and(|t| t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize("git remote add"), vec!["git", "remote", "add"]);
    }

    #[test]
    fn test_collapses_runs_of_whitespace() {
        assert_eq!(tokenize("ls   -la\t/tmp"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_trailing_space_adds_empty_token() {
        assert_eq!(tokenize("git "), vec!["git", ""]);
        assert_eq!(tokenize("git  "), vec!["git", ""]);
    }

    #[test]
    fn test_quotes_group_and_are_stripped() {
        assert_eq!(
            tokenize("echo 'a b' \"c d\""),
            vec!["echo", "a b", "c d"]
        );
    }

    #[test]
    fn test_unterminated_quote_is_current_token() {
        assert_eq!(
            tokenize("git commit -m \"work in "),
            vec!["git", "commit", "-m", "work in "]
        );
        assert!(!ends_with_unquoted_space("git commit -m \"work in "));
    }

    #[test]
    fn test_empty_quotes_make_a_token() {
        assert_eq!(tokenize("grep \"\" file"), vec!["grep", "", "file"]);
    }

    #[test]
    fn test_backslash_escapes_space() {
        assert_eq!(tokenize("cd My\\ Documents"), vec!["cd", "My Documents"]);
    }

    #[test]
    fn test_windows_path_backslashes_survive() {
        assert_eq!(tokenize("dir C:\\Users\\me"), vec!["dir", "C:\\Users\\me"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }
}
