//! Host platform conventions that affect completion.

/// Platform the completed paths and commands belong to.
///
/// This is the platform of the *target* shell, which is not necessarily the
/// host: a Unix terminal may be completing for a Windows SSH session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Platform the engine was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Preferred path separator.
    pub fn separator(self) -> char {
        match self {
            Platform::Unix => '/',
            Platform::Windows => '\\',
        }
    }

    /// Windows accepts both slashes.
    pub fn is_separator(self, c: char) -> bool {
        c == '/' || (self == Platform::Windows && c == '\\')
    }

    pub fn ends_with_separator(self, path: &str) -> bool {
        path.chars().next_back().is_some_and(|c| self.is_separator(c))
    }

    /// Byte index of the last separator in `path`.
    pub fn last_separator(self, path: &str) -> Option<usize> {
        path.char_indices()
            .filter(|(_, c)| self.is_separator(*c))
            .map(|(i, _)| i)
            .next_back()
    }

    pub fn is_absolute(self, path: &str) -> bool {
        match self {
            Platform::Unix => path.starts_with('/'),
            Platform::Windows => {
                let bytes = path.as_bytes();
                path.starts_with(['\\', '/'])
                    || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
            }
        }
    }

    /// Joins a relative path onto `base` with a single separator.
    pub fn join(self, base: &str, relative: &str) -> String {
        if base.is_empty() {
            return relative.to_string();
        }
        let trimmed = base.trim_end_matches(|c| self.is_separator(c));
        let trimmed = if trimmed.is_empty() { &base[..1] } else { trimmed };
        if self.ends_with_separator(trimmed) {
            format!("{trimmed}{relative}")
        } else {
            format!("{trimmed}{}{relative}", self.separator())
        }
    }

    /// Extensions that make a file directly executable on Windows.
    pub fn executable_extensions(self) -> &'static [&'static str] {
        match self {
            Platform::Unix => &[],
            Platform::Windows => &["exe", "com", "msi"],
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_accepts_both_separators() {
        assert!(Platform::Windows.is_separator('\\'));
        assert!(Platform::Windows.is_separator('/'));
        assert!(!Platform::Unix.is_separator('\\'));
    }

    #[test]
    fn test_is_absolute() {
        assert!(Platform::Unix.is_absolute("/usr/bin"));
        assert!(!Platform::Unix.is_absolute("usr/bin"));
        assert!(Platform::Windows.is_absolute("C:\\Users"));
        assert!(Platform::Windows.is_absolute("\\\\server\\share"));
        assert!(!Platform::Windows.is_absolute("Users"));
    }

    #[test]
    fn test_join() {
        assert_eq!(Platform::Unix.join("/home/me", "src"), "/home/me/src");
        assert_eq!(Platform::Unix.join("/home/me/", "src"), "/home/me/src");
        assert_eq!(Platform::Unix.join("/", "etc"), "/etc");
        assert_eq!(Platform::Windows.join("C:\\work", "app"), "C:\\work\\app");
    }

    #[test]
    fn test_last_separator() {
        assert_eq!(Platform::Unix.last_separator("src/main.rs"), Some(3));
        assert_eq!(Platform::Unix.last_separator("main.rs"), None);
        assert_eq!(Platform::Windows.last_separator("a\\b/c"), Some(3));
    }
}
