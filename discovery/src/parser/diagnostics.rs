//! Line-coverage diagnostics for a single parse run.

/// Counts collected while parsing, useful for judging how much of a help
/// text the parser understood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Non-blank lines.
    pub relevant_lines: usize,
    /// Lines consumed as a header, row, continuation, usage or description.
    pub recognized_lines: usize,
    /// Header-shaped lines that matched no known section.
    pub unknown_headers: Vec<String>,
}

impl ParseDiagnostics {
    pub fn coverage(&self) -> f64 {
        if self.relevant_lines == 0 {
            return 0.0;
        }
        self.recognized_lines as f64 / self.relevant_lines as f64
    }
}
