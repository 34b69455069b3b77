use serde::Serialize;

/// Where a resource was declared.
///
/// Provenance only: it is never changed after extraction and never part of the
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Declaration {
    /// Exported binding name (e.g., "checkoutLatency").
    /// Resources found inside a wrapper literal use a path: "bundle.latency", "all[0]".
    pub name: String,
    /// Declaring scope: directory of the file relative to the scan root ("." for the root).
    pub scope: String,
    /// File path as produced by the scanner.
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
}

impl Declaration {
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        file: impl Into<String>,
        line: usize,
        col: usize,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            file: file.into(),
            line,
            col,
        }
    }

    /// Provenance for a resource nested under this one (same file and position).
    pub fn nested(&self, segment: &str) -> Self {
        let name = if segment.starts_with('[') {
            format!("{}{}", self.name, segment)
        } else {
            format!("{}.{}", self.name, segment)
        };
        Self {
            name,
            ..self.clone()
        }
    }

    /// `file:line` for messages.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}
