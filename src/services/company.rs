// src/services/company.rs

//! Company-name carry-over between consecutive rows.

/// Glyph a row uses to say "same company as the row above".
pub const CONTINUATION_MARKER: &str = "↳";

/// Name used when a continuation row has nothing to inherit.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Most recently declared company within one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyCarry {
    current: Option<String>,
}

impl CompanyCarry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Company for a row's first cell.
    ///
    /// A continuation row reads the carried name; any other row declares a
    /// new name and replaces the carried one.
    pub fn resolve(&mut self, cell: &str) -> String {
        if cell.contains(CONTINUATION_MARKER) {
            return self
                .current
                .clone()
                .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
        }

        let name = display_name(cell);
        if !is_separator(cell) {
            self.current = Some(name.clone());
        }
        name
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

/// Markdown table alignment cell such as `---` or `:---:`.
fn is_separator(cell: &str) -> bool {
    let cell = cell.trim();
    cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':'))
}

/// Bracketed link text (`**[Acme](...)**` → `Acme`), else the trimmed cell.
fn display_name(cell: &str) -> String {
    let bracketed = cell.find('[').and_then(|open| {
        let rest = &cell[open + 1..];
        rest.find(']').map(|close| rest[..close].trim())
    });

    match bracketed {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => cell.trim().to_string(),
    }
}
