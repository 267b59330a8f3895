//! Non-fatal evaluation problems: the interpreter never aborts on these,
//! it logs them (with tile and pixel coordinates) and evaluates to nothing.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Recognition,
    Routing,
    Shape,
    TypeMismatch,
    EntryInvalid,
    ReductionLimit,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub x: i64,
    pub y: i64,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, base_grid: usize, x: i64, y: i64, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        let (px, py) = (x * base_grid as i64, y * base_grid as i64);
        warn!(x, y, px, py, kind = ?kind, "{message} at {x}, {y} ({px}, {py})");
        self.issues.push(Diagnostic { x, y, kind, message });
    }

    pub fn issues(&self) -> &[Diagnostic] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}
