use crate::fields::Field;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A field-level finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub field: Field,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity.label(), self.field, self.message)
    }
}

/// Ordered diagnostics for one file. Errors block the rename, warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: Field, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            field,
            message: message.into(),
            severity: Severity::Error,
        });
    }

    pub fn warning(&mut self, field: Field, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            field,
            message: message.into(),
            severity: Severity::Warning,
        });
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// No blocking diagnostics (warnings allowed)
    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.field == field)
    }
}
