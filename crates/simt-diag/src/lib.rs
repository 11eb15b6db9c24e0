//! Error reporting and diagnostics for intrinsic typing.
//!
//! The resolver reports soft failures (no overload, unknown attribute) as
//! plain values and hard failures (out-of-domain literal, malformed request)
//! as errors. Either becomes a [`Diagnostic`] with a stable code; the host
//! compiler owns source locations and attaches them when it renders.

use std::fmt;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Broad category for diagnostics. Used for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// No declared or computed signature matches the argument types.
    NoMatchingOverload,
    /// Call to an identity with no registered typing rule.
    UnknownIntrinsic,
    /// Member name not present on a namespace.
    UnknownAttribute,
    /// Literal argument outside the intrinsic's accepted values.
    InvalidLiteral,
    /// Request shape the intrinsic can never accept (e.g. keyword arguments).
    MalformedRequest,
    /// Two registrations for the same identity.
    DuplicateRegistration,
    /// A registered entry references an identity that was never registered.
    DanglingReference,
    /// Invalid engine configuration.
    Config,
}

impl Category {
    /// Stable code. E01xx are user-facing, E09xx are compiler bugs.
    pub fn code(self) -> &'static str {
        match self {
            Category::NoMatchingOverload => "E0101",
            Category::UnknownIntrinsic => "E0102",
            Category::UnknownAttribute => "E0103",
            Category::InvalidLiteral => "E0104",
            Category::MalformedRequest => "E0901",
            Category::DuplicateRegistration => "E0902",
            Category::DanglingReference => "E0903",
            Category::Config => "E0904",
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: Category,
    /// Primary message: what went wrong.
    pub message: String,
    /// Suggested fix, if any.
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code(), self.message)?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error type for crates that produce diagnostics
// ---------------------------------------------------------------------------

/// Error type wrapping one or more diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.first().map(|d| d.to_string()).unwrap_or_default())]
pub struct DiagnosticError(pub Vec<Diagnostic>);

impl DiagnosticError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl From<Diagnostic> for DiagnosticError {
    fn from(diag: Diagnostic) -> Self {
        Self(vec![diag])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder() {
        let diag = Diagnostic::error(
            Category::NoMatchingOverload,
            "no matching overload for `cuda.popc` with argument types (float32)",
        )
        .with_help("`cuda.popc` accepts 8- to 64-bit integers");

        assert_eq!(diag.code(), "E0101");
        assert!(diag.message.contains("cuda.popc"));
        assert!(diag.help.unwrap().contains("integers"));
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::error(Category::UnknownAttribute, "unknown attribute `foo`");
        assert_eq!(format!("{diag}"), "error[E0103]: unknown attribute `foo`");

        let diag = Diagnostic::error(Category::Config, "bad width").with_help("use 32 or 64");
        assert_eq!(format!("{diag}"), "error[E0904]: bad width\n  help: use 32 or 64");
    }

    #[test]
    fn diagnostic_error_displays_first() {
        let err = DiagnosticError(vec![
            Diagnostic::error(Category::InvalidLiteral, "first"),
            Diagnostic::error(Category::InvalidLiteral, "second"),
        ]);
        assert_eq!(err.to_string(), "error[E0104]: first");
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(DiagnosticError(Vec::new()).to_string(), "");

        let single = DiagnosticError::from(Diagnostic::error(Category::Config, "only"));
        assert_eq!(single.diagnostics().len(), 1);
    }

    #[test]
    fn codes_are_unique() {
        let categories = [
            Category::NoMatchingOverload,
            Category::UnknownIntrinsic,
            Category::UnknownAttribute,
            Category::InvalidLiteral,
            Category::MalformedRequest,
            Category::DuplicateRegistration,
            Category::DanglingReference,
            Category::Config,
        ];
        let mut codes = std::collections::BTreeSet::new();
        for cat in categories {
            assert!(
                codes.insert(cat.code()),
                "duplicate diagnostic code detected: {}",
                cat.code()
            );
        }
    }
}
