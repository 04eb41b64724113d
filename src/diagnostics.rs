// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects warnings that shouldn't fail a deployment but are shown at the end.

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = warning.kind.as_str(), "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_kind(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A domain was given without TLS.
    pub fn http_only(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HttpOnly,
            message: message.into(),
        }
    }

    /// A service was not healthy at snapshot time.
    pub fn health_degraded(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HealthDegraded,
            message: message.into(),
        }
    }

    /// Delta transfer was unavailable and the full-copy fallback ran.
    pub fn transfer_fallback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TransferFallback,
            message: message.into(),
        }
    }

    /// Create an SSH disconnect warning.
    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SshDisconnect,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    HttpOnly,
    HealthDegraded,
    TransferFallback,
    /// Failed to cleanly disconnect SSH session.
    SshDisconnect,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::HttpOnly => "http-only",
            WarningKind::HealthDegraded => "health-degraded",
            WarningKind::TransferFallback => "transfer-fallback",
            WarningKind::SshDisconnect => "ssh-disconnect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::http_only("plain http"));
        diag.warn(Warning::ssh_disconnect("connection reset"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert!(diag.has_kind(WarningKind::HttpOnly));
        assert!(!diag.has_kind(WarningKind::HealthDegraded));
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::health_degraded("x").kind, WarningKind::HealthDegraded);
        assert_eq!(Warning::transfer_fallback("x").kind, WarningKind::TransferFallback);
        assert_eq!(WarningKind::HttpOnly.as_str(), "http-only");
    }
}
