// ABOUTME: Pipeline phases, used to tag log spans, errors, and progress output.
// ABOUTME: Order matches execution order.

use serde::Serialize;

/// A stage of the linear deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configuration,
    Preflight,
    Transfer,
    Convergence,
    Edge,
    Health,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Configuration => "configuration",
            Phase::Preflight => "preflight",
            Phase::Transfer => "transfer",
            Phase::Convergence => "convergence",
            Phase::Edge => "edge",
            Phase::Health => "health",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
