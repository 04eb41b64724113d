// ABOUTME: Compose type definitions: CLI variant, container status rows, health classes.
// ABOUTME: Health is derived from the status text docker prints for each container.

use serde::Serialize;

/// Which compose CLI the remote host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeVariant {
    /// `docker compose` (CLI plugin, v2).
    #[default]
    Plugin,
    /// `docker-compose` (standalone binary).
    Standalone,
}

impl ComposeVariant {
    pub fn command(self) -> &'static str {
        match self {
            ComposeVariant::Plugin => "docker compose",
            ComposeVariant::Standalone => "docker-compose",
        }
    }
}

impl std::fmt::Display for ComposeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

/// One container row as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub service: String,
    /// Engine state: running, restarting, exited, created, dead...
    pub state: String,
    /// Human status, e.g. `Up 3 minutes (healthy)`.
    pub status: String,
}

impl ContainerStatus {
    pub fn health(&self) -> ServiceHealth {
        let status = self.status.to_ascii_lowercase();
        // "(unhealthy)" contains "healthy)", so it must be checked first
        if status.contains("(unhealthy)") {
            return ServiceHealth::Unhealthy;
        }
        if status.contains("(health: starting)") {
            return ServiceHealth::Unknown;
        }
        if status.contains("(healthy)") {
            return ServiceHealth::Healthy;
        }
        match self.state.to_ascii_lowercase().as_str() {
            "running" => ServiceHealth::Healthy,
            "created" => ServiceHealth::Unknown,
            _ => ServiceHealth::Unhealthy,
        }
    }
}

/// Health class of a declared service at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    Healthy,
    /// Still starting; no verdict yet.
    Unknown,
    Unhealthy,
    /// Declared but no container exists.
    Absent,
}

impl ServiceHealth {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceHealth::Healthy => "healthy",
            ServiceHealth::Unknown => "unknown",
            ServiceHealth::Unhealthy => "unhealthy",
            ServiceHealth::Absent => "absent",
        }
    }

    pub fn is_healthy(self) -> bool {
        self == ServiceHealth::Healthy
    }

    fn severity(self) -> u8 {
        match self {
            ServiceHealth::Healthy => 0,
            ServiceHealth::Unknown => 1,
            ServiceHealth::Unhealthy => 2,
            ServiceHealth::Absent => 3,
        }
    }

    /// The less healthy of two classes. Replicas of one service fold with this.
    pub fn worst(self, other: ServiceHealth) -> ServiceHealth {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(state: &str, status: &str) -> ContainerStatus {
        ContainerStatus {
            service: "n8n".into(),
            state: state.into(),
            status: status.into(),
        }
    }

    #[test]
    fn health_from_status_text() {
        assert_eq!(row("running", "Up 2 minutes (healthy)").health(), ServiceHealth::Healthy);
        assert_eq!(row("running", "Up 2 minutes (unhealthy)").health(), ServiceHealth::Unhealthy);
        assert_eq!(
            row("running", "Up 5 seconds (health: starting)").health(),
            ServiceHealth::Unknown
        );
        assert_eq!(row("running", "Up 1 hour").health(), ServiceHealth::Healthy);
        assert_eq!(row("restarting", "Restarting (1) 3 seconds ago").health(), ServiceHealth::Unhealthy);
        assert_eq!(row("exited", "Exited (0) 1 minute ago").health(), ServiceHealth::Unhealthy);
        assert_eq!(row("created", "Created").health(), ServiceHealth::Unknown);
    }

    #[test]
    fn worst_prefers_less_healthy() {
        assert_eq!(ServiceHealth::Healthy.worst(ServiceHealth::Unknown), ServiceHealth::Unknown);
        assert_eq!(ServiceHealth::Unhealthy.worst(ServiceHealth::Healthy), ServiceHealth::Unhealthy);
        assert_eq!(ServiceHealth::Unknown.worst(ServiceHealth::Absent), ServiceHealth::Absent);
    }

    #[test]
    fn variant_commands() {
        assert_eq!(ComposeVariant::Plugin.command(), "docker compose");
        assert_eq!(ComposeVariant::Standalone.to_string(), "docker-compose");
    }
}
