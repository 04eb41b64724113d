// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::deploy::{Phase, ServiceHealthReport};
use crate::error::Error;
use crate::remote::PlannedAction;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Announce the start of a pipeline phase.
    pub fn phase(&self, phase: Phase, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("  → {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                phase: Some(phase.as_str()),
                ..JsonEvent::new("phase", message)
            }),
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => emit(&JsonEvent::new("warning", message)),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => emit(&JsonEvent {
                duration_secs: self.duration(),
                ..JsonEvent::new("success", message)
            }),
        }
    }

    /// Print the final error line: failing phase, kind, and message.
    pub fn error(&self, error: &Error) {
        let message = error.to_string();
        let phase = error.phase().map(Phase::as_str);
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => match phase {
                Some(phase) => eprintln!("Error [{}/{}]: {message}", phase, error.kind()),
                None => eprintln!("Error [{}]: {message}", error.kind()),
            },
            OutputMode::Json => {
                let event = JsonEvent {
                    phase,
                    kind: Some(error.kind()),
                    exit_code: Some(error.exit_code()),
                    duration_secs: self.duration(),
                    ..JsonEvent::new("error", &message)
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Render one health snapshot.
    pub fn health(&self, report: &ServiceHealthReport) {
        match self.mode {
            OutputMode::Normal => {
                if !report.observed {
                    println!("  Health ({}): not observed", report.stage.as_str());
                    return;
                }
                println!("  Health ({}):", report.stage.as_str());
                for (service, health) in &report.services {
                    println!("    {:<20} {}", service, health);
                }
                if let Some(proxy) = &report.proxy {
                    println!("    {:<20} {}", proxy.unit, proxy.health);
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                phase: Some(Phase::Health.as_str()),
                details: serde_json::to_value(report).ok(),
                ..JsonEvent::new("health", report.stage.as_str())
            }),
        }
    }

    /// List the actions a dry run would have performed.
    pub fn plan(&self, actions: &[PlannedAction]) {
        match self.mode {
            OutputMode::Normal => {
                println!("Planned actions ({}):", actions.len());
                for (i, action) in actions.iter().enumerate() {
                    println!("  {:>3}. {}", i + 1, action);
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let listed: Vec<String> = actions.iter().map(ToString::to_string).collect();
                emit(&JsonEvent {
                    details: serde_json::to_value(listed).ok(),
                    ..JsonEvent::new("plan", "dry run")
                });
            }
        }
    }
}

fn emit(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str) -> Self {
        Self {
            event,
            message,
            phase: None,
            kind: None,
            exit_code: None,
            duration_secs: None,
            details: None,
        }
    }
}
