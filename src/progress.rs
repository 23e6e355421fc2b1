//! Seed progress reporting.
//!
//! Reports observable progress during `spx seed` so users see how much of
//! the input has been aggregated and how many organisations have been
//! handed to the writer. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// A single progress event for seeding.
#[derive(Clone, Debug)]
pub enum SeedProgressEvent {
    /// Row intake: n rows folded into the aggregate so far. Total unknown.
    Aggregating { rows: u64 },
    /// Write phase: n of total organisations handed to the writer.
    Writing { organisations: u64, total: u64 },
}

/// Reports seed progress. Implementations write to stderr (human or JSON).
pub trait SeedProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the seed pipeline.
    fn report(&self, event: SeedProgressEvent);
}

/// Human-friendly progress on stderr: "seed  writing  1,234 / 5,000 organisations".
pub struct StderrProgress;

impl SeedProgressReporter for StderrProgress {
    fn report(&self, event: SeedProgressEvent) {
        let line = match &event {
            SeedProgressEvent::Aggregating { rows } => {
                format!("seed  aggregating  {} rows\n", format_number(*rows))
            }
            SeedProgressEvent::Writing {
                organisations,
                total,
            } => {
                format!(
                    "seed  writing  {} / {} organisations\n",
                    format_number(*organisations),
                    format_number(*total)
                )
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SeedProgressReporter for JsonProgress {
    fn report(&self, event: SeedProgressEvent) {
        let obj = match &event {
            SeedProgressEvent::Aggregating { rows } => serde_json::json!({
                "event": "progress",
                "phase": "aggregating",
                "rows": rows
            }),
            SeedProgressEvent::Writing {
                organisations,
                total,
            } => serde_json::json!({
                "event": "progress",
                "phase": "writing",
                "organisations": organisations,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SeedProgressReporter for NoProgress {
    fn report(&self, _event: SeedProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn SeedProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
