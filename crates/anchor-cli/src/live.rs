use tracing::info;

/// The two `--live-format` values spec.md §6 names. There is no TTY
/// renderer here — a live reporter only ever emits `tracing` events; a
/// terminal UI is explicitly out of scope (spec.md §1 Non-goals).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveFormat {
    Text,
    Json,
}

impl LiveFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(LiveFormat::Text),
            "json" => Some(LiveFormat::Json),
            _ => None,
        }
    }
}

/// Emits one `tracing` event per pipeline stage transition when `--live`
/// is set. `format` only changes whether the event's fields read as plain
/// text or as a `json=` blob; both paths go through the same `tracing`
/// subscriber, so `--live-format json` still relies on the process's
/// normal log sink rather than a second output channel.
pub struct LiveReporter {
    enabled: bool,
    format: LiveFormat,
}

impl LiveReporter {
    pub fn new(enabled: bool, format: LiveFormat) -> Self {
        Self { enabled, format }
    }

    pub fn stage(&self, finding_id: &str, stage: &str) {
        if !self.enabled {
            return;
        }
        match self.format {
            LiveFormat::Text => info!(finding_id, stage, "live stage transition"),
            LiveFormat::Json => {
                let payload = serde_json::json!({ "finding_id": finding_id, "stage": stage });
                info!(live = %payload, "live stage transition");
            }
        }
    }

    pub fn finished(&self, run_id: &str, findings_written: u32, errors: u32) {
        if !self.enabled {
            return;
        }
        info!(run_id, findings_written, errors, "live run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats_only() {
        assert_eq!(LiveFormat::parse("text"), Some(LiveFormat::Text));
        assert_eq!(LiveFormat::parse("json"), Some(LiveFormat::Json));
        assert_eq!(LiveFormat::parse("yaml"), None);
    }

    #[test]
    fn disabled_reporter_does_not_panic() {
        let reporter = LiveReporter::new(false, LiveFormat::Text);
        reporter.stage("f1", "derive");
        reporter.finished("r1", 0, 0);
    }
}
