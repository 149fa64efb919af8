//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, capturing the intermediate
//! text for debugging, and emitting structured telemetry.

use std::time::{Duration, Instant};

use crate::pipeline::context::OccurrenceFlags;

// ============================================================================
// StageReport
// ============================================================================

/// Summary of one finished stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    /// Placeholders recorded so far, across all tables
    masked: usize,
    flags: OccurrenceFlags,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            masked: 0,
            flags: OccurrenceFlags::default(),
        }
    }

    pub fn with_masked(mut self, masked: usize) -> Self {
        self.masked = masked;
        self
    }

    pub fn with_flags(mut self, flags: OccurrenceFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn masked(&self) -> usize {
        self.masked
    }

    pub fn flags(&self) -> OccurrenceFlags {
        self.flags
    }
}

/// Wall-clock timer for a single stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

// ============================================================================
// Observer trait
// ============================================================================

/// Callbacks fired by [`Pipeline::run`](crate::pipeline::runner::Pipeline::run).
///
/// Every method has a no-op default, so implementors only override what they
/// need.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Working text after a text-rewriting stage.
    fn on_text(&mut self, _stage: &'static str, _text: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Collects one [`StageReport`] per stage, in execution order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}

/// Captures the working text after every stage.
#[derive(Debug, Clone, Default)]
pub struct TextTraceObserver {
    snapshots: Vec<(&'static str, String)>,
}

impl TextTraceObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[(&'static str, String)] {
        &self.snapshots
    }

    /// Text as it stood after `stage`, if that stage ran.
    pub fn text_after(&self, stage: &str) -> Option<&str> {
        self.snapshots
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, text)| text.as_str())
    }
}

impl PipelineObserver for TextTraceObserver {
    fn on_text(&mut self, stage: &'static str, text: &str) {
        self.snapshots.push((stage, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_builder_methods() {
        let flags = OccurrenceFlags {
            hashtags_or_mentions: true,
            repeated_punctuation: false,
        };
        let report = StageReport::new(Duration::from_millis(2))
            .with_masked(3)
            .with_flags(flags);

        assert_eq!(report.masked(), 3);
        assert!(report.flags().hashtags_or_mentions);
        assert!((report.elapsed_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_timing_observer_collects_in_order() {
        let mut obs = StageTimingObserver::new();
        obs.on_stage_end("a", &StageReport::new(Duration::from_millis(1)));
        obs.on_stage_end("b", &StageReport::new(Duration::from_millis(2)));

        let names: Vec<&str> = obs.reports().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(obs.total(), Duration::from_millis(3));
    }

    #[test]
    fn test_text_trace_lookup() {
        let mut obs = TextTraceObserver::new();
        obs.on_text("first", "one");
        obs.on_text("second", "two");

        assert_eq!(obs.text_after("second"), Some("two"));
        assert_eq!(obs.text_after("third"), None);
    }
}
