use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for job processing events.
///
/// Injected into each job so the handler never reaches for ambient logging
/// state, and so tests can observe or silence it.
pub trait JobLogger: Send {
    /// Record one transcribed segment (1-based emission index).
    fn segment(&mut self, index: usize, start: f64, end: f64, approx_words: usize, text: &str);

    /// Record how long a named stage of the job took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-job summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullJobLogger;

impl JobLogger for NullJobLogger {
    fn segment(&mut self, _index: usize, _start: f64, _end: f64, _words: usize, _text: &str) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger that forwards to the `log` facade and keeps per-stage timings
/// for a one-line summary at the end of the job.
pub struct LogJobLogger {
    job_id: Option<String>,
    timings: HashMap<String, f64>,
    segments: usize,
    start_time: Instant,
}

impl LogJobLogger {
    pub fn new(job_id: Option<String>) -> Self {
        Self {
            job_id,
            timings: HashMap::new(),
            segments: 0,
            start_time: Instant::now(),
        }
    }

    fn prefix(&self) -> String {
        match &self.job_id {
            Some(id) => format!("[{id}] "),
            None => String::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        let parts: Vec<String> = stages
            .into_iter()
            .map(|(stage, ms)| format!("{stage} {ms:.0}ms"))
            .collect();

        Some(format!(
            "{}Job summary ({} segments, {:.1}s total): {}",
            self.prefix(),
            self.segments,
            elapsed_ms / 1000.0,
            parts.join(", ")
        ))
    }

    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).copied()
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }
}

impl Default for LogJobLogger {
    fn default() -> Self {
        Self::new(None)
    }
}

impl JobLogger for LogJobLogger {
    fn segment(&mut self, index: usize, start: f64, end: f64, approx_words: usize, text: &str) {
        self.segments += 1;
        log::info!(
            "{}Segment #{index}: {}-{} words=~{approx_words}\n{text:?}",
            self.prefix(),
            mmss(start),
            mmss(end)
        );
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        *self.timings.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn info(&mut self, message: &str) {
        log::info!("{}{message}", self.prefix());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}

/// Format seconds as `m:ss`, truncating fractions.
pub fn mmss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
