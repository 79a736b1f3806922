use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for render loop events.
///
/// Keeps the tick body free of output concerns: the CLI wants a summary at
/// exit, the desktop app and tests want nothing.
pub trait TickLogger: Send {
    /// Called once at the end of every tick.
    fn tick(&mut self, tick: u64);

    /// Record how long a named stage took in one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. distance, frame index).
    fn metric(&mut self, name: &str, value: f64);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullTickLogger;

impl TickLogger for NullTickLogger {
    fn tick(&mut self, _tick: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Running count/sum/max of a series, in constant memory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aggregate {
    pub count: u64,
    pub sum: f64,
    pub max: f64,
}

impl Aggregate {
    pub fn record(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Logger that aggregates per-stage timings and metrics and prints a
/// summary when the loop stops. A progress line is logged every
/// `report_every` ticks at debug level.
pub struct SummaryTickLogger {
    report_every: u64,
    timings: BTreeMap<String, Aggregate>,
    metrics: BTreeMap<String, Aggregate>,
    start_time: Instant,
    ticks: u64,
}

impl SummaryTickLogger {
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every: report_every.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            ticks: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Render summary ({} ticks, {elapsed_s:.1}s):",
            self.ticks
        )];
        for (stage, agg) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:6.2}ms  max {:7.2}ms",
                agg.average(),
                agg.max
            ));
        }
        for (name, agg) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1} over {} ticks", agg.average(), agg.count));
        }
        if elapsed_s > 0.0 {
            lines.push(format!(
                "  Tick rate: {:.1} Hz",
                self.ticks as f64 / elapsed_s
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for SummaryTickLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl TickLogger for SummaryTickLogger {
    fn tick(&mut self, tick: u64) {
        self.ticks += 1;
        if tick % self.report_every == 0 {
            let total = self.timings.get("tick").map_or(0.0, |a| a.average());
            log::debug!("Tick {tick}: avg {total:.2}ms per tick");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
