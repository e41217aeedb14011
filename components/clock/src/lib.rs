use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same timeline, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    current_time: Arc<AtomicU64>,
    start: Instant,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Arc::new(AtomicU64::new(0)),
            start: Instant::now(),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.current_time.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        let nanos = self.current_time.load(Ordering::SeqCst);
        self.start + Duration::from_nanos(nanos)
    }
}

/// Measures elapsed running time, and can be paused and repositioned.
pub struct Stopwatch<T: TimeSource> {
    time_source: T,
    offset: Duration,
    started_at: Option<Instant>,
}

impl<T: TimeSource> Stopwatch<T> {
    /// A stopped stopwatch reading zero.
    pub fn new(time_source: T) -> Self {
        Self {
            time_source,
            offset: Duration::ZERO,
            started_at: None,
        }
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.time_source.now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.offset += self.time_source.now().saturating_duration_since(started_at);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        let running = self
            .started_at
            .map(|started_at| self.time_source.now().saturating_duration_since(started_at))
            .unwrap_or_default();
        self.offset + running
    }

    /// Moves the reading to `elapsed` without changing whether it runs.
    pub fn set(&mut self, elapsed: Duration) {
        self.offset = elapsed;
        if self.started_at.is_some() {
            self.started_at = Some(self.time_source.now());
        }
    }
}
