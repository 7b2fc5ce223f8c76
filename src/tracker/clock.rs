use chrono::{DateTime, Duration, Utc};

/// Source of the current wall-clock instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Periodic callback scheduling provided by the host loop
///
/// The host polls; a due poll means one tick should be emitted.
pub trait TickScheduler {
    /// Start a periodic schedule; the first tick is due one period after `now`
    fn schedule(&mut self, period: Duration, now: DateTime<Utc>);

    fn cancel(&mut self);

    fn is_scheduled(&self) -> bool;

    /// Whether a tick is due at `now`. Consumes the tick.
    fn poll(&mut self, now: DateTime<Utc>) -> bool;
}

/// Deadline-based scheduler driven by the TUI event loop
#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    period: Option<Duration>,
    next_due: Option<DateTime<Utc>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, period: Duration, now: DateTime<Utc>) {
        let period = period.max(Duration::milliseconds(1));
        self.period = Some(period);
        self.next_due = Some(now + period);
    }

    fn cancel(&mut self) {
        self.period = None;
        self.next_due = None;
    }

    fn is_scheduled(&self) -> bool {
        self.next_due.is_some()
    }

    fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let (Some(period), Some(due)) = (self.period, self.next_due) else {
            return false;
        };
        if now < due {
            return false;
        }

        // Skip missed periods instead of bursting
        let period_ms = period.num_milliseconds();
        let missed = (now - due).num_milliseconds() / period_ms;
        self.next_due = Some(due + Duration::milliseconds(period_ms * (missed + 1)));
        true
    }
}
