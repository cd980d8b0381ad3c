use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Wall-clock timestamp used on every ledger record.
pub type Timestamp = DateTime<Utc>;

/// Render a timestamp the way it appears in hashed payloads:
/// RFC 3339, UTC, microsecond precision, `Z` suffix.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A manually driven clock for tests, fixtures and replays.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// A clock starting at the UNIX epoch.
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn set(&self, ts: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = ts;
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Strictly monotonic timestamps at microsecond resolution.
///
/// Reads the wrapped clock and, when it has not moved past the last value
/// handed out (same microsecond, or the wall clock stepped backwards),
/// returns the last value plus one microsecond instead.
pub struct MonotonicClock {
    source: Arc<dyn Clock>,
    last: Mutex<Option<Timestamp>>,
}

impl MonotonicClock {
    pub fn new(source: Arc<dyn Clock>) -> Self {
        Self {
            source,
            last: Mutex::new(None),
        }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Next timestamp, strictly greater than every previous one.
    pub fn tick(&self) -> Timestamp {
        let wall = self.source.now().trunc_subsecs(6);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match *last {
            Some(prev) if wall <= prev => prev + Duration::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }

    /// Current time of the wrapped clock, without advancing the sequence.
    pub fn wall(&self) -> Timestamp {
        self.source.now()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.tick()
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = *self.last.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MonotonicClock").field("last", &last).finish()
    }
}
