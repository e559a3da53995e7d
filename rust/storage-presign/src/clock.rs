//! Time sources for signing.
//!
//! The signer reads its clock exactly once per call. Tests and callers that
//! need reproducible URLs inject a [`FixedClock`].

use chrono::{DateTime, Utc};

#[cfg(not(target_arch = "wasm32"))]
use std::time::SystemTime;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, web::SystemTimeExt};

/// A source of the current UTC time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
///
/// Uses platform-appropriate time sources (std on native, web-time on wasm).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        #[cfg(target_arch = "wasm32")]
        {
            DateTime::<Utc>::from(SystemTime::now().to_std())
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            DateTime::<Utc>::from(SystemTime::now())
        }
    }
}

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create a clock frozen at `time`.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
