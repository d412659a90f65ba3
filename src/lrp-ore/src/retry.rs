//! A small exponential-backoff retry builder, in the shape of `mz_ore::retry`.
//!
//! Callers configure a [`Retry`] and turn it into a stream of backoff
//! durations with [`Retry::into_retry_stream`]; awaiting `.next()` on that
//! stream both sleeps for the next backoff interval and advances it.

use std::time::Duration;

/// Builder for an exponential backoff sequence.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    initial_backoff: Duration,
    multiplier: u32,
    max_backoff: Duration,
}

impl Default for Retry {
    fn default() -> Retry {
        Retry {
            initial_backoff: Duration::from_millis(125),
            multiplier: 2,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl Retry {
    /// Sets the initial backoff duration.
    pub fn initial_backoff(mut self, initial_backoff: Duration) -> Retry {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Clamps the maximum backoff duration.
    pub fn clamp_backoff(mut self, max_backoff: Duration) -> Retry {
        self.max_backoff = max_backoff;
        self
    }

    /// Turns this builder into a [`RetryStream`] that can be `.await`-ed in
    /// a loop to sleep with exponential backoff between attempts.
    pub fn into_retry_stream(self) -> RetryStream {
        RetryStream {
            next_backoff: self.initial_backoff,
            multiplier: self.multiplier,
            max_backoff: self.max_backoff,
        }
    }
}

/// A stream of backoff sleeps produced by [`Retry::into_retry_stream`].
pub struct RetryStream {
    next_backoff: Duration,
    multiplier: u32,
    max_backoff: Duration,
}

impl RetryStream {
    /// Sleeps for the current backoff duration, then advances it.
    pub async fn next(&mut self) {
        tokio::time::sleep(self.next_backoff).await;
        self.next_backoff = std::cmp::min(self.next_backoff * self.multiplier, self.max_backoff);
    }
}
