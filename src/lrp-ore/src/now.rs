//! Wall-clock access, isolated behind a function so projection code never
//! calls `Utc::now()` directly (see `lrp-projector`, which takes `now` as a
//! parameter instead). Named after `mz_ore::now::SYSTEM_TIME`.

use chrono::{DateTime, Utc};

/// Returns the current wall-clock time.
pub fn system_time() -> DateTime<Utc> {
    Utc::now()
}
