//! Native timestamps to local [`DateTime`] values.
//!
//! Every source format is first reduced to seconds and nanoseconds since the
//! Unix epoch, then converted once, so callers never see which OS produced a
//! time. Values chrono cannot represent clamp to the Unix epoch.

use chrono::{DateTime, Local, Utc};

/// 100 ns ticks between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_DIFF: i128 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i128 = 10_000_000;
const NANOS_PER_TICK: i128 = 100;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a FILETIME (100 ns ticks since 1601) to local time.
pub fn filetime_to_local(ticks: u64) -> DateTime<Local> {
    let since_unix = i128::from(ticks) - FILETIME_UNIX_DIFF;
    let secs = since_unix.div_euclid(TICKS_PER_SECOND);
    let nanos = since_unix.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;

    match i64::try_from(secs) {
        Ok(secs) => from_unix_parts(secs, nanos as u32),
        Err(_) => epoch(),
    }
}

/// Combine the high and low halves of a FILETIME.
pub fn filetime_ticks(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

/// Convert a `stat` time (`tv_sec`, `tv_nsec`) to local time.
///
/// Out-of-range nanoseconds are carried into the seconds.
pub fn unix_to_local(secs: i64, nanos: i64) -> DateTime<Local> {
    let carry = nanos.div_euclid(NANOS_PER_SECOND);
    let nanos = nanos.rem_euclid(NANOS_PER_SECOND);

    match secs.checked_add(carry) {
        Some(secs) => from_unix_parts(secs, nanos as u32),
        None => epoch(),
    }
}

fn from_unix_parts(secs: i64, nanos: u32) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(epoch)
}

fn epoch() -> DateTime<Local> {
    DateTime::<Utc>::default().with_timezone(&Local)
}
