// src/recency.rs
//! Recency filter: drops candidates older than the configured horizon.
//! Candidates without a timestamp pass through and are penalized later in
//! timeliness scoring instead.

use chrono::{DateTime, Duration, Utc};

use crate::candidate::Candidate;

/// Returns the kept candidates plus the number dropped as stale.
/// `max_age_hours == 0` disables the filter.
pub fn drop_stale(
    candidates: Vec<Candidate>,
    now: DateTime<Utc>,
    max_age_hours: u32,
) -> (Vec<Candidate>, usize) {
    if max_age_hours == 0 {
        return (candidates, 0);
    }
    let cutoff = now - Duration::hours(i64::from(max_age_hours));
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| match c.published_at {
            Some(ts) => ts >= cutoff,
            None => true,
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
