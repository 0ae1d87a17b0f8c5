//! Delay between dispatch sweeps: exponential, capped, with jitter.

use std::time::Duration;

use rand::Rng;

/// Delay before sweep `round + 1`, after `round` sweeps have found nothing alive.
///
/// `base_ms * 2^(round-1)`, capped at `max_ms`, plus up to 10% jitter so that
/// requests stalled together do not re-probe in lockstep.
pub fn calculate_backoff(round: u32, base_ms: u64, max_ms: u64) -> Duration {
    if round == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(round - 1).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}
