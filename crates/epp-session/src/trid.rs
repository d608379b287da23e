//! Client transaction identifiers (`<clTRID>`).

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Produces a fresh client transaction ID for each command.
pub trait TransactionIdSource {
    fn next_id(&mut self) -> String;
}

impl<F: FnMut() -> String> TransactionIdSource for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Seconds since the Unix epoch.
pub trait Clock {
    fn unix_seconds(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl<F: Fn() -> u64> Clock for F {
    fn unix_seconds(&self) -> u64 {
        self()
    }
}

/// `{prefix}-{unix seconds}-{sequence}-{random}` identifiers.
///
/// The sequence starts at 1 and increments per ID, so IDs stay distinct
/// within a session even when the clock does not move.
#[derive(Debug)]
pub struct ClockRandomIds<C = SystemClock, R = StdRng> {
    prefix: String,
    clock: C,
    rng: R,
    sequence: u64,
}

impl ClockRandomIds {
    /// System clock and an entropy-seeded generator, prefix `epp`.
    pub fn new() -> Self {
        Self::with_parts(SystemClock, StdRng::from_entropy())
    }
}

impl Default for ClockRandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, R: RngCore> ClockRandomIds<C, R> {
    pub fn with_parts(clock: C, rng: R) -> Self {
        Self {
            prefix: "epp".to_string(),
            clock,
            rng,
            sequence: 0,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl<C: Clock, R: RngCore> TransactionIdSource for ClockRandomIds<C, R> {
    fn next_id(&mut self) -> String {
        self.sequence += 1;
        let random: u16 = self.rng.gen_range(0..10_000);
        format!(
            "{}-{}-{}-{:04}",
            self.prefix,
            self.clock.unix_seconds(),
            self.sequence,
            random
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_prefix_seconds_sequence_random() {
        let mut ids = ClockRandomIds::with_parts(|| 1_700_000_000u64, StdRng::seed_from_u64(7));
        let first = ids.next_id();
        let second = ids.next_id();

        let parts: Vec<&str> = first.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "epp");
        assert_eq!(parts[1], "1700000000");
        assert_eq!(parts[2], "1");
        assert_eq!(parts[3].len(), 4);
        assert!(parts[3].bytes().all(|b| b.is_ascii_digit()));

        assert!(second.starts_with("epp-1700000000-2-"));
        assert_ne!(first, second);
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = ClockRandomIds::with_parts(|| 5u64, StdRng::seed_from_u64(42)).with_prefix("t");
        let mut b = ClockRandomIds::with_parts(|| 5u64, StdRng::seed_from_u64(42)).with_prefix("t");
        for _ in 0..5 {
            assert_eq!(a.next_id(), b.next_id());
        }
    }

    #[test]
    fn closures_are_sources() {
        let mut n = 0;
        let mut source = move || {
            n += 1;
            format!("ABC-{n}")
        };
        assert_eq!(source.next_id(), "ABC-1");
        assert_eq!(source.next_id(), "ABC-2");
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.unix_seconds() > 1_577_836_800);
    }
}
