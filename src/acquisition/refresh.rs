//! Refresh Gate
//!
//! Some sensors return garbage, or nothing at all, when they are measured
//! faster than their settle time. The gate decides whether a call should
//! touch the hardware or let the sensor hand back its last raw state.

/// Per-sensor throttle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct RefreshState {
    /// Millisecond timestamp of the last measurement attempt, `None` until the
    /// first one. A timestamp of `0` is a valid reading of the clock.
    last_measured_at: Option<u32>,
    /// Minimum time between measurements
    min_interval_ms: u32,
    /// Whether exactly `min_interval_ms` after the last attempt is due
    inclusive: bool,
}

impl RefreshState {
    /// Create a never-measured state that is due once strictly more than
    /// `min_interval_ms` has passed
    #[must_use]
    pub const fn new(min_interval_ms: u32) -> Self {
        Self {
            last_measured_at: None,
            min_interval_ms,
            inclusive: false,
        }
    }

    /// Like [`RefreshState::new`], but already due when exactly
    /// `min_interval_ms` has passed
    #[must_use]
    pub const fn inclusive(min_interval_ms: u32) -> Self {
        Self {
            last_measured_at: None,
            min_interval_ms,
            inclusive: true,
        }
    }

    /// Timestamp of the last measurement attempt
    #[must_use]
    pub const fn last_measured_at(&self) -> Option<u32> {
        self.last_measured_at
    }

    /// Minimum time between measurements
    #[must_use]
    pub const fn min_interval_ms(&self) -> u32 {
        self.min_interval_ms
    }

    /// True when a call at `now_ms` should measure.
    ///
    /// Uses wrapping subtraction so a rollover of the millisecond counter
    /// does not stall the gate.
    #[must_use]
    pub fn is_due(&self, now_ms: u32) -> bool {
        match self.last_measured_at {
            None => true,
            Some(last) => {
                let elapsed = now_ms.wrapping_sub(last);
                elapsed > self.min_interval_ms || (self.inclusive && elapsed == self.min_interval_ms)
            }
        }
    }

    /// Run `measure` if the gate is due, otherwise skip it.
    ///
    /// Returns `Some` with whatever `measure` produced (success or failure),
    /// or `None` when the call was throttled and the caller should fall back
    /// on the device's last state.
    ///
    /// The timestamp advances whenever `measure` runs, even if it fails. A
    /// sensor that keeps failing is therefore retried at the refresh cadence
    /// rather than on every call, which can hide a persistent fault for up to
    /// one interval per call.
    pub fn acquire<T, F>(&mut self, now_ms: u32, measure: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        if !self.is_due(now_ms) {
            trace!("refresh throttled at {} ms", now_ms);
            return None;
        }
        let outcome = measure();
        self.last_measured_at = Some(now_ms);
        Some(outcome)
    }
}

/// Free-function form of [`RefreshState::acquire`].
pub fn acquire<T, F>(now_ms: u32, state: &mut RefreshState, measure: F) -> Option<T>
where
    F: FnOnce() -> T,
{
    state.acquire(now_ms, measure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_always_measures() {
        let mut state = RefreshState::new(1_000);
        assert!(state.is_due(0));
        assert_eq!(state.acquire(0, || 7), Some(7));
        assert_eq!(state.last_measured_at(), Some(0));
    }

    #[test]
    fn boundary_is_exclusive() {
        let mut state = RefreshState::new(500);
        state.acquire(100, || ());
        assert!(!state.is_due(600));
        assert!(state.is_due(601));
    }

    #[test]
    fn inclusive_boundary() {
        let mut state = RefreshState::inclusive(500);
        state.acquire(100, || ());
        assert!(!state.is_due(599));
        assert!(state.is_due(600));
    }

    #[test]
    fn survives_counter_rollover() {
        let mut state = RefreshState::new(500);
        state.acquire(u32::MAX - 100, || ());
        // 300 ms later, after the wrap
        assert!(!state.is_due(199));
        // 601 ms later
        assert!(state.is_due(500));
    }
}
