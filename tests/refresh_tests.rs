//! Refresh Gate Tests
//!
//! Throttling of slow sensors against a wrapping millisecond clock.

use grove_firmware::acquisition::refresh::{acquire, RefreshState};
use proptest::prelude::*;

#[test]
fn test_measures_at_0_and_600_but_not_400() {
    let mut state = RefreshState::new(500);
    let mut measured = Vec::new();

    for t in [0u32, 400, 600] {
        if acquire(t, &mut state, || t).is_some() {
            measured.push(t);
        }
    }

    assert_eq!(measured, vec![0, 600]);
}

#[test]
fn test_zero_timestamp_is_a_real_measurement() {
    let mut state = RefreshState::new(500);
    assert!(state.acquire(0, || ()).is_some());
    // A sentinel-based gate would re-measure here
    assert!(state.acquire(1, || ()).is_none());
}

#[test]
fn test_failed_measure_still_resets_throttle() {
    let mut state = RefreshState::new(500);
    let outcome: Option<Result<u8, ()>> = state.acquire(100, || Err(()));
    assert_eq!(outcome, Some(Err(())));
    assert_eq!(state.last_measured_at(), Some(100));
    assert!(state.acquire(300, || Ok::<u8, ()>(1)).is_none());
}

#[test]
fn test_throttled_call_does_not_move_timestamp() {
    let mut state = RefreshState::new(500);
    state.acquire(0, || ());
    state.acquire(400, || ());
    assert_eq!(state.last_measured_at(), Some(0));
}

#[test]
fn test_rollover() {
    let mut state = RefreshState::new(1_000);
    state.acquire(u32::MAX - 499, || ());
    assert!(state.acquire(500, || ()).is_none());
    assert!(state.acquire(501, || ()).is_some());
}

proptest! {
    #[test]
    fn prop_timestamps_never_decrease(steps in proptest::collection::vec(0u32..2_000, 1..50)) {
        let mut state = RefreshState::new(500);
        let mut now = 0u32;
        let mut last = None;
        for step in steps {
            now += step;
            let was_due = state.is_due(now);
            let ran = state.acquire(now, || ()).is_some();
            prop_assert_eq!(was_due, ran);
            if let (Some(prev), Some(cur)) = (last, state.last_measured_at()) {
                prop_assert!(cur >= prev);
            }
            last = state.last_measured_at();
        }
    }

    #[test]
    fn prop_due_iff_gap_exceeds_interval(start in any::<u32>(), gap in 0u32..5_000) {
        let mut state = RefreshState::new(1_000);
        state.acquire(start, || ());
        prop_assert_eq!(state.is_due(start.wrapping_add(gap)), gap > 1_000);
    }
}
