//! Hysteresis fan-duty policy.
//!
//! Stateless: the decision depends only on the effective temperature and
//! the duty the fan is currently running at.
//!
//! Each duty floor has an escalation threshold and, 5 °C lower than the
//! escalation threshold of the floor above it, a release threshold. Both
//! are inclusive. Between them sits a dead band where nothing changes:
//!
//! ```text
//!  duty 100 ──────────── escalate at ≥80 ─┐
//!                                          │ release to 90 at ≤75
//!  duty  90 ──────────── escalate at ≥70 ─┤
//!                                          │ release to 80 at ≤65
//!  duty  80 ──────────── escalate at ≥60 ─┤
//!   ...                                    ...
//!  duty  50 ──────────── escalate at ≥30    release to 50 at ≤35
//! ```
//!
//! Escalations are checked hottest first and releases coolest first, so a
//! large swing lands on the right floor in a single step.

/// `(temp ≥ threshold, duty < floor) → floor`
const ESCALATE: [(u8, u8); 6] = [(80, 100), (70, 90), (60, 80), (50, 70), (40, 60), (30, 50)];

/// `(temp ≤ threshold, duty > floor) → floor`
const RELEASE: [(u8, u8); 5] = [(35, 50), (45, 60), (55, 70), (65, 80), (75, 90)];

/// Lowest duty the policy ever selects.
pub const MIN_AUTO_DUTY: u8 = 50;

/// Next duty for `effective_temp`, or `None` to leave the fan alone.
pub fn next_duty(effective_temp: u8, current_duty: u8) -> Option<u8> {
    for &(threshold, floor) in &ESCALATE {
        if effective_temp >= threshold && current_duty < floor {
            return Some(floor);
        }
    }
    for &(threshold, floor) in &RELEASE {
        if effective_temp <= threshold && current_duty > floor {
            return Some(floor);
        }
    }
    None
}
