// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Setpoint temperature limits and wire formatting.
//!
//! Setpoints are plain `f64` degrees Celsius in the schedule model so that
//! out-of-range values read from the device can still be shown and
//! validated. The device accepts 4.0-35.0 in 0.5 increments.

/// Lowest setpoint the valve accepts.
pub const MIN_TEMPERATURE: f64 = 4.0;

/// Highest setpoint the valve accepts.
pub const MAX_TEMPERATURE: f64 = 35.0;

/// Setpoint granularity.
pub const TEMPERATURE_STEP: f64 = 0.5;

/// Setpoint used for every day of a freshly created schedule.
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

/// Tolerance when checking that a setpoint lies on the 0.5 grid.
///
/// Far below any representable step error (20.1 * 2 = 40.2 is off the grid
/// by 0.2) but well above the rounding noise of parsed decimals.
const HALF_STEP_EPSILON: f64 = 1e-6;

/// Returns `true` if the value is inside `[4, 35]`.
#[must_use]
pub fn is_in_range(temperature: f64) -> bool {
    (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature)
}

/// Returns `true` if the value is a multiple of 0.5 within a small tolerance.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::is_half_step;
///
/// assert!(is_half_step(20.5));
/// assert!(is_half_step(21.0));
/// assert!(!is_half_step(20.3));
/// assert!(!is_half_step(20.1));
/// ```
#[must_use]
pub fn is_half_step(temperature: f64) -> bool {
    if !temperature.is_finite() {
        return false;
    }
    let doubled = temperature / TEMPERATURE_STEP;
    (doubled - doubled.round()).abs() < HALF_STEP_EPSILON
}

/// Formats a setpoint with the shortest representation that parses back
/// to the same value (`22`, `22.5`).
///
/// # Examples
///
/// ```
/// use trv_schedule::types::format_temperature;
///
/// assert_eq!(format_temperature(22.0), "22");
/// assert_eq!(format_temperature(22.5), "22.5");
/// assert_eq!(format_temperature(4.0), "4");
/// ```
#[must_use]
pub fn format_temperature(temperature: f64) -> String {
    // Display on f64 already yields the shortest round-tripping form;
    // adding zero turns -0 into 0
    format!("{}", temperature + 0.0)
}
