// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for weekly heating schedules.
//!
//! # Types
//!
//! - [`DayOfWeek`] - The seven fixed day keys, Sunday first
//! - [`TimeOfDay`] - Strict `HH:mm` time with minute precision
//!
//! # Functions
//!
//! - Time codec: [`format_time`], [`parse_time`], [`compare_time`],
//!   [`time_to_minutes`], [`minutes_to_time`], [`generate_time_options`]
//! - Setpoints: [`is_in_range`], [`is_half_step`], [`format_temperature`]

mod day;
mod temperature;
mod time;

pub use day::DayOfWeek;
pub use temperature::{
    DEFAULT_TEMPERATURE, MAX_TEMPERATURE, MIN_TEMPERATURE, TEMPERATURE_STEP, format_temperature,
    is_half_step, is_in_range,
};
pub use time::{
    DEFAULT_TIME_STEP_MINUTES, MINUTES_PER_DAY, TimeOfDay, compare_time, format_time,
    generate_time_options, minutes_to_time, parse_time, time_to_minutes,
};
