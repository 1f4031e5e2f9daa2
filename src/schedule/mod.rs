// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weekly schedule model and device wire codec.
//!
//! - [`Transition`] - A `(time, temperature)` setpoint change
//! - [`DaySchedule`] - Up to six transitions for one day
//! - [`WeeklySchedule`] - All seven days, always complete
//! - [`MqttWeeklySchedule`] - One encoded string per day, as the device reports it
//!
//! # Examples
//!
//! ```
//! use trv_schedule::schedule::{parse_weekly_schedule, serialize_weekly_schedule, WeeklySchedule};
//!
//! let week = WeeklySchedule::default();
//! let wire = serialize_weekly_schedule(&week);
//! assert_eq!(wire.monday, "00:00/20");
//!
//! let parsed = parse_weekly_schedule(&wire).unwrap();
//! assert_eq!(parsed, week);
//! ```

mod codec;
mod model;

pub use codec::{
    create_empty_weekly_schedule, parse_day_schedule, parse_transition, parse_weekly_schedule,
    serialize_day_schedule, serialize_weekly_schedule,
};
pub use model::{DaySchedule, MqttWeeklySchedule, Transition, WeeklySchedule};
