// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Datelike;
use chrono::Local;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// A day of the week, numbered from Sunday: 0 = Sunday, 1 = Monday, ..., 6 =
/// Saturday.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weekday(u8);

impl Weekday {
    pub const SUNDAY: Weekday = Weekday(0);
    pub const MONDAY: Weekday = Weekday(1);
    pub const TUESDAY: Weekday = Weekday(2);
    pub const WEDNESDAY: Weekday = Weekday(3);
    pub const THURSDAY: Weekday = Weekday(4);
    pub const FRIDAY: Weekday = Weekday(5);
    pub const SATURDAY: Weekday = Weekday(6);

    /// The school week, in display order.
    pub const SCHOOL_DAYS: [Weekday; 5] = [
        Weekday::MONDAY,
        Weekday::TUESDAY,
        Weekday::WEDNESDAY,
        Weekday::THURSDAY,
        Weekday::FRIDAY,
    ];

    pub fn today() -> Self {
        Self::from(Local::now().weekday())
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            _ => "Saturday",
        }
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 6 {
            Ok(Weekday(value))
        } else {
            fail(format!("invalid weekday: {value} (expected 0-6)"))
        }
    }
}

impl From<Weekday> for u8 {
    fn from(value: Weekday) -> Self {
        value.0
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        Weekday(value.num_days_from_sunday() as u8)
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
