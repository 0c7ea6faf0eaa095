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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::types::weekday::Weekday;

/// The urgency of a subject with no scheduled sessions.
pub const DEFAULT_URGENCY: u8 = 7;

/// Which weekday each subject's theory and practice sessions fall on.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub theory: BTreeMap<String, Weekday>,
    pub practice: BTreeMap<String, Weekday>,
}

/// The subjects scheduled on a single weekday.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
pub struct Day {
    pub theory: Vec<String>,
    pub practice: Vec<String>,
}

impl Schedule {
    /// Days until the subject's next session: the sooner of its theory and
    /// practice days, or [`DEFAULT_URGENCY`] if it has neither.
    pub fn urgency(&self, subject: &str, today: Weekday) -> u8 {
        [self.theory.get(subject), self.practice.get(subject)]
            .into_iter()
            .flatten()
            .map(|day| days_until(*day, today))
            .min()
            .unwrap_or(DEFAULT_URGENCY)
    }

    /// The schedule grouped by weekday, for display.
    pub fn by_day(&self) -> BTreeMap<Weekday, Day> {
        let mut days: BTreeMap<Weekday, Day> = BTreeMap::new();
        for (subject, day) in &self.theory {
            days.entry(*day).or_default().theory.push(subject.clone());
        }
        for (subject, day) in &self.practice {
            days.entry(*day).or_default().practice.push(subject.clone());
        }
        days
    }
}

/// Days from `today` until the next `assigned` day, in 1..=7. A session
/// falling on today counts as a full week away.
pub fn days_until(assigned: Weekday, today: Weekday) -> u8 {
    let diff = assigned.number() as i8 - today.number() as i8;
    match diff {
        0 => 7,
        d if d < 0 => (d + 7) as u8,
        d => d as u8,
    }
}
