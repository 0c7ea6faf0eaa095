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
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::weekday::Weekday;

/// Where to move the cursor after building the queue.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Step {
    Stay,
    Next,
    Prev,
}

/// Build the queue and render it as JSON.
pub fn render_queue(
    directory: Option<String>,
    today: Option<u8>,
    current: Option<String>,
    step: Step,
) -> Fallible<String> {
    let coll = Collection::new(directory)?;
    let today = match today {
        Some(n) => Weekday::try_from(n)?,
        None => Weekday::today(),
    };
    let mut queue = coll.state.state().queue(&coll.tree, today, None);
    if let Some(path) = current {
        if !queue.select(&path) {
            return fail(format!("not in the queue: {path}"));
        }
    }
    let moved = match step {
        Step::Stay => true,
        Step::Next => queue.advance(),
        Step::Prev => queue.retreat(),
    };
    if !moved {
        log::info!("Already at the edge of the queue.");
    }
    Ok(serde_json::to_string_pretty(&queue.view())?)
}

pub fn print_queue(
    directory: Option<String>,
    today: Option<u8>,
    current: Option<String>,
    step: Step,
) -> Fallible<()> {
    println!("{}", render_queue(directory, today, current, step)?);
    Ok(())
}
