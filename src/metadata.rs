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

use crate::types::tag::Tag;

/// Per-document information that the user can change: its position within
/// its week/subject group, its classification, and reading progress.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaEntry {
    pub rank: i64,
    pub tag: Tag,
    pub pages: Option<u32>,
    pub last_page: Option<u32>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// A flat map from item path to its metadata entry.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataStore {
    entries: BTreeMap<String, MetaEntry>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for the given item, or the default entry if the item
    /// has none.
    pub fn get(&self, id: &str) -> MetaEntry {
        self.entries.get(id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Create entries for the members of one week and subject group seen for
    /// the first time. `group` holds `(id, name)` pairs. Returns the number of
    /// entries created.
    ///
    /// While the group's ranks still follow name order, the group is
    /// re-ranked by name so new members slot into place. A group that was
    /// reordered by hand keeps its order and new members go last.
    pub fn register<'a>(&mut self, group: impl IntoIterator<Item = (&'a str, &'a str)>) -> usize {
        let mut members: Vec<(&str, &str)> = group.into_iter().collect();
        members.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        members.dedup();
        let fresh: Vec<&str> = members
            .iter()
            .filter(|(id, _)| !self.entries.contains_key(*id))
            .map(|(id, _)| *id)
            .collect();
        if fresh.is_empty() {
            return 0;
        }

        let mut known: Vec<(i64, &str, &str)> = members
            .iter()
            .filter_map(|(id, name)| self.entries.get(*id).map(|e| (e.rank, *name, *id)))
            .collect();
        known.sort();
        let by_rank: Vec<&str> = known.iter().map(|(_, _, id)| *id).collect();
        let by_name: Vec<&str> = members
            .iter()
            .filter(|(id, _)| !fresh.contains(id))
            .map(|(id, _)| *id)
            .collect();

        let next = self.next_rank();
        let new_ranks = next..next + fresh.len() as i64;
        if by_rank == by_name {
            // Fresh ranks are above every existing rank, so the slots stay
            // sorted.
            let slots = known.iter().map(|(rank, _, _)| *rank).chain(new_ranks);
            for ((id, _), rank) in members.iter().zip(slots) {
                self.entry(id).rank = rank;
            }
        } else {
            for (id, rank) in fresh.iter().zip(new_ranks) {
                self.entry(id).rank = rank;
            }
        }
        fresh.len()
    }

    pub fn set_tag(&mut self, id: &str, tag: Tag) {
        self.entry(id).tag = tag;
    }

    pub fn set_pages(&mut self, id: &str, pages: u32) {
        self.entry(id).pages = Some(pages);
    }

    pub fn set_last_page(&mut self, id: &str, page: u32) {
        self.entry(id).last_page = Some(page);
    }

    /// Move `id` one place up or down within `group` by exchanging its rank
    /// with its neighbour's. The group is ordered by rank, ties broken by
    /// path. Returns `false`, leaving the store unchanged, when `id` is not
    /// in the group or has no neighbour in that direction.
    pub fn swap(&mut self, group: &[&str], id: &str, direction: Direction) -> bool {
        let mut ordered: Vec<(i64, &str)> = group.iter().map(|g| (self.get(g).rank, *g)).collect();
        ordered.sort();
        let Some(index) = ordered.iter().position(|(_, g)| *g == id) else {
            return false;
        };
        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|i| *i < ordered.len()),
        };
        let Some(neighbour) = neighbour else {
            return false;
        };
        if ordered.windows(2).any(|w| w[0].0 == w[1].0) {
            // Ranks are only compared within a group, so ties can be spread
            // out in place.
            let base = ordered[0].0;
            for (offset, (rank, g)) in ordered.iter_mut().enumerate() {
                *rank = base + offset as i64;
                self.entry(*g).rank = *rank;
            }
        }
        let (rank_a, id_a) = ordered[index];
        let (rank_b, id_b) = ordered[neighbour];
        self.entry(id_a).rank = rank_b;
        self.entry(id_b).rank = rank_a;
        true
    }

    fn next_rank(&self) -> i64 {
        self.entries
            .values()
            .map(|e| e.rank + 1)
            .max()
            .unwrap_or(0)
    }

    fn entry(&mut self, id: &str) -> &mut MetaEntry {
        let next = self.next_rank();
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| MetaEntry {
                rank: next,
                ..MetaEntry::default()
            })
    }
}
