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

//! The reading queue: every unfinished document, ordered so that subjects
//! whose next session is closest come first.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::deadline::Schedule;
use crate::metadata::MetadataStore;
use crate::types::item::Item;
use crate::types::weekday::Weekday;

/// Item path → finished.
pub type Completion = BTreeMap<String, bool>;

/// Which item the user was looking at before the queue was rebuilt.
#[derive(Clone, Copy, Default, Debug)]
pub struct Cursor<'a> {
    /// The item open in the current session.
    pub session: Option<&'a str>,
    /// The item opened most recently in any session.
    pub last_opened: Option<&'a str>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    #[serde(flatten)]
    pub item: Item,
    pub urgency: u8,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Queue {
    entries: Vec<QueueEntry>,
    position: Option<usize>,
    total: usize,
}

/// The queue as sent to clients.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub items: Vec<QueueEntry>,
    pub position: Option<usize>,
    pub current: Option<QueueEntry>,
    pub prev: Option<QueueEntry>,
    pub next: Option<QueueEntry>,
    pub remaining: usize,
    pub total: usize,
}

/// Build the queue from scratch.
///
/// Subjects are ordered by urgency, then by the number of unfinished items
/// (more first), then by name. Within a subject, items are ordered by week,
/// then rank, then name.
pub fn build_queue(
    items: &[Item],
    completion: &Completion,
    schedule: &Schedule,
    metadata: &MetadataStore,
    today: Weekday,
    cursor: Cursor<'_>,
) -> Queue {
    let mut subjects: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
    for item in items {
        if !completion.get(&item.path).copied().unwrap_or(false) {
            subjects.entry(item.subject.as_str()).or_default().push(item);
        }
    }

    let mut groups: Vec<(u8, &str, Vec<&Item>)> = subjects
        .into_iter()
        .map(|(subject, pending)| (schedule.urgency(subject, today), subject, pending))
        .collect();
    // Stable, and the map iterates by name, so ties fall back to the name.
    groups.sort_by_key(|(urgency, _, pending)| (*urgency, Reverse(pending.len())));

    let mut entries = Vec::new();
    for (urgency, _, mut pending) in groups {
        pending.sort_by(|a, b| {
            (a.week, metadata.get(&a.path).rank, &a.name, &a.path).cmp(&(
                b.week,
                metadata.get(&b.path).rank,
                &b.name,
                &b.path,
            ))
        });
        entries.extend(pending.into_iter().map(|item| QueueEntry {
            item: item.clone(),
            urgency,
        }));
    }

    let mut queue = Queue {
        entries,
        position: None,
        total: items.len(),
    };
    let selected = [cursor.session, cursor.last_opened]
        .into_iter()
        .flatten()
        .find_map(|path| queue.index_of(path));
    queue.position = selected.or(if queue.entries.is_empty() {
        None
    } else {
        Some(0)
    });
    queue
}

impl Queue {
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of documents, finished or not.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.position.and_then(|i| self.entries.get(i))
    }

    pub fn next(&self) -> Option<&QueueEntry> {
        self.position.and_then(|i| self.entries.get(i + 1))
    }

    pub fn prev(&self) -> Option<&QueueEntry> {
        self.position
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.entries.get(i))
    }

    /// Move to the next item. Returns `false` at the end of the queue.
    pub fn advance(&mut self) -> bool {
        match self.position {
            Some(i) if i + 1 < self.entries.len() => {
                self.position = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Move to the previous item. Returns `false` at the head of the queue.
    pub fn retreat(&mut self) -> bool {
        match self.position {
            Some(i) if i > 0 => {
                self.position = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Make the given item current, if it is in the queue.
    pub fn select(&mut self, path: &str) -> bool {
        match self.index_of(path) {
            Some(i) => {
                self.position = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> QueueView {
        QueueView {
            items: self.entries.clone(),
            position: self.position,
            current: self.current().cloned(),
            prev: self.prev().cloned(),
            next: self.next().cloned(),
            remaining: self.entries.len(),
            total: self.total,
        }
    }

    fn index_of(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.item.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tag::Tag;

    fn item(week: u32, subject: &str, name: &str) -> Item {
        Item {
            path: format!("{week}/{subject}/{name}.pdf"),
            name: name.to_string(),
            week,
            subject: subject.to_string(),
            pages: None,
            tag: Tag::Unset,
        }
    }

    fn paths(queue: &Queue) -> Vec<&str> {
        queue
            .entries()
            .iter()
            .map(|e| e.item.path.as_str())
            .collect()
    }

    fn fixture() -> (Vec<Item>, MetadataStore) {
        let items = vec![
            item(1, "Algebra", "b"),
            item(1, "Algebra", "a"),
            item(2, "Algebra", "c"),
            item(1, "Biology", "x"),
            item(1, "Chemistry", "y"),
        ];
        let mut metadata = MetadataStore::new();
        register(&mut metadata, &items);
        (items, metadata)
    }

    /// Register items one week and subject group at a time, as a scan does.
    fn register(metadata: &mut MetadataStore, items: &[Item]) {
        let mut groups: BTreeMap<(u32, &str), Vec<(&str, &str)>> = BTreeMap::new();
        for item in items {
            groups
                .entry((item.week, item.subject.as_str()))
                .or_default()
                .push((item.path.as_str(), item.name.as_str()));
        }
        for group in groups.into_values() {
            metadata.register(group);
        }
    }

    fn default_queue(items: &[Item], metadata: &MetadataStore) -> Queue {
        build_queue(
            items,
            &Completion::new(),
            &Schedule::default(),
            metadata,
            Weekday::MONDAY,
            Cursor::default(),
        )
    }

    #[test]
    fn test_empty() {
        let queue = build_queue(
            &[],
            &Completion::new(),
            &Schedule::default(),
            &MetadataStore::new(),
            Weekday::MONDAY,
            Cursor::default(),
        );
        assert!(queue.is_empty());
        assert_eq!(queue.position(), None);
        assert!(queue.current().is_none());
        assert!(queue.next().is_none());
        assert!(queue.prev().is_none());
    }

    #[test]
    fn test_queue_is_exactly_the_incomplete_items() {
        let (items, metadata) = fixture();
        let mut completion = Completion::new();
        completion.insert("1/Algebra/a.pdf".to_string(), true);
        completion.insert("1/Biology/x.pdf".to_string(), false);
        completion.insert("1/Chemistry/y.pdf".to_string(), true);
        let queue = build_queue(
            &items,
            &completion,
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        assert_eq!(queue.len(), items.len() - 2);
        let mut got = paths(&queue);
        got.sort();
        assert_eq!(got, vec!["1/Algebra/b.pdf", "1/Biology/x.pdf", "2/Algebra/c.pdf"]);
        assert_eq!(queue.view().total, 5);
        assert_eq!(queue.view().remaining, 3);
    }

    #[test]
    fn test_more_pending_wins_urgency_tie() {
        let (items, metadata) = fixture();
        let mut schedule = Schedule::default();
        // Both due in two days.
        schedule.theory.insert("Algebra".to_string(), Weekday::WEDNESDAY);
        schedule.practice.insert("Biology".to_string(), Weekday::WEDNESDAY);
        let queue = build_queue(
            &items,
            &Completion::new(),
            &schedule,
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        assert_eq!(
            paths(&queue),
            vec![
                "1/Algebra/a.pdf",
                "1/Algebra/b.pdf",
                "2/Algebra/c.pdf",
                "1/Biology/x.pdf",
                "1/Chemistry/y.pdf",
            ]
        );
        assert_eq!(queue.entries()[0].urgency, 2);
        assert_eq!(queue.entries()[4].urgency, 7);
    }

    #[test]
    fn test_sooner_deadline_first() {
        let (items, metadata) = fixture();
        let mut schedule = Schedule::default();
        schedule.theory.insert("Algebra".to_string(), Weekday::FRIDAY);
        schedule.theory.insert("Chemistry".to_string(), Weekday::TUESDAY);
        let queue = build_queue(
            &items,
            &Completion::new(),
            &schedule,
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        let subjects: Vec<&str> = queue
            .entries()
            .iter()
            .map(|e| e.item.subject.as_str())
            .collect();
        assert_eq!(
            subjects,
            vec!["Chemistry", "Algebra", "Algebra", "Algebra", "Biology"]
        );
    }

    #[test]
    fn test_due_today_is_least_urgent() {
        let (items, metadata) = fixture();
        let mut schedule = Schedule::default();
        schedule.theory.insert("Chemistry".to_string(), Weekday::MONDAY);
        schedule.theory.insert("Biology".to_string(), Weekday::SUNDAY);
        let queue = build_queue(
            &items,
            &Completion::new(),
            &schedule,
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        let last = queue.entries().last().unwrap();
        assert_eq!(last.item.subject, "Chemistry");
        assert_eq!(last.urgency, 7);
        assert_eq!(queue.entries()[0].item.subject, "Biology");
        assert_eq!(queue.entries()[0].urgency, 6);
    }

    #[test]
    fn test_rank_orders_within_a_week() {
        let (items, mut metadata) = fixture();
        let group = ["1/Algebra/a.pdf", "1/Algebra/b.pdf"];
        assert!(metadata.swap(&group, "1/Algebra/b.pdf", crate::metadata::Direction::Up));
        let queue = build_queue(
            &items,
            &Completion::new(),
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        assert_eq!(
            &paths(&queue)[..3],
            &["1/Algebra/b.pdf", "1/Algebra/a.pdf", "2/Algebra/c.pdf"]
        );
    }

    #[test]
    fn test_cursor_prefers_session_item() {
        let (items, metadata) = fixture();
        let cursor = Cursor {
            session: Some("1/Biology/x.pdf"),
            last_opened: Some("2/Algebra/c.pdf"),
        };
        let queue = build_queue(
            &items,
            &Completion::new(),
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            cursor,
        );
        assert_eq!(queue.current().unwrap().item.path, "1/Biology/x.pdf");
    }

    #[test]
    fn test_cursor_falls_back_to_last_opened_then_head() {
        let (items, metadata) = fixture();
        let mut completion = Completion::new();
        completion.insert("1/Biology/x.pdf".to_string(), true);
        let cursor = Cursor {
            session: Some("1/Biology/x.pdf"),
            last_opened: Some("2/Algebra/c.pdf"),
        };
        let queue = build_queue(
            &items,
            &completion,
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            cursor,
        );
        assert_eq!(queue.current().unwrap().item.path, "2/Algebra/c.pdf");
        assert_eq!(queue.position(), Some(2));

        let cursor = Cursor {
            session: Some("gone.pdf"),
            last_opened: None,
        };
        let queue = build_queue(
            &items,
            &completion,
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            cursor,
        );
        assert_eq!(queue.position(), Some(0));
    }

    #[test]
    fn test_navigation() {
        let (items, metadata) = fixture();
        let mut queue = build_queue(
            &items,
            &Completion::new(),
            &Schedule::default(),
            &metadata,
            Weekday::MONDAY,
            Cursor::default(),
        );
        assert!(queue.prev().is_none());
        assert!(!queue.retreat());
        assert_eq!(queue.next().unwrap().item.path, "1/Algebra/b.pdf");
        assert!(queue.advance());
        assert_eq!(queue.prev().unwrap().item.path, "1/Algebra/a.pdf");
        assert!(queue.select("1/Chemistry/y.pdf"));
        assert!(queue.next().is_none());
        assert!(!queue.advance());
        assert!(!queue.select("nope.pdf"));
        assert_eq!(queue.position(), Some(4));
    }

    #[test]
    fn test_deterministic() {
        let (items, metadata) = fixture();
        let mut reversed = items.clone();
        reversed.reverse();
        let build = |items: &[Item]| {
            build_queue(
                items,
                &Completion::new(),
                &Schedule::default(),
                &metadata,
                Weekday::THURSDAY,
                Cursor::default(),
            )
        };
        assert_eq!(paths(&build(&items)), paths(&build(&reversed)));
    }

    #[test]
    fn test_late_document_keeps_name_order() {
        let mut metadata = MetadataStore::new();
        let early = vec![item(1, "A", "b"), item(1, "A", "c")];
        register(&mut metadata, &early);

        let items = vec![item(1, "A", "b"), item(1, "A", "c"), item(1, "A", "a")];
        register(&mut metadata, &items);
        assert_eq!(
            paths(&default_queue(&items, &metadata)),
            vec!["1/A/a.pdf", "1/A/b.pdf", "1/A/c.pdf"]
        );
    }

    #[test]
    fn test_nested_document_orders_by_name() {
        let mut nested = item(1, "A", "a");
        nested.path = "1/A/sub/a.pdf".to_string();
        // Path order puts the nested document second.
        let items = vec![item(1, "A", "b"), nested];
        let mut metadata = MetadataStore::new();
        register(&mut metadata, &items);
        assert_eq!(
            paths(&default_queue(&items, &metadata)),
            vec!["1/A/sub/a.pdf", "1/A/b.pdf"]
        );
    }
}
