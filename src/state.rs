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

use std::fs::read_to_string;
use std::fs::rename;
use std::fs::write;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::deadline::Schedule;
use crate::error::Fallible;
use crate::metadata::MetadataStore;
use crate::queue::Completion;
use crate::queue::Cursor;
use crate::queue::Queue;
use crate::queue::build_queue;
use crate::scan::FileTree;
use crate::scan::items;
use crate::types::weekday::Weekday;

/// Everything the user has told us: what is finished, when each subject
/// meets, per-document metadata, and the last document opened.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// Incremented on every accepted write.
    pub version: u64,
    pub completion: Completion,
    pub schedule: Schedule,
    pub metadata: MetadataStore,
    pub last_opened: Option<String>,
    /// Keys we don't know about are kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppState {
    pub fn queue(&self, tree: &FileTree, today: Weekday, session: Option<&str>) -> Queue {
        let items = items(tree, &self.metadata);
        let cursor = Cursor {
            session,
            last_opened: self.last_opened.as_deref(),
        };
        build_queue(
            &items,
            &self.completion,
            &self.schedule,
            &self.metadata,
            today,
            cursor,
        )
    }

    /// Create metadata for newly scanned documents, one week and subject
    /// group at a time. Returns whether anything changed.
    pub fn register(&mut self, tree: &FileTree) -> bool {
        let mut created = 0;
        for subjects in tree.values() {
            for files in subjects.values() {
                created += self
                    .metadata
                    .register(files.iter().map(|f| (f.path.as_str(), f.name.as_str())));
            }
        }
        created > 0
    }
}

/// A rejected write: the client's copy was older than the stored one.
#[derive(Debug, PartialEq)]
pub struct StaleWrite {
    pub expected: u64,
    pub current: u64,
}

/// The on-disk state blob. This is the only writer of the file.
pub struct StateFile {
    path: PathBuf,
    state: AppState,
}

impl StateFile {
    pub fn open(path: PathBuf) -> Fallible<Self> {
        let state = if path.exists() {
            log::debug!("Loading state from {}", path.display());
            let content = read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            log::debug!("Using empty state.");
            AppState::default()
        };
        Ok(Self { path, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replace the state with a client's copy. The copy must carry the
    /// version it was based on.
    pub fn replace(&mut self, mut next: AppState) -> Fallible<Result<u64, StaleWrite>> {
        if next.version != self.state.version {
            return Ok(Err(StaleWrite {
                expected: next.version,
                current: self.state.version,
            }));
        }
        next.version = self.state.version + 1;
        self.persist(&next)?;
        self.state = next;
        Ok(Ok(self.state.version))
    }

    /// Apply a change in place and persist it. Nothing is written if `f`
    /// reports no change.
    pub fn update<T>(&mut self, f: impl FnOnce(&mut AppState) -> (bool, T)) -> Fallible<T> {
        let mut next = self.state.clone();
        let (changed, result) = f(&mut next);
        if changed {
            next.version = self.state.version + 1;
            self.persist(&next)?;
            self.state = next;
        }
        Ok(result)
    }

    fn persist(&self, state: &AppState) -> Fallible<()> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        write(&tmp, json)?;
        rename(&tmp, &self.path)?;
        log::debug!("Saved state version {}.", state.version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::types::tag::Tag;

    #[test]
    fn test_open_missing_file() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let file = StateFile::open(dir.join("state.json"))?;
        assert_eq!(file.state(), &AppState::default());
        Ok(())
    }

    #[test]
    fn test_replace_bumps_version_and_persists() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("state.json");
        let mut file = StateFile::open(path.clone())?;
        let mut next = file.state().clone();
        next.completion.insert("1/A/a.pdf".to_string(), true);
        assert_eq!(file.replace(next)?, Ok(1));

        let reopened = StateFile::open(path)?;
        assert_eq!(reopened.state().version, 1);
        assert_eq!(reopened.state().completion.get("1/A/a.pdf"), Some(&true));
        Ok(())
    }

    #[test]
    fn test_stale_write_is_rejected() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let mut file = StateFile::open(dir.join("state.json"))?;
        let first = file.state().clone();
        let second = file.state().clone();
        assert_eq!(file.replace(first)?, Ok(1));
        assert_eq!(
            file.replace(second)?,
            Err(StaleWrite {
                expected: 0,
                current: 1
            })
        );
        assert_eq!(file.state().version, 1);
        Ok(())
    }

    #[test]
    fn test_update_without_change_does_not_write() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("state.json");
        let mut file = StateFile::open(path.clone())?;
        let n = file.update(|_| (false, 42))?;
        assert_eq!(n, 42);
        assert!(!path.exists());
        file.update(|s| {
            s.metadata.set_tag("1/A/a.pdf", Tag::Theory);
            (true, ())
        })?;
        assert!(path.exists());
        assert_eq!(file.state().version, 1);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_survive() -> Fallible<()> {
        let json = r#"{"version": 3, "theme": "dark", "schedule": {"theory": {"Algebra": 1}}}"#;
        let state: AppState = serde_json::from_str(json)?;
        assert_eq!(state.version, 3);
        assert_eq!(state.extra.get("theme"), Some(&Value::from("dark")));
        let back = serde_json::to_value(&state)?;
        assert_eq!(back["theme"], Value::from("dark"));
        assert_eq!(back["schedule"]["theory"]["Algebra"], Value::from(1));
        Ok(())
    }
}
