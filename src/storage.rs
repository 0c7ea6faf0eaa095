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
use std::fs::create_dir_all;
use std::fs::read_to_string;
use std::fs::write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;

const VIDEOS: &str = "videos.json";
const LAST_FOLDER: &str = "last-folder.json";
const NOTES: &str = "notes.json";

/// Small JSON documents kept as individual files.
pub struct Storage {
    dir: PathBuf,
    /// Held across read-modify-write of the notes file.
    notes_lock: Mutex<()>,
}

impl Storage {
    pub fn new(dir: PathBuf) -> Fallible<Self> {
        create_dir_all(&dir)?;
        Ok(Self {
            dir,
            notes_lock: Mutex::new(()),
        })
    }

    /// The saved video list. Its shape is up to the client.
    pub fn videos(&self) -> Fallible<Value> {
        Ok(self.read(VIDEOS)?.unwrap_or_else(|| Value::Array(Vec::new())))
    }

    pub fn set_videos(&self, videos: &Value) -> Fallible<()> {
        self.write(VIDEOS, videos)
    }

    pub fn last_folder(&self) -> Fallible<Option<String>> {
        self.read(LAST_FOLDER)
    }

    pub fn set_last_folder(&self, path: &str) -> Fallible<()> {
        self.write(LAST_FOLDER, &path)
    }

    pub fn notes(&self) -> Fallible<BTreeMap<String, String>> {
        Ok(self.read(NOTES)?.unwrap_or_default())
    }

    pub fn note(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.notes()?.remove(key))
    }

    /// Save a note. An empty note is deleted.
    pub fn set_note(&self, key: &str, text: &str) -> Fallible<()> {
        let _guard = self
            .notes_lock
            .lock()
            .map_err(|_| ErrorReport::new("notes lock poisoned"))?;
        let mut notes = self.notes()?;
        if text.trim().is_empty() {
            notes.remove(key);
        } else {
            notes.insert(key.to_string(), text.to_string());
        }
        self.write(NOTES, &notes)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Fallible<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Fallible<()> {
        let json = serde_json::to_string_pretty(value)?;
        write(self.dir.join(name), json)?;
        Ok(())
    }
}
