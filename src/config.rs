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
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;

pub const CONFIG_FILE: &str = "studytrack.toml";

/// Settings read from `studytrack.toml` in the data directory. Every key is
/// optional.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The materials directory, relative to the data directory unless
    /// absolute.
    pub materials: PathBuf,
    pub host: String,
    pub port: u16,
    /// Open the overview page in a browser once the server is up.
    pub open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            materials: PathBuf::from("materials"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            open_browser: false,
        }
    }
}

impl Settings {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE}, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        let settings: Settings = toml::from_str(&content)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn materials_dir(&self, directory: &Path) -> PathBuf {
        directory.join(&self.materials)
    }
}
