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

use std::env::current_dir;
use std::path::PathBuf;

use crate::config::Settings;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scan::FileTree;
use crate::scan::scan_materials;
use crate::state::StateFile;
use crate::storage::Storage;

/// A data directory, opened.
pub struct Collection {
    pub directory: PathBuf,
    pub settings: Settings,
    pub materials: PathBuf,
    pub db: Database,
    pub storage: Storage,
    pub state: StateFile,
    pub tree: FileTree,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let settings = Settings::load(&directory)?;
        let materials = settings.materials_dir(&directory);
        let materials = if materials.is_dir() {
            materials.canonicalize()?
        } else {
            return fail(format!(
                "materials directory does not exist: {}",
                materials.display()
            ));
        };

        let db_path: PathBuf = directory.join("studytrack.db");
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let storage = Storage::new(directory.join("storage"))?;

        let mut state = StateFile::open(directory.join("state.json"))?;
        let tree = scan_materials(&materials)?;
        state.update(|s| (s.register(&tree), ()))?;
        log::debug!(
            "Tracking {} documents in {}.",
            state.state().metadata.len(),
            materials.display()
        );

        Ok(Self {
            directory,
            settings,
            materials,
            db,
            storage,
            state,
            tree,
        })
    }
}
