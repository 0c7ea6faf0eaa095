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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::error::ApiResult;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::loader::PdfLoader;
use crate::scan::FileTree;
use crate::scan::scan_materials;
use crate::state::StateFile;
use crate::storage::Storage;

#[derive(Clone)]
pub struct ServerState {
    pub materials: PathBuf,
    pub loader: PdfLoader,
    pub db: Database,
    pub storage: Arc<Storage>,
    pub state: Arc<Mutex<StateFile>>,
}

impl ServerState {
    pub fn acquire(&self) -> ApiResult<MutexGuard<'_, StateFile>> {
        self.state
            .lock()
            .map_err(|_| ApiError::Internal(ErrorReport::new("state lock poisoned")))
    }

    /// Scan the materials directory, creating metadata for any new
    /// documents.
    pub fn scan(&self) -> ApiResult<FileTree> {
        let tree = scan_materials(&self.materials)?;
        let mut file = self.acquire()?;
        file.update(|state| (state.register(&tree), ()))?;
        Ok(tree)
    }
}
