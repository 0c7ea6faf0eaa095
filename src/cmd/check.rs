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

/// Open the data directory, scan the materials, and report the result.
pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let documents: usize = coll
        .tree
        .values()
        .flat_map(|subjects| subjects.values())
        .map(|files| files.len())
        .sum();
    log::debug!(
        "Found {documents} documents in {} weeks under {}.",
        coll.tree.len(),
        coll.directory.display()
    );
    println!("ok");
    Ok(())
}
