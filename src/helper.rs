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

use std::fs::create_dir_all;
use std::fs::write;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::error::Fallible;

/// Create a temporary directory that outlives the handle.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir: PathBuf = tempdir()?.keep();
    Ok(dir.canonicalize()?)
}

/// Create a data directory with a small materials tree:
///
/// - Week 1: Algebra (`a1`, `a2`), Physics (`p1`)
/// - Week 2: Algebra (`a3`)
pub fn create_tmp_data_directory() -> Fallible<PathBuf> {
    let dir = create_tmp_directory()?;
    let files = [
        "materials/Week 1/Algebra/a1.pdf",
        "materials/Week 1/Algebra/a2.pdf",
        "materials/Week 1/Physics/p1.pdf",
        "materials/Week 2/Algebra/a3.pdf",
    ];
    for file in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        write(&path, b"%PDF-1.4\n%%EOF\n")?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tmp_data_directory() -> Fallible<()> {
        let dir = create_tmp_data_directory()?;
        assert!(dir.join("materials/Week 2/Algebra/a3.pdf").is_file());
        Ok(())
    }
}
