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

use std::path::Component;
use std::path::PathBuf;

/// Resolves materials-relative paths sent by the client to files on disk.
///
/// The paths are untrusted, so anything that could leave the materials
/// directory is rejected.
#[derive(Clone)]
pub struct PdfLoader {
    /// Absolute path to the materials directory.
    root: PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum PdfLoaderError {
    Empty,
    Absolute,
    ParentComponent,
    NotPdf,
    NotFound,
    SymbolicLink,
}

impl PdfLoader {
    pub fn new(root: PathBuf) -> Self {
        assert!(root.is_absolute());
        Self { root }
    }

    pub fn validate(&self, path: &str) -> Result<PathBuf, PdfLoaderError> {
        if path.trim().is_empty() {
            return Err(PdfLoaderError::Empty);
        }
        let path: PathBuf = PathBuf::from(path);
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(PdfLoaderError::ParentComponent);
        }
        if path.is_absolute() {
            return Err(PdfLoaderError::Absolute);
        }
        if !path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            return Err(PdfLoaderError::NotPdf);
        }
        let path: PathBuf = self.root.join(path);
        if path.is_symlink() {
            return Err(PdfLoaderError::SymbolicLink);
        }
        if !path.is_file() {
            return Err(PdfLoaderError::NotFound);
        }
        Ok(path)
    }
}
