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
use std::path::Component;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;
use crate::metadata::MetadataStore;
use crate::types::item::Item;

/// A PDF found on disk.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub name: String,
    pub pages: Option<u32>,
}

/// Week number → subject → files, in discovery order.
pub type FileTree = BTreeMap<u32, BTreeMap<String, Vec<FileEntry>>>;

/// Walk the materials directory and collect every PDF laid out as
/// `<week dir>/<subject dir>/**/*.pdf`.
pub fn scan_materials(root: &Path) -> Fallible<FileTree> {
    if !root.is_dir() {
        return fail(format!(
            "materials directory does not exist: {}",
            root.display()
        ));
    }
    log::debug!("Scanning materials in {}...", root.display());
    let start = Instant::now();
    let mut tree: FileTree = BTreeMap::new();
    let mut count = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_pdf(path) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let components: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        // Week directory, subject directory, and the file itself.
        if components.len() < 3 {
            log::debug!("Skipping {}: not inside a subject directory.", relative.display());
            continue;
        }
        let Some(week) = week_number(&components[0]) else {
            log::debug!("Skipping {}: no week number.", relative.display());
            continue;
        };
        let subject = components[1].clone();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tree.entry(week)
            .or_default()
            .entry(subject)
            .or_default()
            .push(FileEntry {
                path: components.join("/"),
                name,
                pages: None,
            });
        count += 1;
    }
    let duration = start.elapsed().as_millis();
    log::debug!("Found {count} PDFs in {duration}ms.");
    Ok(tree)
}

/// Fill in cached page counts from the metadata store.
pub fn with_cached_pages(mut tree: FileTree, metadata: &MetadataStore) -> FileTree {
    for subjects in tree.values_mut() {
        for files in subjects.values_mut() {
            for file in files.iter_mut() {
                file.pages = metadata.get(&file.path).pages;
            }
        }
    }
    tree
}

/// Paths in discovery order: by week, then subject, then position on disk.
pub fn discovery_order(tree: &FileTree) -> impl Iterator<Item = &str> {
    tree.values()
        .flat_map(|subjects| subjects.values())
        .flat_map(|files| files.iter())
        .map(|file| file.path.as_str())
}

/// Flatten the tree into items, attaching metadata.
pub fn items(tree: &FileTree, metadata: &MetadataStore) -> Vec<Item> {
    let mut items = Vec::new();
    for (week, subjects) in tree {
        for (subject, files) in subjects {
            for file in files {
                let entry = metadata.get(&file.path);
                items.push(Item {
                    path: file.path.clone(),
                    name: file.name.clone(),
                    week: *week,
                    subject: subject.clone(),
                    pages: entry.pages,
                    tag: entry.tag,
                });
            }
        }
    }
    items
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// The first run of digits in a directory name, e.g. `Week 03` → 3.
fn week_number(name: &str) -> Option<u32> {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
