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

use serde::Serialize;

use crate::types::tag::Tag;

/// One study document.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Path relative to the materials root, with `/` separators. This is the
    /// item's identity.
    pub path: String,
    /// The file name without the extension.
    pub name: String,
    pub week: u32,
    pub subject: String,
    /// The cached page count, if the client has reported one.
    pub pages: Option<u32>,
    pub tag: Tag,
}

impl Item {
    /// Items in the same group can be reordered relative to each other.
    pub fn same_group(&self, other: &Item) -> bool {
        self.week == other.week && self.subject == other.subject
    }
}
