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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// Whether a document belongs to the theory or practice half of a subject.
/// Progress counters are kept per (subject, tag).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Theory,
    Practice,
    #[default]
    Unset,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Theory => "theory",
            Tag::Practice => "practice",
            Tag::Unset => "unset",
        }
    }
}

impl TryFrom<String> for Tag {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "theory" => Ok(Tag::Theory),
            "practice" => Ok(Tag::Practice),
            "unset" => Ok(Tag::Unset),
            _ => fail(format!("Invalid tag: {}", value)),
        }
    }
}

impl ToSql for Tag {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Tag {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Tag::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
