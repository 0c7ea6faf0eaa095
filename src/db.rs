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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::tag::Tag;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Reading progress for one half of a subject.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    pub subject: String,
    pub category: Tag,
    pub done: i64,
    pub total: i64,
    pub updated_at: Timestamp,
}

/// Minutes studied on one day.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRow {
    pub date: Date,
    pub weekday: u8,
    pub minutes: i64,
}

const PROGRESS_COLUMNS: &str = "subject, category, done, total, updated_at";

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Add `delta` to the number of documents read, never going below zero.
    pub fn mark(&self, subject: &str, category: Tag, delta: i64) -> Fallible<ProgressRow> {
        let conn = self.acquire()?;
        let sql = format!(
            "insert into progress ({PROGRESS_COLUMNS}) values (?1, ?2, max(0, ?3), 0, ?4) on conflict (subject, category) do update set done = max(0, done + ?3), updated_at = ?4 returning {PROGRESS_COLUMNS};"
        );
        let row = conn.query_row(
            &sql,
            (subject, category, delta, Timestamp::now()),
            progress_row,
        )?;
        Ok(row)
    }

    /// Overwrite both counters.
    pub fn set_progress(
        &self,
        subject: &str,
        category: Tag,
        done: i64,
        total: i64,
    ) -> Fallible<ProgressRow> {
        let conn = self.acquire()?;
        let sql = format!(
            "insert into progress ({PROGRESS_COLUMNS}) values (?1, ?2, ?3, ?4, ?5) on conflict (subject, category) do update set done = ?3, total = ?4, updated_at = ?5 returning {PROGRESS_COLUMNS};"
        );
        let row = conn.query_row(
            &sql,
            (subject, category, done, total, Timestamp::now()),
            progress_row,
        )?;
        Ok(row)
    }

    /// Set the totals from a fresh count of the materials. Counters for
    /// documents already read are kept.
    pub fn sync_totals(&self, totals: &[(String, Tag, i64)]) -> Fallible<Vec<ProgressRow>> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        {
            let sql = format!(
                "insert into progress ({PROGRESS_COLUMNS}) values (?1, ?2, 0, ?3, ?4) on conflict (subject, category) do update set total = ?3, updated_at = ?4;"
            );
            let mut stmt = tx.prepare(&sql)?;
            let now = Timestamp::now();
            for (subject, category, total) in totals {
                stmt.execute((subject, category, total, now))?;
            }
        }
        tx.commit()?;
        drop(conn);
        self.all_progress()
    }

    pub fn all_progress(&self) -> Fallible<Vec<ProgressRow>> {
        let conn = self.acquire()?;
        let sql = format!("select {PROGRESS_COLUMNS} from progress order by subject, category;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(progress_row(row)?);
        }
        Ok(result)
    }

    /// Record the total minutes studied on a day, replacing any earlier
    /// figure.
    pub fn record_time(&self, date: Date, minutes: i64) -> Fallible<TimeRow> {
        let conn = self.acquire()?;
        let weekday = date.weekday().number();
        let sql = "insert into time_log (date, weekday, minutes) values (?1, ?2, ?3) on conflict (date) do update set weekday = ?2, minutes = ?3;";
        conn.execute(sql, (date, weekday, minutes))?;
        Ok(TimeRow {
            date,
            weekday,
            minutes,
        })
    }

    pub fn time_log(&self) -> Fallible<Vec<TimeRow>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare("select date, weekday, minutes from time_log order by date;")?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(TimeRow {
                date: row.get(0)?,
                weekday: row.get(1)?,
                minutes: row.get(2)?,
            });
        }
        Ok(result)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("database lock poisoned"))
    }
}

fn progress_row(row: &Row<'_>) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        subject: row.get(0)?,
        category: row.get(1)?,
        done: row.get(2)?,
        total: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["progress"], |row| row.get(0))?;
    Ok(count > 0)
}
