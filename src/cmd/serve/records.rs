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

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::error::ApiResult;
use crate::cmd::serve::state::ServerState;
use crate::db::ProgressRow;
use crate::db::TimeRow;
use crate::scan::items;
use crate::types::date::Date;
use crate::types::tag::Tag;
use crate::types::timestamp::Timestamp;

pub async fn get_progress_handler(
    State(state): State<ServerState>,
) -> ApiResult<Json<Vec<ProgressRow>>> {
    Ok(Json(state.db.all_progress()?))
}

/// The largest change a single mark may make.
pub const MAX_MARK_DELTA: i64 = 1_000_000;

fn default_delta() -> i64 {
    1
}

#[derive(Deserialize)]
pub struct MarkRequest {
    subject: String,
    category: Tag,
    /// Use -1 to undo a mark.
    #[serde(default = "default_delta")]
    delta: i64,
}

pub async fn mark_handler(
    State(state): State<ServerState>,
    Json(req): Json<MarkRequest>,
) -> ApiResult<Json<ProgressRow>> {
    require_subject(&req.subject)?;
    if req.delta.unsigned_abs() > MAX_MARK_DELTA as u64 {
        return Err(ApiError::BadRequest(format!(
            "delta must be between -{MAX_MARK_DELTA} and {MAX_MARK_DELTA}"
        )));
    }
    Ok(Json(state.db.mark(&req.subject, req.category, req.delta)?))
}

#[derive(Deserialize)]
pub struct SetProgressRequest {
    subject: String,
    category: Tag,
    done: i64,
    total: i64,
}

pub async fn set_progress_handler(
    State(state): State<ServerState>,
    Json(req): Json<SetProgressRequest>,
) -> ApiResult<Json<ProgressRow>> {
    require_subject(&req.subject)?;
    if req.done < 0 || req.total < 0 {
        return Err(ApiError::BadRequest(
            "counters must not be negative".to_string(),
        ));
    }
    Ok(Json(state.db.set_progress(
        &req.subject,
        req.category,
        req.done,
        req.total,
    )?))
}

/// Count the documents of each subject and category and store the counts as
/// totals.
pub async fn sync_totals_handler(
    State(state): State<ServerState>,
) -> ApiResult<Json<Vec<ProgressRow>>> {
    let tree = state.scan()?;
    let counts: BTreeMap<(String, Tag), i64> = {
        let file = state.acquire()?;
        let mut counts = BTreeMap::new();
        for item in items(&tree, &file.state().metadata) {
            *counts.entry((item.subject, item.tag)).or_insert(0) += 1;
        }
        counts
    };
    let totals: Vec<(String, Tag, i64)> = counts
        .into_iter()
        .map(|((subject, tag), total)| (subject, tag, total))
        .collect();
    log::debug!("Syncing {} progress totals.", totals.len());
    Ok(Json(state.db.sync_totals(&totals)?))
}

pub async fn get_time_handler(State(state): State<ServerState>) -> ApiResult<Json<Vec<TimeRow>>> {
    Ok(Json(state.db.time_log()?))
}

#[derive(Deserialize)]
pub struct TimeRequest {
    /// Defaults to the local date.
    date: Option<Date>,
    minutes: i64,
}

pub async fn post_time_handler(
    State(state): State<ServerState>,
    Json(req): Json<TimeRequest>,
) -> ApiResult<Json<TimeRow>> {
    if req.minutes < 0 {
        return Err(ApiError::BadRequest(
            "minutes must not be negative".to_string(),
        ));
    }
    let date = req.date.unwrap_or_else(|| Timestamp::now().local_date());
    Ok(Json(state.db.record_time(date, req.minutes)?))
}

fn require_subject(subject: &str) -> ApiResult<()> {
    if subject.trim().is_empty() {
        Err(ApiError::BadRequest("missing subject".to_string()))
    } else {
        Ok(())
    }
}
