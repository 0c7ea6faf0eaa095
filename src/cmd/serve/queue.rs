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
use axum::extract::Query;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::error::ApiResult;
use crate::cmd::serve::state::ServerState;
use crate::deadline::Day;
use crate::metadata::Direction;
use crate::metadata::MetaEntry;
use crate::queue::QueueView;
use crate::scan::FileTree;
use crate::scan::discovery_order;
use crate::scan::items;
use crate::state::AppState;
use crate::types::tag::Tag;
use crate::types::weekday::Weekday;

#[derive(Deserialize)]
pub struct QueueQuery {
    pub today: Option<u8>,
    pub current: Option<String>,
}

pub async fn queue_handler(
    State(state): State<ServerState>,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Json<QueueView>> {
    let today = parse_today(query.today)?;
    let tree = state.scan()?;
    queue_view(&state, &tree, today, query.current.as_deref())
}

#[derive(Deserialize)]
pub struct OpenRequest {
    path: String,
    today: Option<u8>,
}

/// Record that a document was opened, and make it current.
pub async fn open_handler(
    State(state): State<ServerState>,
    Json(req): Json<OpenRequest>,
) -> ApiResult<Json<QueueView>> {
    let today = parse_today(req.today)?;
    let tree = state.scan()?;
    require_item(&tree, &req.path)?;
    state.acquire()?.update(|s| {
        let changed = s.last_opened.as_deref() != Some(req.path.as_str());
        s.last_opened = Some(req.path.clone());
        (changed, ())
    })?;
    queue_view(&state, &tree, today, Some(&req.path))
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    path: String,
    done: bool,
    current: Option<String>,
    today: Option<u8>,
}

pub async fn complete_handler(
    State(state): State<ServerState>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<Json<QueueView>> {
    let today = parse_today(req.today)?;
    let tree = state.scan()?;
    require_item(&tree, &req.path)?;
    state.acquire()?.update(|s| {
        let previous = s.completion.insert(req.path.clone(), req.done);
        (previous != Some(req.done), ())
    })?;
    log::debug!("{} marked done={}", req.path, req.done);
    queue_view(&state, &tree, today, req.current.as_deref())
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    path: String,
    direction: Direction,
    current: Option<String>,
    today: Option<u8>,
}

/// Move a document up or down among the documents of the same week and
/// subject. Finished documents are part of the group, so a move past a
/// finished neighbour does not change the visible queue.
pub async fn reorder_handler(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<QueueView>> {
    let today = parse_today(req.today)?;
    let tree = state.scan()?;
    state.acquire()?.update(|s| {
        let items = items(&tree, &s.metadata);
        let Some(target) = items.iter().find(|i| i.path == req.path) else {
            return (false, Err(ApiError::NotFound(format!("no such document: {}", req.path))));
        };
        let group: Vec<&str> = items
            .iter()
            .filter(|i| i.same_group(target))
            .map(|i| i.path.as_str())
            .collect();
        let moved = s.metadata.swap(&group, &req.path, req.direction);
        (moved, Ok(()))
    })??;
    queue_view(&state, &tree, today, req.current.as_deref())
}

#[derive(Deserialize)]
pub struct ClassifyRequest {
    path: String,
    tag: Tag,
}

pub async fn classify_handler(
    State(state): State<ServerState>,
    Json(req): Json<ClassifyRequest>,
) -> ApiResult<Json<MetaEntry>> {
    let tree = state.scan()?;
    require_item(&tree, &req.path)?;
    let entry = state.acquire()?.update(|s| {
        let changed = s.metadata.get(&req.path).tag != req.tag;
        s.metadata.set_tag(&req.path, req.tag);
        (changed, s.metadata.get(&req.path))
    })?;
    Ok(Json(entry))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    path: String,
    /// The page the reader is on.
    page: Option<u32>,
    /// The document's page count, as measured by the client.
    pages: Option<u32>,
}

pub async fn page_handler(
    State(state): State<ServerState>,
    Json(req): Json<PageRequest>,
) -> ApiResult<Json<MetaEntry>> {
    let tree = state.scan()?;
    require_item(&tree, &req.path)?;
    let entry = state.acquire()?.update(|s| {
        let before = s.metadata.get(&req.path);
        if let Some(page) = req.page {
            s.metadata.set_last_page(&req.path, page);
        }
        if let Some(pages) = req.pages {
            s.metadata.set_pages(&req.path, pages);
        }
        let after = s.metadata.get(&req.path);
        (before != after, after)
    })?;
    Ok(Json(entry))
}

pub async fn schedule_handler(
    State(state): State<ServerState>,
) -> ApiResult<Json<BTreeMap<Weekday, Day>>> {
    let file = state.acquire()?;
    Ok(Json(file.state().schedule.by_day()))
}

pub async fn get_config_handler(State(state): State<ServerState>) -> ApiResult<Json<AppState>> {
    let file = state.acquire()?;
    Ok(Json(file.state().clone()))
}

/// Replace the whole state. The body must carry the version it was loaded
/// at; older versions are rejected.
pub async fn post_config_handler(
    State(state): State<ServerState>,
    Json(next): Json<AppState>,
) -> ApiResult<Json<Value>> {
    let mut file = state.acquire()?;
    match file.replace(next)? {
        Ok(version) => Ok(Json(json!({ "version": version }))),
        Err(stale) => Err(ApiError::Stale(stale)),
    }
}

fn queue_view(
    state: &ServerState,
    tree: &FileTree,
    today: Weekday,
    session: Option<&str>,
) -> ApiResult<Json<QueueView>> {
    let file = state.acquire()?;
    let queue = file.state().queue(tree, today, session);
    Ok(Json(queue.view()))
}

pub fn parse_today(today: Option<u8>) -> ApiResult<Weekday> {
    match today {
        Some(n) => Weekday::try_from(n).map_err(|e| ApiError::BadRequest(e.message().to_string())),
        None => Ok(Weekday::today()),
    }
}

fn require_item(tree: &FileTree, path: &str) -> ApiResult<()> {
    if discovery_order(tree).any(|p| p == path) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("no such document: {path}")))
    }
}
