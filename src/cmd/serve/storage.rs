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
use serde::Serialize;
use serde_json::Value;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::error::ApiResult;
use crate::cmd::serve::state::ServerState;

pub async fn get_videos_handler(State(state): State<ServerState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.storage.videos()?))
}

pub async fn post_videos_handler(
    State(state): State<ServerState>,
    Json(videos): Json<Value>,
) -> ApiResult<Json<Value>> {
    state.storage.set_videos(&videos)?;
    Ok(Json(videos))
}

#[derive(Serialize, Deserialize)]
pub struct LastFolder {
    path: Option<String>,
}

pub async fn get_last_folder_handler(
    State(state): State<ServerState>,
) -> ApiResult<Json<LastFolder>> {
    Ok(Json(LastFolder {
        path: state.storage.last_folder()?,
    }))
}

pub async fn post_last_folder_handler(
    State(state): State<ServerState>,
    Json(req): Json<LastFolder>,
) -> ApiResult<Json<LastFolder>> {
    let Some(path) = req.path.as_deref() else {
        return Err(ApiError::BadRequest("missing path".to_string()));
    };
    state.storage.set_last_folder(path)?;
    Ok(Json(req))
}

#[derive(Deserialize)]
pub struct NoteQuery {
    key: String,
}

#[derive(Serialize, Deserialize)]
pub struct Note {
    key: String,
    text: String,
}

pub async fn get_note_handler(
    State(state): State<ServerState>,
    Query(query): Query<NoteQuery>,
) -> ApiResult<Json<Note>> {
    let text = state.storage.note(&query.key)?.unwrap_or_default();
    Ok(Json(Note {
        key: query.key,
        text,
    }))
}

pub async fn post_note_handler(
    State(state): State<ServerState>,
    Json(note): Json<Note>,
) -> ApiResult<Json<Note>> {
    if note.key.trim().is_empty() {
        return Err(ApiError::BadRequest("missing key".to_string()));
    }
    state.storage.set_note(&note.key, &note.text)?;
    Ok(Json(note))
}

pub async fn notes_handler(
    State(state): State<ServerState>,
) -> ApiResult<Json<BTreeMap<String, String>>> {
    Ok(Json(state.storage.notes()?))
}
