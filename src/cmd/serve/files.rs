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

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::fs::read;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::error::ApiResult;
use crate::cmd::serve::state::ServerState;
use crate::error::ErrorReport;
use crate::scan::FileTree;
use crate::scan::with_cached_pages;

pub async fn files_handler(State(state): State<ServerState>) -> ApiResult<Json<FileTree>> {
    let tree = state.scan()?;
    let file = state.acquire()?;
    Ok(Json(with_cached_pages(tree, &file.state().metadata)))
}

#[derive(Deserialize)]
pub struct PdfQuery {
    path: String,
}

pub async fn pdf_handler(
    State(state): State<ServerState>,
    Query(query): Query<PdfQuery>,
) -> ApiResult<(StatusCode, [(HeaderName, &'static str); 1], Vec<u8>)> {
    let path = state.loader.validate(&query.path)?;
    let bytes = read(&path).await.map_err(|e| {
        ApiError::Internal(ErrorReport::new(format!(
            "failed to read {}: {e}",
            path.display()
        )))
    })?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, "application/pdf")], bytes))
}
