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
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

use crate::error::ErrorReport;
use crate::loader::PdfLoaderError;
use crate::state::StaleWrite;

/// Errors returned to HTTP clients as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Stale(StaleWrite),
    Internal(ErrorReport),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        ApiError::Internal(value)
    }
}

impl From<PdfLoaderError> for ApiError {
    fn from(value: PdfLoaderError) -> Self {
        match value {
            PdfLoaderError::NotFound => ApiError::NotFound("no such file".to_string()),
            PdfLoaderError::Empty => ApiError::BadRequest("missing path".to_string()),
            PdfLoaderError::NotPdf => ApiError::BadRequest("not a PDF".to_string()),
            PdfLoaderError::Absolute
            | PdfLoaderError::ParentComponent
            | PdfLoaderError::SymbolicLink => ApiError::BadRequest("invalid path".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                log::debug!("Bad request: {message}");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Stale(StaleWrite { expected, current }) => {
                log::info!("Rejected stale write: based on version {expected}, current is {current}.");
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "state has changed since it was loaded",
                        "version": current,
                    })),
                )
                    .into_response()
            }
            ApiError::Internal(e) => {
                log::error!("{e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.message() })),
                )
                    .into_response()
            }
        }
    }
}
