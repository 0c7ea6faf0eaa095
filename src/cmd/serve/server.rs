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
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal;
use tokio::time::sleep;

use crate::cmd::serve::files::files_handler;
use crate::cmd::serve::files::pdf_handler;
use crate::cmd::serve::queue::classify_handler;
use crate::cmd::serve::queue::complete_handler;
use crate::cmd::serve::queue::get_config_handler;
use crate::cmd::serve::queue::open_handler;
use crate::cmd::serve::queue::page_handler;
use crate::cmd::serve::queue::post_config_handler;
use crate::cmd::serve::queue::queue_handler;
use crate::cmd::serve::queue::reorder_handler;
use crate::cmd::serve::queue::schedule_handler;
use crate::cmd::serve::records::get_progress_handler;
use crate::cmd::serve::records::get_time_handler;
use crate::cmd::serve::records::mark_handler;
use crate::cmd::serve::records::post_time_handler;
use crate::cmd::serve::records::set_progress_handler;
use crate::cmd::serve::records::sync_totals_handler;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::storage::get_last_folder_handler;
use crate::cmd::serve::storage::get_note_handler;
use crate::cmd::serve::storage::get_videos_handler;
use crate::cmd::serve::storage::notes_handler;
use crate::cmd::serve::storage::post_last_folder_handler;
use crate::cmd::serve::storage::post_note_handler;
use crate::cmd::serve::storage::post_videos_handler;
use crate::cmd::serve::view::overview_handler;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::loader::PdfLoader;

/// Command-line overrides for the settings file.
#[derive(Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub open_browser: bool,
}

pub async fn start_server(directory: Option<String>, options: ServeOptions) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let host = options.host.unwrap_or(coll.settings.host.clone());
    let port = options.port.unwrap_or(coll.settings.port);
    let open_browser = options.open_browser || coll.settings.open_browser;

    let state = ServerState {
        loader: PdfLoader::new(coll.materials.clone()),
        materials: coll.materials,
        db: coll.db,
        storage: Arc::new(coll.storage),
        state: Arc::new(Mutex::new(coll.state)),
    };
    let app = router(state);
    let bind = format!("{host}:{port}");

    if open_browser {
        // Start a separate task to open the browser.
        let url = format!("http://{bind}/");
        let target = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&target).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    // Start the server.
    log::info!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::debug!("Server stopped.");
    Ok(())
}

fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(overview_handler));
    let app = app.route("/files", get(files_handler));
    let app = app.route("/pdf", get(pdf_handler));
    let app = app.route("/config", get(get_config_handler).post(post_config_handler));
    let app = app.route("/queue", get(queue_handler));
    let app = app.route("/queue/open", post(open_handler));
    let app = app.route("/complete", post(complete_handler));
    let app = app.route("/reorder", post(reorder_handler));
    let app = app.route("/classify", post(classify_handler));
    let app = app.route("/page", post(page_handler));
    let app = app.route("/schedule", get(schedule_handler));
    let app = app.route("/progress", get(get_progress_handler).post(set_progress_handler));
    let app = app.route("/progress/mark", post(mark_handler));
    let app = app.route("/progress/sync-totals", post(sync_totals_handler));
    let app = app.route("/time", get(get_time_handler).post(post_time_handler));
    let app = app.route("/videos", get(get_videos_handler).post(post_videos_handler));
    let app = app.route(
        "/last-folder",
        get(get_last_folder_handler).post(post_last_folder_handler),
    );
    let app = app.route("/note", get(get_note_handler).post(post_note_handler));
    let app = app.route("/notes", get(notes_handler));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down.");
}

