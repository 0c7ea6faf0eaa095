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
use clap::Parser;

use crate::cmd::check::check_collection;
use crate::cmd::queue::Step;
use crate::cmd::queue::print_queue;
use crate::cmd::serve::server::ServeOptions;
use crate::cmd::serve::server::start_server;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the web interface.
    Serve {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
        /// The host address to bind to. Overrides `studytrack.toml`.
        #[arg(long)]
        host: Option<String>,
        /// The port to use. Overrides `studytrack.toml`.
        #[arg(long)]
        port: Option<u16>,
        /// Open the overview page in a browser.
        #[arg(long)]
        open: bool,
    },
    /// Print the reading queue as JSON.
    Queue {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
        /// The day of the week, 0 (Sunday) to 6. Defaults to today.
        #[arg(long)]
        today: Option<u8>,
        /// Make this document current.
        #[arg(long)]
        current: Option<String>,
        /// Step forward from the current document.
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        /// Step back from the current document.
        #[arg(long)]
        prev: bool,
    },
    /// Check that the data directory can be loaded.
    Check {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            directory,
            host,
            port,
            open,
        } => {
            let options = ServeOptions {
                host,
                port,
                open_browser: open,
            };
            start_server(directory, options).await
        }
        Command::Queue {
            directory,
            today,
            current,
            next,
            prev,
        } => {
            let step = match (next, prev) {
                (true, _) => Step::Next,
                (_, true) => Step::Prev,
                _ => Step::Stay,
            };
            print_queue(directory, today, current, step)
        }
        Command::Check { directory } => check_collection(directory),
    }
}
