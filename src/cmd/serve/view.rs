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

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;

use crate::cmd::serve::error::ApiResult;
use crate::cmd::serve::queue::QueueQuery;
use crate::cmd::serve::queue::parse_today;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::template::page_template;
use crate::deadline::Day;
use crate::markdown::markdown_to_html;
use crate::queue::QueueEntry;
use crate::types::weekday::Weekday;

pub async fn overview_handler(
    State(state): State<ServerState>,
    Query(query): Query<QueueQuery>,
) -> ApiResult<(StatusCode, Html<String>)> {
    let today = parse_today(query.today)?;
    let tree = state.scan()?;
    let (queue, days) = {
        let file = state.acquire()?;
        let app = file.state();
        (
            app.queue(&tree, today, query.current.as_deref()),
            app.schedule.by_day(),
        )
    };
    let notes = state.storage.notes()?;

    let current = match queue.current() {
        Some(entry) => render_current(entry, queue.prev(), queue.next()),
        None => html! {
            div.finished {
                h1 { "Nothing left to read" }
            }
        },
    };
    let body = html! {
        div.root {
            div.header {
                h1 { "Today is " (today.name()) }
                div.progress {
                    (format!("{} left of {}", queue.len(), queue.total()))
                }
            }
            (current)
            h2 { "Schedule" }
            table.schedule {
                tbody {
                    @for day in Weekday::SCHOOL_DAYS {
                        (render_day(day, days.get(&day)))
                    }
                }
            }
            @if !notes.is_empty() {
                h2 { "Notes" }
                @for (key, text) in &notes {
                    div.note {
                        h3 { (key) }
                        div.rich-text {
                            (PreEscaped(markdown_to_html(text)))
                        }
                    }
                }
            }
        }
    };
    let html = page_template(body);
    Ok((StatusCode::OK, Html(html.into_string())))
}

fn render_current(
    entry: &QueueEntry,
    prev: Option<&QueueEntry>,
    next: Option<&QueueEntry>,
) -> Markup {
    let item = &entry.item;
    html! {
        div.current {
            h2 {
                a href=(pdf_link(&item.path)) { (item.name) }
            }
            div.meta {
                (item.subject) " · week " (item.week) " · due in " (entry.urgency) " days"
            }
            div.controls {
                @if let Some(prev) = prev {
                    a #prev href=(overview_link(&prev.item.path)) { "Previous" }
                }
                @if let Some(next) = next {
                    a #next href=(overview_link(&next.item.path)) { "Next" }
                }
            }
        }
    }
}

fn render_day(day: Weekday, subjects: Option<&Day>) -> Markup {
    html! {
        tr {
            td.key { (day.name()) }
            td.theory {
                @if let Some(subjects) = subjects {
                    (subjects.theory.join(", "))
                }
            }
            td.practice {
                @if let Some(subjects) = subjects {
                    (subjects.practice.join(", "))
                }
            }
        }
    }
}

fn pdf_link(path: &str) -> String {
    format!("/pdf?path={}", utf8_percent_encode(path, NON_ALPHANUMERIC))
}

fn overview_link(path: &str) -> String {
    format!("/?current={}", utf8_percent_encode(path, NON_ALPHANUMERIC))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_encoded() {
        assert_eq!(
            pdf_link("Week 1/Algebra/a&b.pdf"),
            "/pdf?path=Week%201%2FAlgebra%2Fa%26b%2Epdf"
        );
        assert_eq!(overview_link("x.pdf"), "/?current=x%2Epdf");
    }
}
