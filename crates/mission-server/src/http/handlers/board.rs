//! Read-only HTML board page.

use std::fmt::Write;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
};

use mission_core::{now_ms, Assignee, AssigneeFilter, Task, TaskStatus};

use crate::http::responses::{ApiError, BoardQuery};
use crate::state::AppState;

/// Board page reload period, matching the client poll interval.
const REFRESH_SECS: u32 = 3;

/// Render the board as an HTML page.
///
/// GET /ui/tasks?assignee=all|human|agent
pub async fn board_html(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BoardQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let tasks = state.tasks.list().await?;
    let html = render_board(&tasks, query.assignee, now_ms());
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

fn render_board(tasks: &[Task], filter: AssigneeFilter, now: i64) -> String {
    let mut columns = String::new();
    for status in TaskStatus::ALL {
        let cards: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == status && filter.matches(t))
            .collect();

        let mut body = String::new();
        for task in &cards {
            body.push_str(&render_card(task, now));
        }
        if cards.is_empty() {
            body.push_str(r#"<p class="empty">Nothing here</p>"#);
        }

        write!(
            columns,
            r#"<section class="column"><h2>{} <small>{}</small></h2>{}</section>"#,
            status.label(),
            cards.len(),
            body
        )
        .ok();
    }

    let filters: Vec<String> = [AssigneeFilter::All, AssigneeFilter::Human, AssigneeFilter::Agent]
        .iter()
        .map(|f| {
            let class = if *f == filter { "active" } else { "" };
            format!(r#"<a class="{class}" href="/ui/tasks?assignee={f}">{f}</a>"#)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mission Control Tasks</title>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="{refresh}">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .board {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; }}
        .column {{ background: white; padding: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
        .card {{ border: 1px solid #eee; padding: 10px; margin-bottom: 8px; }}
        .card.review {{ border-color: #8b5cf6; }}
        .notes {{ background: #fee2e2; color: #991b1b; font-size: 12px; padding: 4px; margin-top: 6px; }}
        .empty, small {{ color: #888; }}
        .filters a {{ margin-right: 12px; color: #0066cc; text-decoration: none; }}
        .filters a.active {{ font-weight: bold; text-decoration: underline; }}
    </style>
</head>
<body>
    <h1>Task Board - {total} tasks</h1>
    <p class="filters">Filter: {filters}</p>
    <div class="board">{columns}</div>
    <p style="margin-top:20px;color:#888;font-size:12px;">
        JSON API: <a href="/tasks">/tasks</a> | <a href="/calendar">/calendar</a>
    </p>
</body>
</html>"#,
        refresh = REFRESH_SECS,
        total = tasks.len(),
        filters = filters.join(""),
        columns = columns,
    )
}

fn render_card(task: &Task, now: i64) -> String {
    let mut card = format!(
        r#"<div class="card{}"><strong>{}</strong>"#,
        if task.awaiting_review() { " review" } else { "" },
        escape_html(&task.title)
    );
    if let Some(description) = &task.description {
        write!(card, "<p>{}</p>", escape_html(description)).ok();
    }
    if let Some(notes) = &task.review_notes {
        write!(card, r#"<div class="notes">Review: {}</div>"#, escape_html(notes)).ok();
    }
    let owner = match task.assignee {
        Assignee::Human => "Human",
        Assignee::Agent => "Agent",
    };
    write!(
        card,
        "<small>{} | updated {}</small></div>",
        owner,
        format_relative_time(now, task.updated_at)
    )
    .ok();
    card
}

/// Format an age in epoch milliseconds as a human-readable relative time.
fn format_relative_time(now: i64, then: i64) -> String {
    let secs = (now - then).max(0) / 1000;
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
