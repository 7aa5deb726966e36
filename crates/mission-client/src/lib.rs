//! Client library for Mission Control.
//!
//! Provides the HTTP client for the task and calendar endpoints, the board
//! controller that mirrors the task list and applies optimistic edits, and
//! the pollers that keep a board and the agent activity summary fresh.

pub mod api;
pub mod board;
pub mod error;
pub mod http;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

pub use api::TaskApi;
pub use board::{BoardController, DropOutcome, DropTarget, FailurePolicy};
pub use error::ClientError;
pub use http::HttpClient;
pub use poller::{
    spawn_activity, spawn_board, spawn_board_with, ActivityHandle, BoardCommand, BoardEvent,
    BoardHandle, BoardSnapshot, ACTIVITY_POLL_INTERVAL, BOARD_POLL_INTERVAL,
};
