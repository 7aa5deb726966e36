//! Background pollers for the board and the agent activity summary.
//!
//! Each poller runs in its own tokio task, refreshes on a fixed interval
//! and talks to its owner over channels. Ticks are fixed-rate and never
//! cancel a fetch already in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use mission_core::{
    AgentActivity, AssigneeFilter, NewTask, ReviewDraft, Task, TaskId, TaskPatch, TaskStatus,
};

use crate::api::TaskApi;
use crate::board::{BoardController, DropOutcome, DropTarget};
use crate::error::ClientError;

/// Board refresh period.
pub const BOARD_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Activity summary refresh period.
pub const ACTIVITY_POLL_INTERVAL: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 100;

/// Commands sent to a running board poller.
#[derive(Debug)]
pub enum BoardCommand {
    /// Refetch now instead of waiting for the next tick.
    Refresh,

    /// Change the view filter.
    SetFilter(AssigneeFilter),

    /// A drag was released.
    Drop {
        task_id: TaskId,
        target: Option<DropTarget>,
    },

    /// Create a task.
    Create(NewTask),

    /// Apply an edit to a task.
    Edit { id: TaskId, patch: TaskPatch },

    /// Move a task from backlog to in progress.
    Start(TaskId),

    /// Send a task to review.
    SubmitForReview(TaskId),

    /// Submit a review decision.
    Review(ReviewDraft),

    /// Delete a task.
    Delete(TaskId),

    /// Shut the poller down.
    Stop,
}

/// Events emitted by a board poller.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// The working copy changed.
    TasksUpdated(BoardSnapshot),

    /// A drop was handled.
    Dropped(DropOutcome),

    /// A fetch or a mutation failed.
    Error(String),
}

/// Copy of the controller's state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// All tasks in presentation order.
    pub tasks: Vec<Task>,
    pub filter: AssigneeFilter,
}

impl BoardSnapshot {
    fn of(board: &BoardController) -> Self {
        Self {
            tasks: board.tasks().to_vec(),
            filter: board.filter(),
        }
    }

    /// Filtered tasks of one status.
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status && self.filter.matches(t))
            .collect()
    }

    /// Tasks passing the filter.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }
}

/// Handle to a running board poller.
///
/// Dropping the handle closes the command channel, which ends the loop.
pub struct BoardHandle {
    cmd_tx: mpsc::Sender<BoardCommand>,
    join: JoinHandle<BoardController>,
}

impl BoardHandle {
    /// Queue a command.
    pub async fn send(&self, cmd: BoardCommand) -> Result<(), ClientError> {
        self.cmd_tx.send(cmd).await.map_err(|_| ClientError::Stopped)
    }

    /// Stop the loop and take back the controller.
    pub async fn stop(self) -> Result<BoardController, ClientError> {
        // The loop may already be gone; the join below still returns it.
        let _ = self.cmd_tx.send(BoardCommand::Stop).await;
        self.join.await.map_err(|_| ClientError::Stopped)
    }
}

/// Start polling the board every `period`.
///
/// The first refresh happens immediately.
pub fn spawn_board(
    api: Arc<dyn TaskApi>,
    period: Duration,
) -> (BoardHandle, mpsc::Receiver<BoardEvent>) {
    spawn_board_with(BoardController::new(api), period)
}

/// Start polling with an already configured controller.
pub fn spawn_board_with(
    board: BoardController,
    period: Duration,
) -> (BoardHandle, mpsc::Receiver<BoardEvent>) {
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let join = tokio::spawn(run_board(board, period, event_tx, cmd_rx));
    (BoardHandle { cmd_tx, join }, event_rx)
}

async fn run_board(
    mut board: BoardController,
    period: Duration,
    event_tx: mpsc::Sender<BoardEvent>,
    mut cmd_rx: mpsc::Receiver<BoardCommand>,
) -> BoardController {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let delivered = tokio::select! {
            _ = interval.tick() => {
                debug!("Board refresh tick");
                refresh(&mut board, &event_tx).await
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("Board handle dropped");
                    break;
                };
                match cmd {
                    BoardCommand::Stop => {
                        info!("Stopping board poller");
                        break;
                    }
                    BoardCommand::Refresh => refresh(&mut board, &event_tx).await,
                    BoardCommand::SetFilter(filter) => {
                        board.set_filter(filter);
                        publish(&board, &event_tx).await
                    }
                    BoardCommand::Drop { task_id, target } => {
                        let outcome = board.drop_task(&task_id, target).await;
                        event_tx.send(BoardEvent::Dropped(outcome)).await.is_ok()
                            && publish(&board, &event_tx).await
                    }
                    BoardCommand::Create(input) => {
                        let result = board.create_task(input).await.map(|_| ());
                        report(result, &board, &event_tx).await
                    }
                    BoardCommand::Edit { id, patch } => {
                        let result = board.edit_task(&id, patch).await.map(|_| ());
                        report(result, &board, &event_tx).await
                    }
                    BoardCommand::Start(id) => {
                        let result = board.start_task(&id).await.map(|_| ());
                        report(result, &board, &event_tx).await
                    }
                    BoardCommand::SubmitForReview(id) => {
                        let result = board.submit_for_review(&id).await.map(|_| ());
                        report(result, &board, &event_tx).await
                    }
                    BoardCommand::Review(draft) => {
                        let result = board.review(draft).await.map(|_| ());
                        report(result, &board, &event_tx).await
                    }
                    BoardCommand::Delete(id) => {
                        let result = board.delete_task(&id).await;
                        report(result, &board, &event_tx).await
                    }
                }
            }
        };

        if !delivered {
            debug!("Board event receiver dropped");
            break;
        }
    }

    info!("Board poller shutdown complete");
    board
}

/// Each helper returns false once nobody is listening for events.
async fn refresh(board: &mut BoardController, event_tx: &mpsc::Sender<BoardEvent>) -> bool {
    match board.refresh().await {
        Ok(()) => publish(board, event_tx).await,
        Err(e) => {
            warn!(error = %e, "Failed to fetch tasks");
            event_tx
                .send(BoardEvent::Error(format!("Tasks: {e}")))
                .await
                .is_ok()
        }
    }
}

async fn publish(board: &BoardController, event_tx: &mpsc::Sender<BoardEvent>) -> bool {
    event_tx
        .send(BoardEvent::TasksUpdated(BoardSnapshot::of(board)))
        .await
        .is_ok()
}

async fn report(
    result: Result<(), ClientError>,
    board: &BoardController,
    event_tx: &mpsc::Sender<BoardEvent>,
) -> bool {
    match result {
        Ok(()) => publish(board, event_tx).await,
        Err(e) => {
            warn!(error = %e, "Board action failed");
            event_tx.send(BoardEvent::Error(e.to_string())).await.is_ok()
        }
    }
}

/// Handle to a running activity poller. Dropping it stops the loop.
pub struct ActivityHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl ActivityHandle {
    /// Stop the loop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

/// Start publishing the agent activity summary every `period`.
pub fn spawn_activity(
    api: Arc<dyn TaskApi>,
    period: Duration,
) -> (ActivityHandle, mpsc::Receiver<AgentActivity>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (stop_tx, stop_rx) = oneshot::channel();
    let join = tokio::spawn(run_activity(api, period, tx, stop_rx));
    (ActivityHandle { stop_tx, join }, rx)
}

async fn run_activity(
    api: Arc<dyn TaskApi>,
    period: Duration,
    tx: mpsc::Sender<AgentActivity>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,

            _ = interval.tick() => {
                match api.list_tasks().await {
                    Ok(tasks) => {
                        let activity = AgentActivity::from_tasks(&tasks);
                        debug!(open = activity.open_count(), "Agent activity updated");
                        if tx.send(activity).await.is_err() {
                            break;
                        }
                    }
                    // The previous summary stays on screen.
                    Err(e) => warn!(error = %e, "Failed to fetch agent activity"),
                }
            }
        }
    }

    debug!("Activity poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::{Assignee, ReviewDecision};
    use tokio::time::timeout;

    use crate::testing::FakeApi;

    const FAST: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    fn task(title: &str, status: TaskStatus, assignee: Assignee) -> Task {
        Task::create(
            NewTask::new(title)
                .with_status(status)
                .with_assignee(assignee),
            1,
        )
        .unwrap()
    }

    async fn next_snapshot(rx: &mut mpsc::Receiver<BoardEvent>) -> BoardSnapshot {
        loop {
            match timeout(WAIT, rx.recv()).await.unwrap() {
                Some(BoardEvent::TasksUpdated(snapshot)) => return snapshot,
                Some(_) => continue,
                None => panic!("board poller ended"),
            }
        }
    }

    #[tokio::test]
    async fn test_board_poller_loads_immediately() {
        let api = Arc::new(FakeApi::with_tasks(vec![task(
            "a",
            TaskStatus::Backlog,
            Assignee::Human,
        )]));
        let (handle, mut rx) = spawn_board(api, Duration::from_secs(60));

        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.tasks.len(), 1);

        let board = handle.stop().await.unwrap();
        assert!(board.is_loaded());
    }

    #[tokio::test]
    async fn test_board_poller_keeps_polling() {
        let api = Arc::new(FakeApi::default());
        let (handle, mut rx) = spawn_board(api.clone(), FAST);

        next_snapshot(&mut rx).await;
        api.create_task(&NewTask::new("late")).await.unwrap();

        let snapshot = loop {
            let snapshot = next_snapshot(&mut rx).await;
            if !snapshot.tasks.is_empty() {
                break snapshot;
            }
        };
        assert_eq!(snapshot.tasks[0].title, "late");

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_board_poller_applies_commands() {
        let a = task("a", TaskStatus::InProgress, Assignee::Agent);
        let api = Arc::new(FakeApi::with_tasks(vec![a.clone()]));
        let (handle, mut rx) = spawn_board(api.clone(), Duration::from_secs(60));
        next_snapshot(&mut rx).await;

        handle
            .send(BoardCommand::Drop {
                task_id: a.id.clone(),
                target: Some(DropTarget::Column(TaskStatus::InReview)),
            })
            .await
            .unwrap();
        let outcome = loop {
            match timeout(WAIT, rx.recv()).await.unwrap() {
                Some(BoardEvent::Dropped(outcome)) => break outcome,
                Some(_) => continue,
                None => panic!("board poller ended"),
            }
        };
        assert!(matches!(outcome, DropOutcome::StatusChanged { persisted: true, .. }));

        let mut draft = ReviewDraft::new(a.id.clone());
        draft.select(ReviewDecision::Approve);
        handle.send(BoardCommand::Review(draft)).await.unwrap();
        handle
            .send(BoardCommand::SetFilter(AssigneeFilter::Human))
            .await
            .unwrap();

        let board = handle.stop().await.unwrap();
        assert_eq!(board.filter(), AssigneeFilter::Human);
        assert_eq!(api.stored()[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_board_poller_publishes_after_successful_actions() {
        let a = task("a", TaskStatus::Done, Assignee::Human);
        let api = Arc::new(FakeApi::with_tasks(vec![a.clone()]));
        let (handle, mut rx) = spawn_board(api.clone(), Duration::from_secs(60));
        next_snapshot(&mut rx).await;

        handle
            .send(BoardCommand::Create(NewTask::new("fresh")))
            .await
            .unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.tasks.len(), 2);
        let fresh = snapshot.column(TaskStatus::Backlog)[0].id.clone();

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            ..TaskPatch::default()
        };
        handle
            .send(BoardCommand::Edit {
                id: fresh.clone(),
                patch,
            })
            .await
            .unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.column(TaskStatus::Backlog)[0].title, "renamed");

        handle.send(BoardCommand::Start(fresh.clone())).await.unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.column(TaskStatus::InProgress).len(), 1);

        handle.send(BoardCommand::Delete(a.id.clone())).await.unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert!(snapshot.column(TaskStatus::Done).is_empty());

        handle.stop().await.unwrap();
        assert_eq!(api.stored().len(), 1);
        assert_eq!(api.stored()[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_board_poller_reports_failures() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let api = Arc::new(FakeApi::with_tasks(vec![a.clone()]));
        api.fail_writes(true);
        let (handle, mut rx) = spawn_board(api, Duration::from_secs(60));
        next_snapshot(&mut rx).await;

        handle.send(BoardCommand::Start(a.id.clone())).await.unwrap();
        let message = loop {
            match timeout(WAIT, rx.recv()).await.unwrap() {
                Some(BoardEvent::Error(message)) => break message,
                Some(_) => continue,
                None => panic!("board poller ended"),
            }
        };
        assert!(message.contains("injected failure"));

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_board_handle_stops_loop() {
        let api = Arc::new(FakeApi::default());
        let (handle, mut rx) = spawn_board(api, FAST);
        next_snapshot(&mut rx).await;

        drop(handle);

        timeout(WAIT, async { while rx.recv().await.is_some() {} })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropping_event_receiver_stops_loop() {
        let api = Arc::new(FakeApi::default());
        let (handle, rx) = spawn_board(api.clone(), FAST);
        drop(rx);

        let board = timeout(WAIT, handle.join).await.unwrap().unwrap();
        assert!(board.is_loaded());
        // One refresh, then nobody was listening.
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_activity_poller_publishes_summary() {
        let api = Arc::new(FakeApi::with_tasks(vec![
            task("work", TaskStatus::InProgress, Assignee::Agent),
            task("check", TaskStatus::InReview, Assignee::Agent),
            task("mine", TaskStatus::InProgress, Assignee::Human),
        ]));
        let (handle, mut rx) = spawn_activity(api, FAST);

        let activity = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(activity.in_progress.len(), 1);
        assert_eq!(activity.awaiting_review().len(), 1);

        handle.stop().await;
        timeout(WAIT, async { while rx.recv().await.is_some() {} })
            .await
            .unwrap();
    }
}
