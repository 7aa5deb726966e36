//! Board controller: the client's working copy of the task list.
//!
//! The controller keeps tasks in a presentation order that exists only on
//! the client. Reordering inside a column never reaches the server and is
//! lost on the next refresh. Status changes and recycle-bin deletes are
//! applied locally first and then sent; a failed call is handled by the
//! configured [`FailurePolicy`] and is never retried.

use std::sync::Arc;

use tracing::{debug, error, warn};

use mission_core::{
    AgentActivity, AssigneeFilter, CoreError, NewTask, ReviewDraft, Task, TaskId, TaskPatch,
    TaskStatus,
};

use crate::api::TaskApi;
use crate::error::ClientError;

/// Where a dragged task was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// On top of another task card.
    Task(TaskId),
    /// On a column's empty drop zone.
    Column(TaskStatus),
    /// On the recycle bin; deletes the task.
    RecycleBin,
}

/// What a drop did to the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing changed.
    NoOp,
    /// Order inside one column changed. Local only.
    Reordered,
    /// Status changed locally; `persisted` tells whether the server accepted it.
    StatusChanged {
        from: TaskStatus,
        to: TaskStatus,
        persisted: bool,
    },
    /// Removed locally; `persisted` tells whether the server accepted it.
    Deleted { persisted: bool },
}

/// How to handle a failed call after an optimistic local change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the error and keep the local change until the next poll.
    #[default]
    LogOnly,
    /// Log the error and refetch the list right away.
    Resync,
}

/// Client-side mirror of the board.
pub struct BoardController {
    api: Arc<dyn TaskApi>,
    /// Presentation order. Not persisted.
    tasks: Vec<Task>,
    filter: AssigneeFilter,
    policy: FailurePolicy,
    loaded: bool,
}

impl BoardController {
    /// Create an empty controller. Call [`refresh`](Self::refresh) to load.
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            filter: AssigneeFilter::All,
            policy: FailurePolicy::default(),
            loaded: false,
        }
    }

    /// Builder method to set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns true once the first refresh succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// All tasks in presentation order, ignoring the filter.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current view filter.
    pub fn filter(&self) -> AssigneeFilter {
        self.filter
    }

    /// Change the view filter. Never affects what is fetched.
    pub fn set_filter(&mut self, filter: AssigneeFilter) {
        self.filter = filter;
    }

    /// Tasks passing the filter, in presentation order.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// One column of the filtered view.
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status && self.filter.matches(t))
            .collect()
    }

    /// Summary of the agent's open work over the unfiltered list.
    pub fn activity(&self) -> AgentActivity {
        AgentActivity::from_tasks(&self.tasks)
    }

    /// Replace the working copy with the server's list.
    ///
    /// Local ordering and any unsynced optimistic change are discarded.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let tasks = self.api.list_tasks().await?;
        debug!(count = tasks.len(), "Board refreshed");
        self.tasks = tasks;
        self.loaded = true;
        Ok(())
    }

    /// Handle a released drag.
    pub async fn drop_task(&mut self, active: &TaskId, target: Option<DropTarget>) -> DropOutcome {
        let Some(target) = target else {
            return DropOutcome::NoOp;
        };
        let Some(active_status) = self.status_of(active) else {
            return DropOutcome::NoOp;
        };

        match target {
            DropTarget::RecycleBin => self.recycle(active).await,
            DropTarget::Column(status) if status != active_status => {
                self.change_status(active, active_status, status).await
            }
            DropTarget::Column(_) => DropOutcome::NoOp,
            DropTarget::Task(over) if &over == active => DropOutcome::NoOp,
            DropTarget::Task(over) => match self.status_of(&over) {
                Some(status) if status == active_status => self.reorder(active, &over),
                Some(status) => self.change_status(active, active_status, status).await,
                None => DropOutcome::NoOp,
            },
        }
    }

    /// Create a task, then reload.
    ///
    /// A blank title is refused without contacting the server.
    pub async fn create_task(&mut self, input: NewTask) -> Result<Task, ClientError> {
        if input.title.trim().is_empty() {
            return Err(CoreError::validation("title is required").into());
        }
        let task = self.api.create_task(&input).await?;
        self.reconcile().await;
        Ok(task)
    }

    /// Apply an edit, then reload.
    pub async fn edit_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task, ClientError> {
        patch.validate()?;
        let task = self.api.update_task(id, &patch).await?;
        self.reconcile().await;
        Ok(task)
    }

    /// `backlog -> in_progress`.
    pub async fn start_task(&mut self, id: &TaskId) -> Result<Task, ClientError> {
        self.edit_task(id, TaskPatch::start()).await
    }

    /// `in_progress -> in_review`, clearing old feedback.
    pub async fn submit_for_review(&mut self, id: &TaskId) -> Result<Task, ClientError> {
        self.edit_task(id, TaskPatch::submit_for_review()).await
    }

    /// Submit a review decision.
    ///
    /// Fails without a request if no decision was selected.
    pub async fn review(&mut self, draft: ReviewDraft) -> Result<Task, ClientError> {
        debug!(task_id = %draft.task_id(), decision = ?draft.decision(), "Submitting review");
        let (id, patch) = draft.into_patch()?;
        self.edit_task(&id, patch).await
    }

    /// Delete from a button: the server goes first, then the list reloads.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<(), ClientError> {
        self.api.delete_task(id).await?;
        self.reconcile().await;
        Ok(())
    }

    fn status_of(&self, id: &TaskId) -> Option<TaskStatus> {
        self.tasks.iter().find(|t| &t.id == id).map(|t| t.status)
    }

    /// Move `active` to the slot held by `over` inside their shared column.
    ///
    /// The column ends up after the other columns' tasks in the sequence.
    fn reorder(&mut self, active: &TaskId, over: &TaskId) -> DropOutcome {
        let Some(status) = self.status_of(active) else {
            return DropOutcome::NoOp;
        };
        let (mut column, others): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.status == status);

        let old_index = column.iter().position(|t| &t.id == active);
        let new_index = column.iter().position(|t| &t.id == over);
        let outcome = match (old_index, new_index) {
            (Some(old), Some(new)) if old != new => {
                let moved = column.remove(old);
                column.insert(new, moved);
                debug!(task_id = %active, from = old, to = new, "Reordered task within column");
                DropOutcome::Reordered
            }
            _ => DropOutcome::NoOp,
        };

        self.tasks = others;
        self.tasks.extend(column);
        outcome
    }

    async fn change_status(
        &mut self,
        id: &TaskId,
        from: TaskStatus,
        to: TaskStatus,
    ) -> DropOutcome {
        if let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) {
            task.status = to;
        }

        let persisted = match self.api.update_task(id, &TaskPatch::status(to)).await {
            Ok(_) => {
                self.reconcile().await;
                true
            }
            Err(e) => {
                error!(task_id = %id, error = %e, "Failed to update task status");
                self.after_failure().await;
                false
            }
        };
        DropOutcome::StatusChanged {
            from,
            to,
            persisted,
        }
    }

    async fn recycle(&mut self, id: &TaskId) -> DropOutcome {
        self.tasks.retain(|t| &t.id != id);

        let persisted = match self.api.delete_task(id).await {
            Ok(()) => true,
            Err(e) => {
                error!(task_id = %id, error = %e, "Failed to delete task");
                self.after_failure().await;
                false
            }
        };
        DropOutcome::Deleted { persisted }
    }

    async fn after_failure(&mut self) {
        if self.policy == FailurePolicy::Resync {
            self.reconcile().await;
        }
    }

    /// Refresh after a mutation; a failure here only waits for the next poll.
    async fn reconcile(&mut self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Refresh after mutation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::{Assignee, ReviewDecision, DEFAULT_REJECTION_NOTE};

    use crate::testing::FakeApi;

    fn task(title: &str, status: TaskStatus, assignee: Assignee) -> Task {
        Task::create(
            NewTask::new(title)
                .with_status(status)
                .with_assignee(assignee),
            1,
        )
        .unwrap()
    }

    async fn board(tasks: Vec<Task>) -> (Arc<FakeApi>, BoardController) {
        let api = Arc::new(FakeApi::with_tasks(tasks));
        let mut board = BoardController::new(api.clone());
        board.refresh().await.unwrap();
        (api, board)
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_refresh_loads_tasks() {
        let (_, board) = board(vec![task("a", TaskStatus::Backlog, Assignee::Human)]).await;
        assert!(board.is_loaded());
        assert_eq!(board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_reorder_same_column_is_local_only() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let b = task("b", TaskStatus::Backlog, Assignee::Human);
        let c = task("c", TaskStatus::Backlog, Assignee::Human);
        let x = task("x", TaskStatus::Done, Assignee::Human);
        let (api, mut board) = board(vec![a.clone(), b, c.clone(), x]).await;

        let outcome = board
            .drop_task(&a.id, Some(DropTarget::Task(c.id.clone())))
            .await;

        assert_eq!(outcome, DropOutcome::Reordered);
        assert_eq!(titles(&board.column(TaskStatus::Backlog)), vec!["b", "c", "a"]);
        // The reordered column moves after the rest of the sequence.
        assert_eq!(board.tasks()[0].title, "x");
        assert_eq!(api.calls(), vec!["list"]);

        // The next refresh brings back server order.
        board.refresh().await.unwrap();
        assert_eq!(titles(&board.column(TaskStatus::Backlog)), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_drop_on_other_column_task_changes_status() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let b = task("b", TaskStatus::InProgress, Assignee::Human);
        let (api, mut board) = board(vec![a.clone(), b.clone()]).await;

        let outcome = board
            .drop_task(&a.id, Some(DropTarget::Task(b.id.clone())))
            .await;

        assert_eq!(
            outcome,
            DropOutcome::StatusChanged {
                from: TaskStatus::Backlog,
                to: TaskStatus::InProgress,
                persisted: true,
            }
        );
        assert_eq!(board.column(TaskStatus::InProgress).len(), 2);
        assert_eq!(api.stored()[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_drop_on_empty_column() {
        let a = task("a", TaskStatus::InReview, Assignee::Agent);
        let (api, mut board) = board(vec![a.clone()]).await;

        let outcome = board
            .drop_task(&a.id, Some(DropTarget::Column(TaskStatus::Done)))
            .await;

        assert!(matches!(outcome, DropOutcome::StatusChanged { persisted: true, .. }));
        assert_eq!(api.stored()[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_failed_status_change_is_not_rolled_back() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let (api, mut board) = board(vec![a.clone()]).await;
        api.fail_writes(true);

        let outcome = board
            .drop_task(&a.id, Some(DropTarget::Column(TaskStatus::InProgress)))
            .await;

        assert!(matches!(outcome, DropOutcome::StatusChanged { persisted: false, .. }));
        assert_eq!(board.tasks()[0].status, TaskStatus::InProgress);
        assert_eq!(api.stored()[0].status, TaskStatus::Backlog);
    }

    #[tokio::test]
    async fn test_resync_policy_reloads_after_failure() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let api = Arc::new(FakeApi::with_tasks(vec![a.clone()]));
        let mut board = BoardController::new(api.clone()).with_policy(FailurePolicy::Resync);
        board.refresh().await.unwrap();
        api.fail_writes(true);

        board
            .drop_task(&a.id, Some(DropTarget::Column(TaskStatus::InProgress)))
            .await;

        assert_eq!(board.tasks()[0].status, TaskStatus::Backlog);
    }

    #[tokio::test]
    async fn test_recycle_removes_immediately() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let b = task("b", TaskStatus::Backlog, Assignee::Human);
        let (api, mut board) = board(vec![a.clone(), b]).await;

        let outcome = board.drop_task(&a.id, Some(DropTarget::RecycleBin)).await;

        assert_eq!(outcome, DropOutcome::Deleted { persisted: true });
        assert_eq!(titles(&board.visible()), vec!["b"]);
        assert_eq!(api.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_recycle_keeps_task_hidden() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let (api, mut board) = board(vec![a.clone()]).await;
        api.fail_writes(true);

        let outcome = board.drop_task(&a.id, Some(DropTarget::RecycleBin)).await;

        assert_eq!(outcome, DropOutcome::Deleted { persisted: false });
        assert!(board.tasks().is_empty());
        assert_eq!(api.stored().len(), 1);

        // The next poll brings it back.
        board.refresh().await.unwrap();
        assert_eq!(board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_noop_drops() {
        let a = task("a", TaskStatus::Backlog, Assignee::Human);
        let (api, mut board) = board(vec![a.clone()]).await;

        assert_eq!(board.drop_task(&a.id, None).await, DropOutcome::NoOp);
        assert_eq!(
            board
                .drop_task(&a.id, Some(DropTarget::Task(a.id.clone())))
                .await,
            DropOutcome::NoOp
        );
        assert_eq!(
            board
                .drop_task(&a.id, Some(DropTarget::Column(TaskStatus::Backlog)))
                .await,
            DropOutcome::NoOp
        );
        assert_eq!(
            board
                .drop_task(&TaskId::new("unknown"), Some(DropTarget::RecycleBin))
                .await,
            DropOutcome::NoOp
        );
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_filter_only_affects_view() {
        let (api, mut board) = board(vec![
            task("mine", TaskStatus::Backlog, Assignee::Human),
            task("bots", TaskStatus::Backlog, Assignee::Agent),
        ])
        .await;

        board.set_filter(AssigneeFilter::Agent);
        assert_eq!(titles(&board.visible()), vec!["bots"]);
        assert_eq!(board.tasks().len(), 2);

        board.refresh().await.unwrap();
        assert_eq!(titles(&board.column(TaskStatus::Backlog)), vec!["bots"]);
        assert_eq!(api.calls(), vec!["list", "list"]);
    }

    #[tokio::test]
    async fn test_create_blank_title_sends_nothing() {
        let (api, mut board) = board(Vec::new()).await;
        let err = board.create_task(NewTask::new("  ")).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_review_workflow() {
        let (_, mut board) = board(Vec::new()).await;
        let task = board
            .create_task(NewTask::new("Write tests").with_assignee(Assignee::Agent))
            .await
            .unwrap();
        assert_eq!(board.tasks().len(), 1);

        board.start_task(&task.id).await.unwrap();
        board.submit_for_review(&task.id).await.unwrap();
        assert_eq!(board.activity().awaiting_review().len(), 1);

        let undecided = ReviewDraft::new(task.id.clone());
        assert!(board.review(undecided).await.is_err());

        let mut reject = ReviewDraft::new(task.id.clone());
        reject.select(ReviewDecision::Reject);
        let rejected = board.review(reject).await.unwrap();
        assert_eq!(rejected.review_notes.as_deref(), Some(DEFAULT_REJECTION_NOTE));

        board.submit_for_review(&task.id).await.unwrap();
        assert_eq!(board.tasks()[0].review_notes, None);

        let mut approve = ReviewDraft::new(task.id.clone());
        approve.select(ReviewDecision::Approve);
        let done = board.review(approve).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert_eq!(board.column(TaskStatus::Done).len(), 1);
    }

    #[tokio::test]
    async fn test_button_delete_reloads() {
        let a = task("a", TaskStatus::Done, Assignee::Human);
        let (api, mut board) = board(vec![a.clone()]).await;

        board.delete_task(&a.id).await.unwrap();

        assert!(board.tasks().is_empty());
        assert_eq!(api.calls().last().map(String::as_str), Some("list"));
    }
}
