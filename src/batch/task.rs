//! Per-URL fetch task tracking

/// Lifecycle of one detail fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Spawned, waiting at the rate gate
    #[default]
    Pending,
    /// Passed the gate, request outstanding
    InFlight,
    /// Record fetched and parsed
    Completed,
    /// Fetch failed
    Failed,
    /// Cancelled because the batch stopped first
    Abandoned,
}

impl TaskState {
    /// Whether the task reached an end state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Abandoned
        )
    }
}

/// One detail fetch, owned by the batch executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    /// Detail URL
    pub source_url: String,
    /// Current state
    pub state: TaskState,
    /// Requests issued so far
    pub attempts: u32,
    /// Last error message
    pub error: Option<String>,
}

impl FetchTask {
    /// New pending task for `source_url`
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            state: TaskState::Pending,
            attempts: 0,
            error: None,
        }
    }

    /// A request for this task was issued
    pub fn mark_in_flight(&mut self) {
        self.state = TaskState::InFlight;
        self.attempts += 1;
    }

    /// An attempt failed and will be retried
    pub fn mark_retrying(&mut self, error: impl ToString) {
        self.state = TaskState::Pending;
        self.error = Some(error.to_string());
    }

    /// The record arrived
    pub fn mark_completed(&mut self) {
        self.state = TaskState::Completed;
        self.error = None;
    }

    /// The final attempt failed
    pub fn mark_failed(&mut self, error: impl ToString) {
        self.state = TaskState::Failed;
        self.error = Some(error.to_string());
    }

    /// Stopped before finishing; no-op for tasks already finished
    pub fn mark_abandoned(&mut self) {
        if !self.state.is_terminal() {
            self.state = TaskState::Abandoned;
        }
    }
}
