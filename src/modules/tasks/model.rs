use serde::{Deserialize, Serialize};

/// Structure representing a single task belonging to an account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskRecord {
    pub owner: String, // Account identifier
    pub description: String,
    pub due_at: Option<u64>, // Epoch seconds; tasks without a due time never go overdue
    pub completed: bool,
}

impl TaskRecord {
    /// An incomplete task whose due time has passed relative to `now`
    pub fn is_overdue(&self, now: u64) -> bool {
        !self.completed && self.due_at.map_or(false, |due| due < now)
    }
}
