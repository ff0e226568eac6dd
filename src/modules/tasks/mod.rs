pub mod model;
pub mod store;

// Re-export the main types
pub use model::TaskRecord;
pub use store::{JsonTodoStore, MemoryTodoStore, TodoStore};
