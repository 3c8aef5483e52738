//! Task management module
//!
//! - Task model (daily / monthly, priority, local deadline)
//! - Deadline parsing for the command line
//! - Collision-free id allocation

pub mod deadline;
pub mod id;
pub mod model;

pub use id::IdGenerator;
pub use model::{NewTask, Priority, Task, TaskId, TaskKind};
