pub mod task;
pub mod user;

pub use task::{PublicOwner, PublicTask, Task, TaskInput, TaskUpdate};
pub use user::{FullName, User};
