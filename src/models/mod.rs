pub mod diagnostic;
pub mod learning_path;
pub mod task;
pub mod user;
