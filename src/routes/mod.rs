pub mod health;
pub mod path_routes;
pub mod task_routes;
