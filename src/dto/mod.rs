pub mod path_dto;
pub mod task_dto;
