pub mod llm_service;
pub mod metrics_service;
pub mod path_service;
pub mod pipeline_service;
pub mod prompt_service;
pub mod repair_service;
pub mod task_generation_service;
pub mod task_service;
