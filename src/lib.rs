pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::{
    llm_service::{LlmClient, LlmService},
    path_service::PathService,
    pipeline_service::PipelineService,
    task_generation_service::TaskGenerationService,
    task_service::TaskService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub path_service: PathService,
    pub task_service: TaskService,
    pub pipeline_service: PipelineService,
    pub task_generation_service: TaskGenerationService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        // Without credentials the pipeline rejects path generation and task
        // synthesis falls back to templates.
        let llm: Option<Arc<dyn LlmClient>> =
            match LlmService::new(config.llm.clone(), http_client) {
                Ok(service) => Some(Arc::new(service)),
                Err(err) => {
                    tracing::warn!(error = %err, "LLM client unavailable");
                    None
                }
            };

        let path_service = PathService::new(pool.clone());
        let task_service = TaskService::new(pool.clone());
        let pipeline_service = PipelineService::new(llm.clone());
        let task_generation_service = TaskGenerationService::new(llm, config.tasks.clone());

        Self {
            pool,
            config,
            path_service,
            task_service,
            pipeline_service,
            task_generation_service,
        }
    }
}
