use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub public_rps: u32,
    pub llm: LlmConfig,
    pub tasks: TaskGenConfig,
}

/// Chat-completions endpoint settings. `api_key: None` disables the LLM
/// strategies: learning-path generation rejects the request, task generation
/// falls back to the deterministic templates.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub path_model: String,
    pub task_model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct TaskGenConfig {
    pub default_due_days: i64,
    /// Weighted task types; only the keys (in declared order) drive the
    /// per-topic fallback emission.
    pub type_distribution: Vec<(String, u32)>,
    pub topic_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 30)?,
            llm: LlmConfig {
                api_key: env::var("GROQ_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                api_base: get_env_or("GROQ_API_BASE", "https://api.groq.com/openai/v1"),
                path_model: get_env_or("PATH_MODEL", "llama3-70b-8192"),
                task_model: get_env_or("TASK_MODEL", "deepseek-r1-distill-qwen-32b"),
                request_timeout_secs: get_env_parse_or("LLM_TIMEOUT_SECS", 30)?,
            },
            tasks: TaskGenConfig {
                default_due_days: get_env_parse_or("DEFAULT_DUE_DAYS", 7)?,
                type_distribution: parse_distribution(&get_env_or(
                    "TASK_TYPE_DISTRIBUTION",
                    "quiz:1,assignment:1,interactive:1",
                ))?,
                topic_concurrency: get_env_parse_or("TASK_TOPIC_CONCURRENCY", 3)?,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Parses `"quiz:1,assignment:2"` style weight lists; a bare name counts as
/// weight 1.
fn parse_distribution(raw: &str) -> Result<Vec<(String, u32)>> {
    let mut distribution = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once(':') {
            Some((name, weight)) => {
                let weight: u32 = weight.trim().parse().map_err(|_| {
                    Error::Config(format!("Invalid task weight in TASK_TYPE_DISTRIBUTION: {}", entry))
                })?;
                distribution.push((name.trim().to_string(), weight));
            }
            None => distribution.push((entry.to_string(), 1)),
        }
    }
    if distribution.is_empty() {
        return Err(Error::Config(
            "TASK_TYPE_DISTRIBUTION must name at least one task type".to_string(),
        ));
    }
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_weighted_distribution() {
        let parsed = parse_distribution("quiz:2, assignment:1,interactive:1").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("quiz".to_string(), 2),
                ("assignment".to_string(), 1),
                ("interactive".to_string(), 1),
            ]
        );
    }

    #[test]
    fn bare_names_default_to_weight_one() {
        let parsed = parse_distribution("quiz,interactive").unwrap();
        assert_eq!(
            parsed,
            vec![("quiz".to_string(), 1), ("interactive".to_string(), 1)]
        );
    }

    #[test]
    fn rejects_unparseable_weights_and_empty_lists() {
        assert!(parse_distribution("quiz:lots").is_err());
        assert!(parse_distribution("  ,, ").is_err());
    }
}
