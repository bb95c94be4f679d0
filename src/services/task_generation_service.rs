use crate::config::TaskGenConfig;
use crate::models::learning_path::{StudentProfile, TopicContext};
use crate::models::task::{Difficulty, GeneratedTask, TaskType};
use crate::services::llm_service::{CompletionRequest, LlmClient, Stage};
use crate::services::prompt_service::{PromptBuilder, TASK_SYSTEM_PROMPT};
use futures::stream::{self, StreamExt};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

const TEMPLATE_TYPES: [TaskType; 3] = [TaskType::Quiz, TaskType::Assignment, TaskType::Interactive];

fn type_label(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Quiz => "Quiz",
        TaskType::Assignment => "Assignment",
        TaskType::Interactive => "Interactive",
    }
}

/// Template-based generator. Produces a fixed quiz/assignment/interactive
/// trio per objective without calling out anywhere.
pub struct TaskGenerator;

impl TaskGenerator {
    pub fn objective_tasks(
        objective: &str,
        difficulty: &str,
        student_grade: &str,
    ) -> Vec<GeneratedTask> {
        let normalized = Difficulty::normalize(difficulty);
        tracing::info!(
            objective,
            difficulty = normalized.as_str(),
            student_grade,
            "generating template tasks"
        );

        TEMPLATE_TYPES
            .iter()
            .map(|&task_type| GeneratedTask {
                title: format!("{objective} - {}", type_label(task_type)),
                task_type,
                difficulty: normalized,
                learning_objective: objective.to_string(),
                content: Self::objective_content(task_type, objective),
            })
            .collect()
    }

    /// Last-resort trio with placeholder content, used when a learning path
    /// offers nothing to work from.
    pub fn generic_tasks() -> Vec<GeneratedTask> {
        TEMPLATE_TYPES
            .iter()
            .map(|&task_type| GeneratedTask {
                title: format!("Basic {} Task", type_label(task_type)),
                task_type,
                difficulty: Difficulty::Medium,
                learning_objective: "General Learning".to_string(),
                content: Self::generic_content(task_type),
            })
            .collect()
    }

    /// Per-topic fallback when the model produced nothing usable for a topic.
    /// Task types follow the configured distribution keys.
    pub fn topic_fallback(topic: &TopicContext, distribution: &[(String, u32)]) -> Vec<GeneratedTask> {
        let title = topic.display_title();
        distribution
            .iter()
            .filter_map(|(name, _)| TaskType::parse(name))
            .map(|task_type| GeneratedTask {
                title: format!("{title} - {}", type_label(task_type)),
                task_type,
                difficulty: Difficulty::normalize(&topic.difficulty),
                learning_objective: title.to_string(),
                content: Self::topic_content(topic, task_type),
            })
            .collect()
    }

    fn objective_content(task_type: TaskType, objective: &str) -> JsonValue {
        match task_type {
            TaskType::Quiz => json!({
                "instructions": format!("Test your knowledge about {objective}"),
                "questions": [
                    {
                        "question": format!("What is the primary purpose of {objective}?"),
                        "options": [
                            "To improve system efficiency",
                            "To enhance user experience",
                            "To maintain data integrity",
                            "To ensure security compliance"
                        ],
                        "correct_answer": 0,
                        "type": "multiple_choice",
                        "explanation": "Understanding the primary purpose helps establish the foundation."
                    },
                    {
                        "question": format!("Which of the following best describes {objective}?"),
                        "options": [
                            "A systematic approach to problem-solving",
                            "A collection of best practices",
                            "A framework for development",
                            "An implementation strategy"
                        ],
                        "correct_answer": 1,
                        "type": "multiple_choice",
                        "explanation": "This helps clarify the core concept."
                    },
                    {
                        "question": "True or False: Regular practice is essential for mastering this concept.",
                        "options": ["True", "False"],
                        "correct_answer": 0,
                        "type": "boolean",
                        "explanation": "Practice is key to understanding and retention."
                    },
                    {
                        "question": format!("What are the key components of {objective}?"),
                        "type": "short_answer",
                        "max_words": 100,
                        "sample_answer": "The key components include fundamental principles, practical applications, and evaluation methods."
                    }
                ],
                "time_limit": 30,
                "passing_score": 70,
                "show_explanations": true
            }),
            TaskType::Assignment => json!({
                "instructions": format!("Complete this comprehensive assignment about {objective}"),
                "sections": [
                    {
                        "title": "Theoretical Understanding",
                        "description": format!("Explain the core concepts of {objective}"),
                        "type": "essay",
                        "word_limit": 500,
                        "rubric": {
                            "understanding": "Demonstrates clear understanding of concepts",
                            "analysis": "Provides thoughtful analysis and examples",
                            "organization": "Well-structured and coherent presentation"
                        }
                    },
                    {
                        "title": "Practical Application",
                        "description": format!("Design a solution using principles of {objective}"),
                        "type": "project",
                        "requirements": [
                            "Clear problem statement",
                            "Detailed solution approach",
                            "Implementation considerations",
                            "Expected outcomes"
                        ],
                        "deliverables": [
                            "Project documentation",
                            "Implementation plan",
                            "Evaluation criteria"
                        ]
                    },
                    {
                        "title": "Reflection",
                        "description": "Reflect on your learning experience",
                        "type": "short_answer",
                        "prompts": [
                            "What were the key insights you gained?",
                            "How can you apply these concepts in real-world scenarios?",
                            "What challenges did you face and how did you overcome them?"
                        ]
                    }
                ],
                "submission_format": "pdf",
                "resources": [
                    "Course materials",
                    "Online documentation",
                    "Reference examples"
                ],
                "grading_criteria": {
                    "content": 40,
                    "analysis": 30,
                    "presentation": 20,
                    "reflection": 10
                }
            }),
            TaskType::Interactive => json!({
                "activity_type": "multi_stage_practice",
                "instructions": format!("Complete this interactive learning session about {objective}"),
                "stages": [
                    {
                        "title": "Concept Review",
                        "type": "matching",
                        "items": [
                            {"id": 1, "text": format!("Definition of {objective}")},
                            {"id": 2, "text": "Key Principles"},
                            {"id": 3, "text": "Best Practices"},
                            {"id": 4, "text": "Common Challenges"}
                        ],
                        "matches": [
                            {"id": "a", "text": "Core understanding of the subject matter"},
                            {"id": "b", "text": "Fundamental rules and guidelines"},
                            {"id": "c", "text": "Recommended approaches"},
                            {"id": "d", "text": "Typical obstacles and solutions"}
                        ],
                        "correct_matches": {"1": "a", "2": "b", "3": "c", "4": "d"}
                    },
                    {
                        "title": "Practical Exercise",
                        "type": "simulation",
                        "scenario": format!("Apply {objective} in a real-world situation"),
                        "steps": [
                            {
                                "order": 1,
                                "action": "Identify the problem",
                                "hints": ["Consider the context", "Review requirements"]
                            },
                            {
                                "order": 2,
                                "action": "Plan your approach",
                                "hints": ["Break down into steps", "Consider alternatives"]
                            },
                            {
                                "order": 3,
                                "action": "Implement solution",
                                "hints": ["Follow best practices", "Test as you go"]
                            }
                        ]
                    },
                    {
                        "title": "Knowledge Check",
                        "type": "drag_and_drop",
                        "elements": [
                            {"id": 1, "text": "First step", "correct_position": 1},
                            {"id": 2, "text": "Second step", "correct_position": 2},
                            {"id": 3, "text": "Third step", "correct_position": 3},
                            {"id": 4, "text": "Final step", "correct_position": 4}
                        ],
                        "feedback": {
                            "success": "Great job! You've mastered the sequence.",
                            "partial": "Almost there! Review the order once more.",
                            "failure": "Review the process and try again."
                        }
                    }
                ],
                "progress_tracking": {
                    "minimum_score": 70,
                    "attempts_allowed": 3,
                    "time_limit": 45
                },
                "completion_criteria": {
                    "all_stages_completed": true,
                    "minimum_accuracy": 80,
                    "minimum_time_spent": 15
                }
            }),
        }
    }

    fn topic_content(topic: &TopicContext, task_type: TaskType) -> JsonValue {
        let title = topic.display_title();
        match task_type {
            TaskType::Quiz => json!({
                "instructions": format!("Test your knowledge of {title}"),
                "questions": [
                    {
                        "question": format!("What is the main concept of {title}?"),
                        "type": "multiple_choice",
                        "options": ["Option A", "Option B", "Option C", "Option D"],
                        "correct_answer": 0
                    }
                ]
            }),
            TaskType::Assignment => json!({
                "instructions": format!("Apply your knowledge of {title}"),
                "questions": [
                    {
                        "question": format!("Explain the key principles of {title}"),
                        "type": "essay",
                        "word_limit": 250
                    }
                ]
            }),
            TaskType::Interactive => json!({
                "instructions": format!("Practice {title} concepts interactively"),
                "activity_type": "matching",
                "items": [
                    {"id": 1, "text": format!("Key concept 1 from {title}")},
                    {"id": 2, "text": format!("Key concept 2 from {title}")}
                ],
                "matches": [
                    {"id": "a", "text": "Definition 1"},
                    {"id": "b", "text": "Definition 2"}
                ],
                "correct_matches": {"1": "a", "2": "b"}
            }),
        }
    }

    fn generic_content(task_type: TaskType) -> JsonValue {
        match task_type {
            TaskType::Quiz => json!({
                "questions": [
                    {
                        "question": "Sample question 1",
                        "options": ["Option A", "Option B", "Option C", "Option D"],
                        "correct_answer": 0
                    },
                    {
                        "question": "Sample question 2",
                        "options": ["Option A", "Option B", "Option C", "Option D"],
                        "correct_answer": 1
                    }
                ]
            }),
            TaskType::Assignment => json!({
                "instructions": "Complete this basic assignment",
                "questions": [
                    {
                        "question": "Write a short essay",
                        "type": "essay"
                    }
                ]
            }),
            TaskType::Interactive => json!({
                "activity_type": "matching",
                "items": [
                    {"id": 1, "text": "Term 1"},
                    {"id": 2, "text": "Term 2"}
                ],
                "matches": [
                    {"id": "a", "text": "Definition 1"},
                    {"id": "b", "text": "Definition 2"}
                ],
                "correct_matches": {"1": "a", "2": "b"}
            }),
        }
    }
}

/// Chooses the synthesis strategy by credential availability: with a client
/// the model writes per-topic tasks, without one the templates do.
#[derive(Clone)]
pub struct TaskGenerationService {
    llm: Option<Arc<dyn LlmClient>>,
    config: TaskGenConfig,
}

impl TaskGenerationService {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, config: TaskGenConfig) -> Self {
        Self { llm, config }
    }

    pub async fn generate_from_path(&self, path_data: &JsonValue) -> Vec<GeneratedTask> {
        match &self.llm {
            Some(llm) => self.model_strategy(llm.as_ref(), path_data).await,
            None => Self::template_strategy(path_data),
        }
    }

    fn template_strategy(path_data: &JsonValue) -> Vec<GeneratedTask> {
        let profile = StudentProfile::from_path_data(path_data);
        let mut topics = parse_topics(path_data);
        if topics.is_empty() {
            tracing::warn!("no topics in learning path, generating generic tasks");
            topics = vec![default_topic()];
        }

        topics
            .iter()
            .flat_map(|topic| {
                let title = if topic.title.is_empty() {
                    "General Learning"
                } else {
                    topic.title.as_str()
                };
                TaskGenerator::objective_tasks(title, &topic.difficulty, &profile.grade_level)
            })
            .collect()
    }

    async fn model_strategy(&self, llm: &dyn LlmClient, path_data: &JsonValue) -> Vec<GeneratedTask> {
        if path_data.as_object().map_or(true, |map| map.is_empty()) {
            tracing::error!("learning path data is empty");
            return TaskGenerator::generic_tasks();
        }

        let topics = parse_topics(path_data);
        if topics.is_empty() {
            tracing::error!("no topics found in learning path data");
            return TaskGenerator::generic_tasks();
        }
        let profile = StudentProfile::from_path_data(path_data);
        let profile = &profile;

        let tasks: Vec<GeneratedTask> = stream::iter(topics)
            .map(|topic| async move {
                let generated = self.topic_tasks(llm, &topic, profile).await;
                if generated.is_empty() {
                    TaskGenerator::topic_fallback(&topic, &self.config.type_distribution)
                } else {
                    generated
                }
            })
            .buffered(self.config.topic_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        if tasks.is_empty() {
            tracing::warn!("no tasks generated, using fallback tasks");
            return TaskGenerator::generic_tasks();
        }
        tracing::info!(count = tasks.len(), "task synthesis completed");
        tasks
    }

    async fn topic_tasks(
        &self,
        llm: &dyn LlmClient,
        topic: &TopicContext,
        profile: &StudentProfile,
    ) -> Vec<GeneratedTask> {
        tracing::info!(topic = topic.display_title(), "generating tasks for topic");
        let prompt = PromptBuilder::topic_task_prompt(topic, profile);
        let request = CompletionRequest::with_system(Stage::TaskBatch, TASK_SYSTEM_PROMPT, prompt);

        let document = match llm.complete(request).await {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(topic = topic.display_title(), error = %err, "topic task call failed");
                return Vec::new();
            }
        };

        let Some(entries) = document.get("tasks").and_then(|v| v.as_array()) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| coerce_task(entry, topic))
            .collect()
    }
}

fn default_topic() -> TopicContext {
    TopicContext {
        title: "General Learning".to_string(),
        description: String::new(),
        objectives: Vec::new(),
        difficulty: "medium".to_string(),
    }
}

fn parse_topics(path_data: &JsonValue) -> Vec<TopicContext> {
    path_data
        .get("topics")
        .and_then(|v| v.as_array())
        .map(|topics| topics.iter().map(TopicContext::from_value).collect())
        .unwrap_or_default()
}

/// A model-written task survives only with all required fields present and a
/// content document matching its type.
fn coerce_task(entry: &JsonValue, topic: &TopicContext) -> Option<GeneratedTask> {
    let title = entry.get("title")?.as_str().filter(|t| !t.is_empty())?;
    let task_type = TaskType::parse(entry.get("task_type")?.as_str()?)?;
    let difficulty = Difficulty::normalize(entry.get("difficulty")?.as_str()?);
    let content = entry.get("content")?.clone();
    if !content.is_object() {
        return None;
    }

    let task = GeneratedTask {
        title: title.to_string(),
        task_type,
        difficulty,
        learning_objective: topic.display_title().to_string(),
        content,
    };
    task.content_matches_type().then_some(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::services::llm_service::MockLlmClient;

    fn test_config() -> TaskGenConfig {
        TaskGenConfig {
            default_due_days: 7,
            type_distribution: vec![
                ("quiz".to_string(), 1),
                ("assignment".to_string(), 1),
                ("interactive".to_string(), 1),
            ],
            topic_concurrency: 3,
        }
    }

    fn fraction_topic() -> JsonValue {
        json!({
            "topics": [{
                "title": "Fractions",
                "description": "Working with parts of a whole",
                "objectives": ["Compare fractions"],
                "difficulty": "advanced"
            }],
            "student_grade": "beginner",
            "learning_style": "visual"
        })
    }

    #[test]
    fn objective_tasks_cover_all_three_types() {
        let tasks = TaskGenerator::objective_tasks("Fractions", "advanced", "intermediate");

        assert_eq!(tasks.len(), 3);
        let types: Vec<TaskType> = tasks.iter().map(|t| t.task_type).collect();
        assert_eq!(
            types,
            vec![TaskType::Quiz, TaskType::Assignment, TaskType::Interactive]
        );
        assert_eq!(tasks[0].title, "Fractions - Quiz");
        assert_eq!(tasks[2].title, "Fractions - Interactive");
        assert!(tasks.iter().all(|t| t.difficulty == Difficulty::Hard));
        assert!(tasks.iter().all(|t| t.learning_objective == "Fractions"));
        assert!(tasks.iter().all(GeneratedTask::content_matches_type));
    }

    #[test]
    fn quiz_template_carries_four_questions() {
        let tasks = TaskGenerator::objective_tasks("Decimals", "easy", "intermediate");
        let quiz = &tasks[0];
        assert_eq!(quiz.content["questions"].as_array().unwrap().len(), 4);
        assert_eq!(quiz.content["passing_score"], 70);
        let interactive = &tasks[2];
        assert_eq!(interactive.content["activity_type"], "multi_stage_practice");
        assert_eq!(interactive.content["stages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn difficulty_normalization_is_total() {
        let cases = [
            ("basic", Difficulty::Easy),
            ("Basic", Difficulty::Easy),
            ("intermediate", Difficulty::Medium),
            ("Intermediate", Difficulty::Medium),
            ("advanced", Difficulty::Hard),
            ("Advanced", Difficulty::Hard),
            ("easy", Difficulty::Easy),
            ("medium", Difficulty::Medium),
            ("hard", Difficulty::Hard),
            ("expert", Difficulty::Medium),
            ("", Difficulty::Medium),
        ];
        for (raw, expected) in cases {
            assert_eq!(Difficulty::normalize(raw), expected, "raw value {raw:?}");
        }
    }

    #[test]
    fn generic_tasks_stay_on_placeholder_content() {
        let tasks = TaskGenerator::generic_tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "Basic Quiz Task");
        assert!(tasks.iter().all(|t| t.difficulty == Difficulty::Medium));
        assert!(tasks.iter().all(|t| t.learning_objective == "General Learning"));
        assert!(tasks.iter().all(GeneratedTask::content_matches_type));
    }

    #[test]
    fn topic_fallback_follows_the_configured_distribution() {
        let topic = TopicContext {
            title: "Fractions".to_string(),
            description: String::new(),
            objectives: vec!["Compare fractions".to_string()],
            difficulty: "advanced".to_string(),
        };
        let distribution = vec![
            ("quiz".to_string(), 2),
            ("mystery".to_string(), 1),
            ("interactive".to_string(), 1),
        ];

        let tasks = TaskGenerator::topic_fallback(&topic, &distribution);

        // Unknown type names are skipped rather than invented.
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Fractions - Quiz");
        assert_eq!(tasks[1].task_type, TaskType::Interactive);
        assert!(tasks.iter().all(|t| t.difficulty == Difficulty::Hard));
        assert!(tasks.iter().all(|t| t.learning_objective == "Fractions"));
    }

    #[tokio::test]
    async fn valid_model_tasks_pass_through() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete().times(1).returning(|_| {
            Ok(json!({
                "tasks": [
                    {
                        "title": "Fraction Strips Quiz",
                        "task_type": "quiz",
                        "difficulty": "advanced",
                        "content": {"questions": [{"question": "Which is larger?"}]}
                    },
                    {
                        "title": "Recipe Scaling Project",
                        "task_type": "assignment",
                        "difficulty": "medium",
                        "content": {"instructions": "Scale a recipe for 12 guests"}
                    }
                ]
            }))
        });
        let service = TaskGenerationService::new(Some(Arc::new(mock)), test_config());

        let tasks = service.generate_from_path(&fraction_topic()).await;

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Fraction Strips Quiz");
        assert_eq!(tasks[0].difficulty, Difficulty::Hard);
        assert_eq!(tasks[0].learning_objective, "Fractions");
        assert_eq!(tasks[1].task_type, TaskType::Assignment);
    }

    #[tokio::test]
    async fn unusable_model_tasks_fall_back_to_topic_templates() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete().times(1).returning(|_| {
            Ok(json!({
                "tasks": [
                    {"title": "No content here", "task_type": "quiz", "difficulty": "easy"},
                    {"title": "Unknown kind", "task_type": "puzzle", "difficulty": "easy",
                     "content": {"questions": []}},
                    {"title": "Shape mismatch", "task_type": "quiz", "difficulty": "easy",
                     "content": {"instructions": "no questions key"}}
                ]
            }))
        });
        let service = TaskGenerationService::new(Some(Arc::new(mock)), test_config());

        let tasks = service.generate_from_path(&fraction_topic()).await;

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "Fractions - Quiz");
        assert!(tasks.iter().all(|t| t.difficulty == Difficulty::Hard));
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_topic_templates() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(LlmError::Transport("connection refused".to_string())));
        let service = TaskGenerationService::new(Some(Arc::new(mock)), test_config());

        let tasks = service.generate_from_path(&fraction_topic()).await;

        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.title.starts_with("Fractions - ")));
    }

    #[tokio::test]
    async fn a_path_without_topics_produces_the_generic_trio() {
        // No expectations on the mock: reaching the model here would panic.
        let mock = MockLlmClient::new();
        let service = TaskGenerationService::new(Some(Arc::new(mock)), test_config());

        let tasks = service
            .generate_from_path(&json!({"topics": [], "student_grade": "beginner"}))
            .await;

        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.title.starts_with("Basic ")));
    }

    #[tokio::test]
    async fn empty_path_data_produces_the_generic_trio() {
        let mock = MockLlmClient::new();
        let service = TaskGenerationService::new(Some(Arc::new(mock)), test_config());

        let tasks = service.generate_from_path(&json!({})).await;

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].title, "Basic Assignment Task");
    }

    #[tokio::test]
    async fn without_a_client_templates_cover_every_topic() {
        let service = TaskGenerationService::new(None, test_config());
        let path_data = json!({
            "topics": [
                {"title": "Fractions", "difficulty": "advanced"},
                {"title": "Decimals", "difficulty": "basic"}
            ],
            "student_grade": "intermediate"
        });

        let tasks = service.generate_from_path(&path_data).await;

        assert_eq!(tasks.len(), 6);
        assert_eq!(tasks[0].title, "Fractions - Quiz");
        assert_eq!(tasks[0].difficulty, Difficulty::Hard);
        assert_eq!(tasks[3].title, "Decimals - Quiz");
        assert_eq!(tasks[3].difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn without_a_client_and_topics_the_default_topic_drives_templates() {
        let service = TaskGenerationService::new(None, test_config());

        let tasks = service.generate_from_path(&json!({})).await;

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "General Learning - Quiz");
        assert!(tasks.iter().all(|t| t.difficulty == Difficulty::Medium));
    }
}
