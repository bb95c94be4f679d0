use crate::error::{Error, LlmError, Result};
use crate::models::diagnostic::ClassifiedQuestion;
use crate::services::llm_service::{CompletionRequest, LlmClient, Stage};
use crate::services::metrics_service::MetricsAnalyzer;
use crate::services::prompt_service::PromptBuilder;
use crate::services::repair_service::SchemaRepairer;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Sequential learning-path pipeline: metrics, analysis call, path call plus
/// repair, roadmap call plus repair, merge. Every stage failure is terminal
/// for the request; there is no fallback generator and no retry.
#[derive(Clone)]
pub struct PipelineService {
    llm: Option<Arc<dyn LlmClient>>,
}

impl PipelineService {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        student_info: &JsonValue,
        questions: &[ClassifiedQuestion],
    ) -> Result<JsonValue> {
        let llm = self.llm.as_ref().ok_or_else(|| {
            Error::Config("learning path generation requires GROQ_API_KEY".to_string())
        })?;

        let metrics = MetricsAnalyzer::subject_metrics(questions);
        let difficulty = MetricsAnalyzer::difficulty_map(&metrics);

        let analysis = run_stage(
            llm.as_ref(),
            Stage::Analysis,
            PromptBuilder::analysis_prompt(student_info, &metrics, questions),
        )
        .await?;

        let learning_path = run_stage(
            llm.as_ref(),
            Stage::LearningPath,
            PromptBuilder::learning_path_prompt(student_info, &analysis, &difficulty),
        )
        .await?;
        let learning_path = SchemaRepairer::ensure_learning_path(learning_path);

        let roadmap = run_stage(
            llm.as_ref(),
            Stage::ExpertRoadmap,
            PromptBuilder::expert_roadmap_prompt(student_info, &learning_path),
        )
        .await?;
        let roadmap = SchemaRepairer::ensure_expert_roadmap(roadmap);

        let mut plan = merge_path_and_roadmap(learning_path, roadmap);

        if let Some(map) = plan.as_object_mut() {
            map.insert("student_info".to_string(), student_info.clone());
            if let Some(analysis_map) = analysis.as_object() {
                for (key, value) in analysis_map {
                    map.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }

        tracing::info!("learning path pipeline completed");
        Ok(plan)
    }
}

async fn run_stage(llm: &dyn LlmClient, stage: Stage, prompt: String) -> Result<JsonValue> {
    tracing::info!(stage = stage.label(), "requesting completion");
    let document = llm
        .complete(CompletionRequest::staged(stage, prompt))
        .await
        .map_err(|err| {
            tracing::error!(stage = stage.label(), error = %err, "pipeline stage failed");
            Error::Llm(err)
        })?;

    if !document.is_object() {
        tracing::error!(stage = stage.label(), "stage returned a non-object document");
        return Err(Error::Llm(LlmError::Parse(format!(
            "{} stage returned a non-object document",
            stage.label()
        ))));
    }
    Ok(document)
}

/// Attaches the roadmap under `expert_roadmap`, folds phase focus areas into
/// the matching skill tiers with set semantics, and unions transformed
/// expert guidance into `mentor_guidance`.
fn merge_path_and_roadmap(learning_path: JsonValue, roadmap: JsonValue) -> JsonValue {
    let mut plan = learning_path;
    let roadmap_map = match roadmap {
        JsonValue::Object(map) => map,
        _ => return plan,
    };

    if plan.get("skill_roadmap").map_or(false, JsonValue::is_object) {
        if let Some(phases) = roadmap_map
            .get("mastery_progression")
            .and_then(|v| v.as_array())
        {
            for phase in phases {
                let tier_key = match phase.get("phase").and_then(|p| p.as_str()) {
                    Some("beginner") => "foundational_skills",
                    Some("intermediate") => "intermediate_skills",
                    Some("advanced") | Some("expert") => "advanced_skills",
                    _ => continue,
                };
                if let Some(skill_map) =
                    plan.get_mut("skill_roadmap").and_then(|v| v.as_object_mut())
                {
                    let merged = union_strings(skill_map.get(tier_key), phase.get("focus_areas"));
                    skill_map.insert(tier_key.to_string(), json!(merged));
                }
            }
        }
    }

    if let Some(guidance_entries) = roadmap_map.get("expert_guidance").and_then(|v| v.as_array())
    {
        let mut mentor: Vec<JsonValue> = plan
            .get("mentor_guidance")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        for guidance in guidance_entries {
            let item = json!({
                "topic": guidance.get("topic").cloned().unwrap_or_else(|| json!("")),
                "advice": guidance.get("expert_insights").cloned().unwrap_or_else(|| json!("")),
                "common_pitfalls": guidance
                    .get("common_misconceptions")
                    .cloned()
                    .unwrap_or_else(|| json!([])),
                "success_strategies": guidance
                    .get("advanced_techniques")
                    .cloned()
                    .unwrap_or_else(|| json!([])),
            });
            if !mentor.contains(&item) {
                mentor.push(item);
            }
        }
        plan["mentor_guidance"] = json!(mentor);
    }

    plan["expert_roadmap"] = JsonValue::Object(roadmap_map);
    plan
}

fn union_strings(current: Option<&JsonValue>, additions: Option<&JsonValue>) -> Vec<String> {
    let mut merged = BTreeSet::new();
    for source in [current, additions].into_iter().flatten() {
        if let Some(items) = source.as_array() {
            for item in items {
                if let Some(text) = item.as_str() {
                    merged.insert(text.to_string());
                }
            }
        }
    }
    merged.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::MockLlmClient;
    use std::collections::HashSet;

    fn string_set(value: &JsonValue) -> HashSet<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    fn scripted_pipeline() -> PipelineService {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(3)
            .returning(|request| match request.stage {
                Stage::Analysis => Ok(json!({
                    "strengths": ["Math"],
                    "knowledge_gaps": ["Fractions"],
                    "recommended_topics": ["analysis topics must not win"]
                })),
                Stage::LearningPath => Ok(json!({
                    "recommended_topics": ["Fractions", "Decimals"],
                    "study_plan": [{"week": 1, "focus_areas": ["Math"]}],
                    "skill_roadmap": {"foundational_skills": ["Counting"]},
                    "mentor_guidance": [{"topic": "Practice", "advice": "Daily drills"}]
                })),
                Stage::ExpertRoadmap => Ok(json!({
                    "mastery_progression": [
                        {"phase": "beginner", "focus_areas": ["Counting", "Number sense"]},
                        {"phase": "expert", "focus_areas": ["Proof writing"]}
                    ],
                    "expert_guidance": [{
                        "topic": "Fractions",
                        "expert_insights": "Reason about ratios first",
                        "common_misconceptions": ["Bigger denominator means bigger value"],
                        "advanced_techniques": ["Benchmark comparison"]
                    }]
                })),
                Stage::TaskBatch => panic!("task stage does not belong to this pipeline"),
            });
        PipelineService::new(Some(Arc::new(mock)))
    }

    #[tokio::test]
    async fn merges_all_three_stages_into_one_document() {
        let pipeline = scripted_pipeline();
        let student_info = json!({"user_id": "u-1", "username": "amina"});

        let plan = pipeline.generate(&student_info, &[]).await.unwrap();

        // Whole repaired roadmap rides along.
        assert!(plan["expert_roadmap"]["long_term_vision"].is_object());
        assert!(plan["expert_roadmap"]["development_timeline"].is_object());

        // Tier lists behave as sets.
        assert_eq!(
            string_set(&plan["skill_roadmap"]["foundational_skills"]),
            HashSet::from(["Counting".to_string(), "Number sense".to_string()])
        );
        assert_eq!(
            string_set(&plan["skill_roadmap"]["advanced_skills"]),
            HashSet::from(["Proof writing".to_string()])
        );

        // Expert guidance lands transformed next to existing mentor entries.
        let mentor = plan["mentor_guidance"].as_array().unwrap();
        assert_eq!(mentor.len(), 2);
        assert_eq!(mentor[1]["topic"], "Fractions");
        assert_eq!(mentor[1]["advice"], "Reason about ratios first");
        assert_eq!(
            mentor[1]["success_strategies"],
            json!(["Benchmark comparison"])
        );

        // Echoed student info; analysis keys only fill gaps.
        assert_eq!(plan["student_info"]["username"], "amina");
        assert_eq!(plan["knowledge_gaps"], json!(["Fractions"]));
        assert_eq!(plan["recommended_topics"], json!(["Fractions", "Decimals"]));

        // Repair guarantees hold on the merged document.
        assert!(plan["estimated_completion_time"]["estimated_completion_date"].is_string());
        assert!(!plan["study_plan"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_failed_stage_terminates_the_request() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(2)
            .returning(|request| match request.stage {
                Stage::Analysis => Ok(json!({"strengths": []})),
                _ => Err(LlmError::Parse("completion content is not valid JSON".to_string())),
            });
        let pipeline = PipelineService::new(Some(Arc::new(mock)));

        let err = pipeline.generate(&json!({}), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn a_non_object_stage_document_terminates_the_request() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(json!(["not", "an", "object"])));
        let pipeline = PipelineService::new(Some(Arc::new(mock)));

        let err = pipeline.generate(&json!({}), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_credentials_reject_the_request() {
        let pipeline = PipelineService::new(None);
        let err = pipeline.generate(&json!({}), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn merge_without_skill_roadmap_adds_no_tier_lists() {
        let merged = merge_path_and_roadmap(
            json!({"recommended_topics": ["Fractions"]}),
            json!({"mastery_progression": [{"phase": "beginner", "focus_areas": ["Counting"]}]}),
        );
        assert!(merged.get("skill_roadmap").is_none());
        assert!(merged["expert_roadmap"]["mastery_progression"].is_array());
    }

    #[test]
    fn duplicate_guidance_entries_collapse_in_the_union() {
        let entry = json!({
            "topic": "Fractions",
            "expert_insights": "Reason about ratios first"
        });
        let merged = merge_path_and_roadmap(
            json!({}),
            json!({"expert_guidance": [entry.clone(), entry]}),
        );
        assert_eq!(merged["mentor_guidance"].as_array().unwrap().len(), 1);
    }
}
