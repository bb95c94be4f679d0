use crate::models::diagnostic::METRIC_SUBJECTS;
use crate::utils::time;
use serde_json::{json, Map, Value as JsonValue};

pub struct SchemaRepairer;

impl SchemaRepairer {
    /// Additive repair of a learning-path stage document. Repair order is
    /// fixed (difficulty levels, completion time, study plan, recommended
    /// topics) so the default study plan only sees topics the model itself
    /// supplied.
    pub fn ensure_learning_path(document: JsonValue) -> JsonValue {
        let mut map = into_map(document);

        if !map.contains_key("difficulty_levels") {
            let mut levels = Map::new();
            for subject in METRIC_SUBJECTS {
                levels.insert(subject.as_str().to_string(), json!("Basic"));
            }
            map.insert("difficulty_levels".to_string(), JsonValue::Object(levels));
        }

        // A scalar here cannot hold the completion date, so it is the one
        // value repair is allowed to replace.
        let has_time_object = matches!(
            map.get("estimated_completion_time"),
            Some(JsonValue::Object(_))
        );
        if !has_time_object {
            map.insert(
                "estimated_completion_time".to_string(),
                json!({
                    "weeks": 4,
                    "estimated_completion_date": time::completion_date(4),
                }),
            );
        } else if let Some(JsonValue::Object(time_map)) = map.get_mut("estimated_completion_time")
        {
            if !time_map.contains_key("estimated_completion_date") {
                let weeks = time_map.get("weeks").and_then(JsonValue::as_i64).unwrap_or(4);
                time_map.insert(
                    "estimated_completion_date".to_string(),
                    json!(time::completion_date(weeks)),
                );
            }
        }

        if map.get("study_plan").map_or(true, is_falsy) {
            let focus_areas = map
                .get("weaknesses")
                .cloned()
                .unwrap_or_else(|| json!([METRIC_SUBJECTS[0].as_str()]));
            let topics: Vec<JsonValue> = map
                .get("recommended_topics")
                .and_then(|v| v.as_array())
                .map(|items| items.iter().take(2).cloned().collect())
                .unwrap_or_else(|| vec![json!("Fundamentals")]);

            map.insert(
                "study_plan".to_string(),
                json!([{
                    "week": 1,
                    "focus_areas": focus_areas,
                    "activities": [{
                        "subject": METRIC_SUBJECTS[0].as_str(),
                        "topics": topics,
                        "hours": 5,
                        "resources": ["online tutorials", "practice exercises"]
                    }]
                }]),
            );
        }

        if map.get("recommended_topics").map_or(true, is_falsy) {
            map.insert(
                "recommended_topics".to_string(),
                json!(["Fundamentals review", "Core skills practice"]),
            );
        }

        JsonValue::Object(map)
    }

    pub fn ensure_expert_roadmap(document: JsonValue) -> JsonValue {
        let mut map = into_map(document);

        if !map.contains_key("long_term_vision") {
            map.insert(
                "long_term_vision".to_string(),
                json!({
                    "educational_trajectory": "Progressive mastery from foundational to advanced skills",
                    "skill_evolution": "Iterative development with increasing complexity",
                    "potential_career_paths": ["Educator", "Specialist", "Researcher"],
                    "expert_level_outcomes": ["Independent problem solving", "Knowledge creation"]
                }),
            );
        }

        if map.get("mastery_progression").map_or(true, is_falsy) {
            map.insert(
                "mastery_progression".to_string(),
                json!([
                    {
                        "phase": "beginner",
                        "duration": "3-6 months",
                        "focus_areas": ["Fundamentals", "Core concepts"],
                        "success_indicators": ["Consistent application of basic principles"],
                        "common_challenges": ["Overwhelm with new information"],
                        "recommended_approaches": ["Structured practice", "Guided learning"]
                    },
                    {
                        "phase": "intermediate",
                        "duration": "6-12 months",
                        "focus_areas": ["Integration of concepts", "Problem solving"],
                        "success_indicators": ["Independent application of principles"],
                        "common_challenges": ["Plateaus in skill development"],
                        "recommended_approaches": ["Project-based learning", "Pattern recognition"]
                    }
                ]),
            );
        }

        if !map.contains_key("development_timeline") {
            map.insert(
                "development_timeline".to_string(),
                json!({
                    "short_term_goals": ["Master fundamental concepts", "Develop consistent study habits"],
                    "medium_term_goals": ["Independently solve complex problems", "Teach basics to others"],
                    "long_term_goals": ["Contribute original insights", "Achieve expert-level proficiency"],
                    "milestone_achievements": ["Complete capstone projects", "Earn recognized certifications"]
                }),
            );
        }

        JsonValue::Object(map)
    }
}

fn into_map(document: JsonValue) -> Map<String, JsonValue> {
    match document {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    }
}

fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn completion_date_of(document: &JsonValue) -> &str {
        document["estimated_completion_time"]["estimated_completion_date"]
            .as_str()
            .unwrap()
    }

    #[test]
    fn empty_document_gains_every_required_key() {
        let repaired = SchemaRepairer::ensure_learning_path(json!({}));

        let levels = repaired["difficulty_levels"].as_object().unwrap();
        assert_eq!(levels.len(), 4);
        assert!(levels.values().all(|v| v == "Basic"));

        assert_eq!(repaired["estimated_completion_time"]["weeks"], 4);
        assert!(NaiveDate::parse_from_str(completion_date_of(&repaired), "%Y-%m-%d").is_ok());

        let study_plan = repaired["study_plan"].as_array().unwrap();
        assert_eq!(study_plan.len(), 1);
        assert_eq!(study_plan[0]["week"], 1);
        assert_eq!(study_plan[0]["focus_areas"], json!(["Math"]));
        assert_eq!(study_plan[0]["activities"][0]["topics"], json!(["Fundamentals"]));

        assert_eq!(
            repaired["recommended_topics"],
            json!(["Fundamentals review", "Core skills practice"])
        );
    }

    #[test]
    fn completion_date_is_computed_from_supplied_weeks() {
        let repaired = SchemaRepairer::ensure_learning_path(json!({
            "estimated_completion_time": {"weeks": 8}
        }));
        assert_eq!(repaired["estimated_completion_time"]["weeks"], 8);
        assert_eq!(completion_date_of(&repaired), time::completion_date(8));
    }

    #[test]
    fn non_object_completion_time_is_replaced_by_the_default_block() {
        let repaired = SchemaRepairer::ensure_learning_path(json!({
            "estimated_completion_time": "8 weeks"
        }));
        assert_eq!(repaired["estimated_completion_time"]["weeks"], 4);
        assert!(!completion_date_of(&repaired).is_empty());
    }

    #[test]
    fn default_study_plan_uses_the_documents_own_weaknesses_and_topics() {
        let repaired = SchemaRepairer::ensure_learning_path(json!({
            "weaknesses": ["Reading", "Science"],
            "recommended_topics": ["Fractions", "Decimals", "Ratios"],
            "study_plan": []
        }));
        let week = &repaired["study_plan"][0];
        assert_eq!(week["focus_areas"], json!(["Reading", "Science"]));
        assert_eq!(
            week["activities"][0]["topics"],
            json!(["Fractions", "Decimals"])
        );
        // Supplied topics survive untouched.
        assert_eq!(
            repaired["recommended_topics"],
            json!(["Fractions", "Decimals", "Ratios"])
        );
    }

    #[test]
    fn repair_is_additive_and_never_overwrites_supplied_values() {
        let supplied = json!({
            "difficulty_levels": {"Math": "Advanced"},
            "recommended_topics": ["Fractions"],
            "study_plan": [{"week": 1, "focus_areas": ["Math"]}],
            "custom_notes": "keep me"
        });
        let repaired = SchemaRepairer::ensure_learning_path(supplied.clone());

        assert_eq!(repaired["difficulty_levels"], supplied["difficulty_levels"]);
        assert_eq!(repaired["recommended_topics"], supplied["recommended_topics"]);
        assert_eq!(repaired["study_plan"], supplied["study_plan"]);
        assert_eq!(repaired["custom_notes"], "keep me");
    }

    #[test]
    fn learning_path_repair_is_idempotent() {
        let once = SchemaRepairer::ensure_learning_path(json!({
            "recommended_topics": ["Fractions"]
        }));
        let twice = SchemaRepairer::ensure_learning_path(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_roadmap_gains_the_canned_sections() {
        let repaired = SchemaRepairer::ensure_expert_roadmap(json!({}));

        assert!(repaired["long_term_vision"]["educational_trajectory"].is_string());
        let phases = repaired["mastery_progression"].as_array().unwrap();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0]["phase"], "beginner");
        assert_eq!(phases[1]["phase"], "intermediate");
        assert!(repaired["development_timeline"]["long_term_goals"].is_array());
    }

    #[test]
    fn supplied_roadmap_sections_are_kept() {
        let supplied = json!({
            "mastery_progression": [{"phase": "expert", "focus_areas": ["Proof writing"]}],
            "development_timeline": {"short_term_goals": ["ship it"]}
        });
        let repaired = SchemaRepairer::ensure_expert_roadmap(supplied.clone());
        assert_eq!(repaired["mastery_progression"], supplied["mastery_progression"]);
        assert_eq!(
            repaired["development_timeline"],
            supplied["development_timeline"]
        );
    }

    #[test]
    fn roadmap_repair_is_idempotent() {
        let once = SchemaRepairer::ensure_expert_roadmap(json!({}));
        let twice = SchemaRepairer::ensure_expert_roadmap(once.clone());
        assert_eq!(once, twice);
    }
}
