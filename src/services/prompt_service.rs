use crate::models::diagnostic::{ClassifiedQuestion, DifficultyTier, Subject, SubjectMetric};
use crate::models::learning_path::{StudentProfile, TopicContext};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub const TASK_SYSTEM_PROMPT: &str =
    "You are an expert educational task generator. Create engaging, grade-appropriate tasks.";

const ANALYSIS_RESPONSE_SHAPE: &str = r#"{
    "strengths": ["list of subjects or topics the student excels at"],
    "weaknesses": ["list of subjects or topics the student struggles with"],
    "knowledge_gaps": ["specific areas where remediation is needed"],
    "misconceptions": ["identified misconceptions from incorrect answers"],
    "learning_style_insights": "observations about effective learning approaches for this student",
    "cognitive_patterns": ["identified patterns in how the student approaches problems"],
    "error_analysis": [
        {
            "subject": "subject name",
            "pattern": "description of error pattern",
            "remediation": "specific remediation approach"
        }
    ],
    "perceived_learning_style": "most likely learning style from [\"Visual\", \"Auditory\", \"Reading/Writing\", \"Kinesthetic\"]",
    "motivation_analysis": "analysis of intrinsic vs extrinsic motivation factors"
}"#;

const LEARNING_PATH_RESPONSE_SHAPE: &str = r#"{
    "difficulty_levels": {"subject": "level"},
    "recommended_topics": ["specific topics to focus on"],
    "prioritized_subjects": ["subjects that need immediate attention"],
    "estimated_completion_time": {"weeks": number, "estimated_completion_date": "YYYY-MM-DD"},
    "recommended_resources": [
        {
            "name": "resource name",
            "type": "book|video|interactive|course",
            "difficulty": "Basic|Intermediate|Advanced",
            "subjects": ["applicable subjects"],
            "alignment": "how this matches student's learning style",
            "url": "optional URL if applicable"
        }
    ],
    "study_plan": [
        {
            "week": number,
            "focus_areas": ["main subjects to focus on"],
            "activities": [
                {
                    "subject": "subject name",
                    "topics": ["specific topics"],
                    "hours": number,
                    "resources": ["specific resources"],
                    "practice_focus": "specific skills to practice"
                }
            ],
            "review_strategies": ["spaced repetition", "active recall"],
            "milestone_check": "mini-assessment guidance"
        }
    ],
    "milestones": [
        {
            "title": "milestone description",
            "subjects": ["relevant subjects"],
            "topics": ["specific topics"],
            "target_date": "YYYY-MM-DD",
            "assessment_method": "how to verify achievement",
            "prerequisites": ["concepts that must be mastered first"]
        }
    ],
    "mentor_guidance": [
        {
            "topic": "guidance topic",
            "advice": "specific mentor advice",
            "common_pitfalls": ["typical challenges to avoid"],
            "success_strategies": ["approaches that work well"]
        }
    ],
    "skill_roadmap": {
        "foundational_skills": ["basic skills that need mastery"],
        "intermediate_skills": ["skills to develop after basics"],
        "advanced_skills": ["expert-level skills for long-term development"]
    },
    "adaptive_recommendations": "personalized advice for this specific student",
    "metacognitive_strategies": ["strategies to improve learning effectiveness"],
    "growth_mindset_development": "approaches to build resilience and perseverance"
}"#;

const EXPERT_ROADMAP_RESPONSE_SHAPE: &str = r#"{
    "long_term_vision": {
        "educational_trajectory": "path from current level to mastery",
        "skill_evolution": "how skills will progress over time",
        "potential_career_paths": ["career options this education enables"],
        "expert_level_outcomes": ["what mastery looks like in these subjects"]
    },
    "skill_interconnections": [
        {
            "primary_skill": "skill name",
            "connected_skills": ["related skills"],
            "synergy_explanation": "how these skills reinforce each other"
        }
    ],
    "expert_guidance": [
        {
            "topic": "guidance area",
            "common_misconceptions": ["misconceptions to overcome"],
            "expert_insights": "how experts approach this differently",
            "advanced_techniques": ["techniques that accelerate mastery"]
        }
    ],
    "mastery_progression": [
        {
            "phase": "beginner|intermediate|advanced|expert",
            "duration": "estimated time in this phase",
            "focus_areas": ["key areas of focus"],
            "success_indicators": ["how to know you're ready to advance"],
            "common_challenges": ["typical hurdles at this stage"],
            "recommended_approaches": ["best methods for this phase"]
        }
    ],
    "real_world_applications": [
        {
            "skill_set": ["related skills"],
            "applications": ["real-world uses"],
            "project_ideas": ["projects to build these skills"],
            "industry_relevance": "how these skills apply professionally"
        }
    ],
    "learning_community": {
        "recommended_communities": ["forums, groups or communities"],
        "networking_opportunities": ["ways to connect with peers and experts"],
        "collaborative_projects": ["ideas for group learning"]
    },
    "advanced_resources": [
        {
            "name": "resource name",
            "type": "book|course|mentor|community",
            "difficulty": "intermediate|advanced|expert",
            "topic_coverage": ["specific topics covered"],
            "special_value": "what makes this resource especially valuable"
        }
    ],
    "development_timeline": {
        "short_term_goals": ["3-month objectives"],
        "medium_term_goals": ["1-year objectives"],
        "long_term_goals": ["3-5 year objectives"],
        "milestone_achievements": ["significant achievements to target"]
    },
    "mastery_principles": ["key principles that enable expertise development"],
    "expert_study_techniques": ["advanced techniques for optimal learning"]
}"#;

const TASK_RESPONSE_SHAPE: &str = r#"{
    "tasks": [
        {
            "title": "Clear and specific task title",
            "description": "Detailed description of what the student needs to do",
            "task_type": "quiz",
            "difficulty": "medium",
            "estimated_time": "30 minutes",
            "points": 100,
            "content": {
                "instructions": "Step-by-step instructions",
                "questions": [
                    {
                        "question": "Specific question text",
                        "type": "multiple_choice",
                        "options": ["Option A", "Option B", "Option C", "Option D"],
                        "correct_answer": 0
                    }
                ]
            }
        }
    ]
}"#;

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn analysis_prompt(
        student_info: &JsonValue,
        metrics: &BTreeMap<Subject, SubjectMetric>,
        questions: &[ClassifiedQuestion],
    ) -> String {
        format!(
            r#"You are an expert educational AI that analyzes student performance data and creates personalized learning paths.

# Student Information
{student_info}

# Performance Metrics
{metrics}

# Detailed Question Responses
{responses}

Based on this information, analyze the student's performance across subjects, identify patterns,
misconceptions, strengths, and weaknesses.

Return a detailed analysis in JSON format with the following structure:
{shape}"#,
            student_info = pretty(student_info),
            metrics = pretty_serialize(metrics),
            responses = pretty_serialize(&questions),
            shape = ANALYSIS_RESPONSE_SHAPE,
        )
    }

    pub fn learning_path_prompt(
        student_info: &JsonValue,
        analysis: &JsonValue,
        difficulty: &BTreeMap<Subject, DifficultyTier>,
    ) -> String {
        format!(
            r#"You are an expert educational AI that creates personalized learning paths.

# Student Information
{student_info}

# Performance Analysis
{analysis}

# Current Difficulty Mapping
{difficulty}

Based on this analysis, create a comprehensive, personalized learning path for this student,
acting as both a mentor and expert educator. Consider the student's strengths, weaknesses,
learning style, cognitive patterns, motivation factors, and long-term educational goals.

Return a detailed learning path in JSON format with the following structure:
{shape}"#,
            student_info = pretty(student_info),
            analysis = pretty(analysis),
            difficulty = pretty_serialize(difficulty),
            shape = LEARNING_PATH_RESPONSE_SHAPE,
        )
    }

    pub fn expert_roadmap_prompt(student_info: &JsonValue, learning_path: &JsonValue) -> String {
        format!(
            r#"You are a master educator with decades of experience in personalized learning design.

# Student Information
{student_info}

# Current Learning Path
{learning_path}

Based on this student's profile and learning path, create a comprehensive expert roadmap
that extends beyond basic learning topics to include expert-level guidance, career path integration,
and long-term skill development. Act as a mentor who can see the big picture of how this
student's current learning connects to future success.

Return an expert roadmap in JSON format with the following structure:
{shape}"#,
            student_info = pretty(student_info),
            learning_path = pretty(learning_path),
            shape = EXPERT_ROADMAP_RESPONSE_SHAPE,
        )
    }

    pub fn topic_task_prompt(topic: &TopicContext, student: &StudentProfile) -> String {
        format!(
            r#"As an educational expert, create 3 personalized learning tasks based on this context:

TOPIC INFORMATION:
Title: {title}
Description: {description}
Objectives: {objectives}

STUDENT PROFILE:
Grade Level: {grade_level}
Learning Style: {learning_style}
Strengths: {strengths}
Areas for Improvement: {improvements}

REQUIREMENTS:
- Create exactly 3 tasks
- Mix of different task types (quiz, assignment, interactive)
- Appropriate difficulty level
- Clear instructions
- Engaging content

RESPONSE FORMAT:
{shape}"#,
            title = topic.title,
            description = topic.description,
            objectives = topic.objectives.join(", "),
            grade_level = student.grade_level,
            learning_style = student.learning_style,
            strengths = student.strengths.join(", "),
            improvements = student.areas_for_improvement.join(", "),
            shape = TASK_RESPONSE_SHAPE,
        )
    }
}

fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn pretty_serialize<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
