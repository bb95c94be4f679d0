use crate::models::diagnostic::{
    ClassifiedQuestion, DiagnosticResponse, DifficultyTier, Subject, SubjectMetric,
    METRIC_SUBJECTS,
};
use std::collections::BTreeMap;

// Checked in declared order; the first subject with a matching keyword wins.
const SUBJECT_KEYWORDS: [(Subject, [&str; 5]); 4] = [
    (
        Subject::Math,
        ["math", "arithmetic", "algebra", "equation", "number"],
    ),
    (
        Subject::Reading,
        ["reading", "story", "passage", "text", "comprehension"],
    ),
    (
        Subject::Science,
        ["science", "scientific", "biology", "chemistry", "physics"],
    ),
    (
        Subject::Language,
        ["grammar", "sentence", "vocabulary", "spelling", "writing"],
    ),
];

pub struct MetricsAnalyzer;

impl MetricsAnalyzer {
    pub fn classify_subject(question: &str) -> Subject {
        let lowered = question.to_lowercase();
        for (subject, keywords) in SUBJECT_KEYWORDS.iter() {
            if keywords.iter().any(|keyword| lowered.contains(keyword)) {
                return *subject;
            }
        }
        Subject::General
    }

    pub fn classify_responses(responses: &[DiagnosticResponse]) -> Vec<ClassifiedQuestion> {
        responses
            .iter()
            .map(|response| ClassifiedQuestion {
                question_text: response.question.clone(),
                correct: response.is_correct(),
                subject: Self::classify_subject(&response.question),
            })
            .collect()
    }

    /// Per-subject answer counts and percentages over the four fixed
    /// subjects. Questions classified as `General` are not counted.
    pub fn subject_metrics(
        questions: &[ClassifiedQuestion],
    ) -> BTreeMap<Subject, SubjectMetric> {
        let mut counts: BTreeMap<Subject, (u32, u32)> = METRIC_SUBJECTS
            .iter()
            .map(|subject| (*subject, (0, 0)))
            .collect();

        for question in questions {
            if let Some((correct, total)) = counts.get_mut(&question.subject) {
                *total += 1;
                if question.correct {
                    *correct += 1;
                }
            }
        }

        counts
            .into_iter()
            .map(|(subject, (correct, total))| {
                let percentage = if total == 0 {
                    0.0
                } else {
                    round_one_decimal(100.0 * correct as f64 / total as f64)
                };
                (
                    subject,
                    SubjectMetric {
                        correct,
                        total,
                        percentage,
                    },
                )
            })
            .collect()
    }

    pub fn difficulty_map(
        metrics: &BTreeMap<Subject, SubjectMetric>,
    ) -> BTreeMap<Subject, DifficultyTier> {
        metrics
            .iter()
            .map(|(subject, metric)| (*subject, DifficultyTier::for_percentage(metric.percentage)))
            .collect()
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
