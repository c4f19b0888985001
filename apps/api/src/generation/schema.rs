//! Structural rules for job postings and generated question sets.

use serde::{Deserialize, Serialize};

use crate::errors::FieldError;

pub const QUESTIONS_PER_BATCH: usize = 5;
pub const MIN_QUESTION_CHARS: usize = 20;
pub const MAX_QUESTION_CHARS: usize = 300;
pub const MIN_POSTING_CHARS: usize = 100;
pub const MAX_POSTING_CHARS: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A generated interview question, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Question {
    /// Wraps raw model output with the default category and difficulty.
    pub fn general(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: Some("general".to_string()),
            difficulty: Some(Difficulty::Medium),
        }
    }
}

/// Checks the trimmed posting length. Returns the trimmed text on success.
pub fn validate_job_posting(raw: &str) -> Result<&str, FieldError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < MIN_POSTING_CHARS {
        return Err(FieldError::new(
            "jobPosting",
            format!("Job posting must be at least {MIN_POSTING_CHARS} characters long"),
        ));
    }
    if len > MAX_POSTING_CHARS {
        return Err(FieldError::new(
            "jobPosting",
            "Job posting cannot exceed 10,000 characters",
        ));
    }
    Ok(trimmed)
}

/// Local safety net over the model's own schema enforcement: exactly five
/// questions, each 20–300 characters after trimming. Collects every violation.
pub fn validate_questions(questions: &[Question]) -> Result<(), Vec<FieldError>> {
    let mut issues = Vec::new();

    if questions.len() != QUESTIONS_PER_BATCH {
        issues.push(FieldError::new(
            "questions",
            format!(
                "Must generate exactly {QUESTIONS_PER_BATCH} questions, got {}",
                questions.len()
            ),
        ));
    }

    for (i, question) in questions.iter().enumerate() {
        let len = question.text.trim().chars().count();
        if len < MIN_QUESTION_CHARS {
            issues.push(FieldError::new(
                format!("questions.{i}"),
                format!("Question must be at least {MIN_QUESTION_CHARS} characters long"),
            ));
        } else if len > MAX_QUESTION_CHARS {
            issues.push(FieldError::new(
                format!("questions.{i}"),
                format!("Question cannot exceed {MAX_QUESTION_CHARS} characters"),
            ));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
