//! Completeness grading of a project stage.
//!
//! The grader's reply is free text; the first integer in it is the score.
//! Anything unusable falls back to the neutral score so the dialogue never
//! stalls on a bad grading call.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::dialogue::prompts::grading_prompt;
use crate::llm_client::{CompletionClient, CompletionOptions};

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("invalid score regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompletenessScore(u8);

impl CompletenessScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const NEUTRAL: CompletenessScore = CompletenessScore(5);

    /// Clamps into [1, 10].
    pub fn new(value: u64) -> Self {
        Self(value.clamp(Self::MIN as u64, Self::MAX as u64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Scores above the neutral point ask for one more probing question.
    pub fn wants_follow_up(self) -> bool {
        self.0 > Self::NEUTRAL.0
    }
}

/// First integer token of `response`, or the neutral score.
pub fn extract_score(response: &str) -> CompletenessScore {
    FIRST_INTEGER
        .find(response)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(CompletenessScore::new)
        .unwrap_or(CompletenessScore::NEUTRAL)
}

/// Grades how completely the stage dialogue answers its opening question.
pub async fn grade_answer(llm: &dyn CompletionClient, stage_dialogue: &str) -> CompletenessScore {
    match llm
        .complete(&grading_prompt(stage_dialogue), CompletionOptions::GRADING)
        .await
    {
        Ok(response) => {
            let score = extract_score(&response);
            debug!("Grader replied {response:?}, score {}", score.value());
            score
        }
        Err(e) => {
            warn!("Grading call failed, using neutral score: {e}");
            CompletenessScore::NEUTRAL
        }
    }
}
