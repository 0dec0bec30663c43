//! Core data model (§3): items, cells, mastery, responses, sessions, and the
//! newtype identifiers that replace bare `String` keys elsewhere in this crate.

use crate::convergence::QuizType;
use crate::irt::IrtParameters;
use serde::{Deserialize, Serialize};

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_id!(LearnerId);
newtype_id!(QuizId);
newtype_id!(ItemId);
newtype_id!(CellId);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub cell_id: CellId,
    pub irt: IrtParameters,
    pub exposure_count: u32,
    pub max_exposure: u32,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub historical_correct_rate: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub aggregate_difficulty: f64,
    pub aggregate_discrimination: f64,
    pub item_count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MasteryStatus {
    InProgress,
    Mastered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerCellMastery {
    pub learner_id: LearnerId,
    pub cell_id: CellId,
    pub theta: f64,
    pub sem: f64,
    pub confidence: f64,
    pub response_count: u32,
    pub mastery_status: MasteryStatus,
    pub selection_count: u32,
    pub last_estimated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl LearnerCellMastery {
    pub fn new(learner_id: LearnerId, cell_id: CellId) -> Self {
        Self {
            learner_id,
            cell_id,
            theta: 0.0,
            sem: f64::INFINITY,
            confidence: 0.0,
            response_count: 0,
            mastery_status: MasteryStatus::InProgress,
            selection_count: 0,
            last_estimated_at: None,
        }
    }

    pub fn is_mastered(&self) -> bool {
        matches!(self.mastery_status, MasteryStatus::Mastered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub learner_id: LearnerId,
    pub quiz_id: QuizId,
    pub item_id: ItemId,
    pub option_id: String,
    pub is_correct: bool,
    pub response_time_ms: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicSelectionMode {
    System,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub learner_id: LearnerId,
    pub quiz_id: QuizId,
    pub max_questions: u32,
    pub exploration_parameter: f64,
    pub topic_selection_mode: TopicSelectionMode,
    pub selected_cells: Option<Vec<CellId>>,
    pub quiz_type: QuizType,
    pub status: QuizStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Snapshot of the context and scores used at selection time, the sole
/// durable link between a `select_next` call and the `process_answer` that
/// should update the same LinUCB model with the exact same context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub learner_id: LearnerId,
    pub quiz_id: QuizId,
    pub item_id: ItemId,
    pub context: [f64; crate::features::FEATURE_DIMENSION],
    pub final_ucb: f64,
    pub mu: f64,
    pub sigma: f64,
    pub theta_at_selection: f64,
    pub algorithm: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display_matches_inner_string() {
        let id = ItemId::from("item-1");
        assert_eq!(id.to_string(), "item-1");
    }

    #[test]
    fn fresh_mastery_has_infinite_sem_and_zero_confidence() {
        let mastery = LearnerCellMastery::new(LearnerId::from("l1"), CellId::from("c1"));
        assert!(mastery.sem.is_infinite());
        assert_eq!(mastery.confidence, 0.0);
        assert!(!mastery.is_mastered());
    }
}
