//! Multi-rule stopping controller with PSER and rescue-cascade handling (§4.9).

use crate::convergence::{QuizType, RescueOutcome};

/// Global diminishing-returns threshold for rule 7; not part of the
/// per-quiz-type defaults table because the spec gives it as a single
/// constant rather than a per-type value.
pub const MIN_INFORMATION_GAIN: f64 = 0.05;

/// Default unused-item floor that triggers the rescue cascade (rule 5); the
/// spec names the rule but leaves the exact floor to the implementer, so this
/// mirrors the cascade's own default `min_threshold`.
pub const DEFAULT_POOL_MIN_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxQuestionsReached,
    MinimumNotReached,
    AllCellsMastered,
    PserSuggestsContinue,
    PrecisionAchieved,
    DifficultyRangeExhausted,
    NoInformativeItemsRemaining,
    LowInformationGain,
    CriteriaNotMet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopDecision {
    pub stop: bool,
    pub reason: StopReason,
}

impl StopDecision {
    fn stop(reason: StopReason) -> Self {
        Self { stop: true, reason }
    }

    fn continue_with(reason: StopReason) -> Self {
        Self {
            stop: false,
            reason,
        }
    }
}

/// Per-quiz-type thresholds (§4.9 table).
#[derive(Debug, Clone, Copy)]
pub struct StoppingDefaults {
    pub min_questions: u32,
    pub max_questions: u32,
    pub target_sem: f64,
    pub pser_threshold: f64,
    pub min_info_threshold: f64,
}

impl StoppingDefaults {
    pub fn for_quiz_type(quiz_type: QuizType) -> Self {
        match quiz_type {
            QuizType::Baseline => Self {
                min_questions: 10,
                max_questions: 50,
                target_sem: 0.25,
                pser_threshold: 0.03,
                min_info_threshold: 0.08,
            },
            QuizType::Regular => Self {
                min_questions: 5,
                max_questions: 30,
                target_sem: 0.30,
                pser_threshold: 0.05,
                min_info_threshold: 0.10,
            },
            QuizType::PracticeNew | QuizType::PracticeReview => Self {
                min_questions: 3,
                max_questions: 20,
                target_sem: 0.40,
                pser_threshold: 0.10,
                min_info_threshold: 0.15,
            },
        }
    }
}

/// Per-cell state the stopping controller needs; the engine is responsible
/// for populating `pool_exhausted`/`rescue_outcome` by running the rescue
/// cascade itself (it alone has the item-count queries the cascade needs).
#[derive(Debug, Clone, Copy)]
pub struct CellState {
    pub mastered: bool,
    pub sem: f64,
    /// Effective per-cell SEM target; equals the quiz-type default when
    /// convergence is disabled, or the quintile-adjusted target otherwise.
    pub sem_target: f64,
    /// Projected SEM improvement if one more item from this cell were asked.
    pub pser_projection: f64,
    pub pool_exhausted: bool,
    pub rescue_outcome: Option<RescueOutcome>,
    pub max_fisher_info_available: f64,
}

pub struct StoppingInputs<'a> {
    pub answered: u32,
    pub quiz_type: QuizType,
    pub convergence_enabled: bool,
    pub active_cells: &'a [CellState],
    pub avg_kl_info_last_5: Option<f64>,
}

/// Evaluates the eight-rule cascade in order, returning the first rule that fires.
pub fn evaluate_stopping(inputs: &StoppingInputs, defaults: &StoppingDefaults) -> StopDecision {
    if inputs.answered >= defaults.max_questions {
        return StopDecision::stop(StopReason::MaxQuestionsReached);
    }
    if inputs.answered < defaults.min_questions {
        return StopDecision::continue_with(StopReason::MinimumNotReached);
    }

    let active: Vec<&CellState> = inputs.active_cells.iter().filter(|c| !c.mastered).collect();
    if active.is_empty() {
        return StopDecision::stop(StopReason::AllCellsMastered);
    }

    let effective_target = if inputs.convergence_enabled {
        active.iter().map(|c| c.sem_target).sum::<f64>() / active.len() as f64
    } else {
        defaults.target_sem
    };
    let mean_sem = active.iter().map(|c| c.sem).sum::<f64>() / active.len() as f64;

    if mean_sem <= effective_target {
        if active
            .iter()
            .any(|c| c.pser_projection >= defaults.pser_threshold)
        {
            return StopDecision::continue_with(StopReason::PserSuggestsContinue);
        }
        return StopDecision::stop(StopReason::PrecisionAchieved);
    }

    if inputs.convergence_enabled {
        if let Some(exhausted) = active.iter().find(|c| c.pool_exhausted) {
            if matches!(exhausted.rescue_outcome, Some(RescueOutcome::Mastered)) && active.len() == 1 {
                return StopDecision::stop(StopReason::DifficultyRangeExhausted);
            }
        }
    }

    if active
        .iter()
        .all(|c| c.max_fisher_info_available < defaults.min_info_threshold)
    {
        return StopDecision::stop(StopReason::NoInformativeItemsRemaining);
    }

    if inputs.answered >= 10 {
        if let Some(avg_kl) = inputs.avg_kl_info_last_5 {
            if avg_kl < MIN_INFORMATION_GAIN {
                return StopDecision::stop(StopReason::LowInformationGain);
            }
        }
    }

    StopDecision::continue_with(StopReason::CriteriaNotMet)
}
