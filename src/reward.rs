//! Multi-objective reward shaping for LinUCB updates (§4.5).

use crate::config::RewardWeights;
use crate::error::{CatError, CatResult};

/// Inputs needed to score a single response.
#[derive(Debug, Clone, Copy)]
pub struct RewardInputs {
    pub is_correct: bool,
    /// Per-cell SEM immediately before consuming this response.
    pub sem_before: f64,
    /// Per-cell SEM immediately after re-estimating ability.
    pub sem_after: f64,
    pub response_time_s: f64,
}

/// Binary mode collapses the reward to raw correctness; weighted mode blends
/// correctness, information gain, and speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardMode {
    Binary,
    Weighted,
}

fn correctness_component(is_correct: bool) -> f64 {
    if is_correct {
        1.0
    } else {
        0.0
    }
}

fn info_gain_component(sem_before: f64, sem_after: f64) -> f64 {
    if sem_before <= 0.0 || !sem_before.is_finite() {
        return 0.0;
    }
    let raw = (sem_before - sem_after) / sem_before * 2.0;
    raw.clamp(0.0, 1.0)
}

fn speed_component(response_time_s: f64) -> f64 {
    (1.0 - response_time_s / 120.0).max(0.0)
}

/// Computes the reward for a response. Binary mode returns raw correctness;
/// weighted mode blends correctness/info-gain/speed per `weights`, which must
/// already sum to 1 within tolerance (validated by [`RewardWeights::validate`]
/// at config load time, not re-checked per call).
pub fn compute_reward(inputs: &RewardInputs, mode: RewardMode, weights: &RewardWeights) -> CatResult<f64> {
    if !inputs.sem_before.is_finite() && inputs.sem_before != f64::INFINITY {
        return Err(CatError::invalid_input("sem_before is not a valid number"));
    }
    if !inputs.response_time_s.is_finite() || inputs.response_time_s < 0.0 {
        return Err(CatError::invalid_input(
            "response_time_s must be finite and non-negative",
        ));
    }

    let reward = match mode {
        RewardMode::Binary => correctness_component(inputs.is_correct),
        RewardMode::Weighted => {
            let correctness = correctness_component(inputs.is_correct);
            let info_gain = info_gain_component(inputs.sem_before, inputs.sem_after);
            let speed = speed_component(inputs.response_time_s);
            weights.correctness * correctness + weights.info_gain * info_gain + weights.speed * speed
        }
    };

    if !reward.is_finite() || !(0.0..=1.0).contains(&reward) {
        return Err(CatError::invalid_input(format!(
            "reward {reward} out of [0, 1] or non-finite"
        )));
    }
    Ok(reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> RewardWeights {
        RewardWeights::default()
    }

    #[test]
    fn binary_mode_ignores_sem_and_speed() {
        let inputs = RewardInputs {
            is_correct: true,
            sem_before: 0.5,
            sem_after: 0.3,
            response_time_s: 200.0,
        };
        let reward = compute_reward(&inputs, RewardMode::Binary, &weights()).unwrap();
        assert_eq!(reward, 1.0);
    }

    #[test]
    fn weighted_mode_blends_components() {
        let inputs = RewardInputs {
            is_correct: true,
            sem_before: 0.5,
            sem_after: 0.25,
            response_time_s: 30.0,
        };
        let reward = compute_reward(&inputs, RewardMode::Weighted, &weights()).unwrap();
        assert!(reward > 0.0 && reward <= 1.0);
    }

    #[test]
    fn zero_sem_before_yields_zero_info_gain() {
        assert_eq!(info_gain_component(0.0, 0.0), 0.0);
    }

    #[test]
    fn info_gain_clamped_to_unit_interval() {
        assert_eq!(info_gain_component(0.1, -1.0), 1.0);
        assert_eq!(info_gain_component(0.1, 1.0), 0.0);
    }

    #[test]
    fn speed_component_floors_at_zero() {
        assert_eq!(speed_component(500.0), 0.0);
    }

    #[test]
    fn speed_component_is_one_for_instant_response() {
        assert_eq!(speed_component(0.0), 1.0);
    }

    #[test]
    fn reward_is_always_in_unit_interval_for_valid_inputs() {
        for correct in [true, false] {
            for sem_after in [0.1, 0.5, 1.0] {
                let inputs = RewardInputs {
                    is_correct: correct,
                    sem_before: 0.6,
                    sem_after,
                    response_time_s: 45.0,
                };
                let reward = compute_reward(&inputs, RewardMode::Weighted, &weights()).unwrap();
                assert!((0.0..=1.0).contains(&reward));
            }
        }
    }

    #[test]
    fn rejects_negative_response_time() {
        let inputs = RewardInputs {
            is_correct: true,
            sem_before: 0.5,
            sem_after: 0.3,
            response_time_s: -1.0,
        };
        assert!(compute_reward(&inputs, RewardMode::Weighted, &weights()).is_err());
    }

    #[test]
    fn infinite_sem_before_is_accepted_and_zeroes_info_gain() {
        let inputs = RewardInputs {
            is_correct: false,
            sem_before: f64::INFINITY,
            sem_after: 0.5,
            response_time_s: 10.0,
        };
        let reward = compute_reward(&inputs, RewardMode::Weighted, &weights()).unwrap();
        assert!((0.0..=1.0).contains(&reward));
    }
}
