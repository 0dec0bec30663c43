//! Distribution-aware convergence: quintile SEM targets, rescue cascade, and
//! deterministic user-bucketing for staged rollout (§4.10).

use crate::config::DistributionAwareConvergenceConfig;

/// The five ability bands convergence targets are tuned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quintile {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
}

impl Quintile {
    fn index(self) -> usize {
        match self {
            Quintile::Q1 => 0,
            Quintile::Q2 => 1,
            Quintile::Q3 => 2,
            Quintile::Q4 => 3,
            Quintile::Q5 => 4,
        }
    }

    /// Fixed half-width of the "optimal difficulty band" for this quintile;
    /// unlike the SEM target, this is not environment-overridable.
    pub fn base_range_width(self) -> f64 {
        match self {
            Quintile::Q1 => 0.6,
            Quintile::Q2 => 0.5,
            Quintile::Q3 => 0.4,
            Quintile::Q4 => 0.5,
            Quintile::Q5 => 0.6,
        }
    }
}

/// Quintile bucket for an ability estimate (Q1 `< -1.0`, ..., Q5 `> 1.0`).
pub fn quintile_for_theta(theta: f64) -> Quintile {
    if theta < -1.0 {
        Quintile::Q1
    } else if theta < -0.3 {
        Quintile::Q2
    } else if theta <= 0.3 {
        Quintile::Q3
    } else if theta <= 1.0 {
        Quintile::Q4
    } else {
        Quintile::Q5
    }
}

/// Quiz type groupings used by both the stopping controller and convergence
/// tightening/loosening (`practice-new`/`practice-review` share one rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuizType {
    Baseline,
    Regular,
    PracticeNew,
    PracticeReview,
}

impl QuizType {
    pub fn is_practice(self) -> bool {
        matches!(self, QuizType::PracticeNew | QuizType::PracticeReview)
    }
}

/// SEM target for a learner's current ability and quiz type, after the
/// per-type tightening/loosening and the floor from `config`.
pub fn effective_sem_target(
    theta: f64,
    quiz_type: QuizType,
    config: &DistributionAwareConvergenceConfig,
) -> f64 {
    let quintile = quintile_for_theta(theta);
    let base = config.sem_targets()[quintile.index()];

    let adjusted = match quiz_type {
        QuizType::Baseline => base - 0.05,
        QuizType::Regular => base,
        _ if quiz_type.is_practice() => base + 0.05,
        _ => base,
    };

    adjusted.max(DistributionAwareConvergenceConfig::SEM_FLOOR)
}

/// Outcome of running the rescue cascade against a pool-exhausted cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RescueOutcome {
    /// Keep sampling the cell with a widened band and (possibly) relaxed SEM target.
    Widened { range_width: f64, sem_target: f64 },
    /// No widening recovers enough items; mark the cell mastered and stop sampling it.
    Mastered,
}

/// Runs the three-step widen-then-relax cascade (§4.10). `item_count_in_band`
/// counts unused items within `theta +/- half_width`; `total_items_in_cell`
/// is the cell's full unused-item count, independent of difficulty band.
pub fn rescue_cascade(
    base_range_width: f64,
    base_sem_target: f64,
    min_threshold: u32,
    total_items_in_cell: u32,
    item_count_in_band: impl Fn(f64) -> u32,
) -> RescueOutcome {
    let widen_1 = base_range_width * 1.5;
    if item_count_in_band(widen_1) >= min_threshold {
        return RescueOutcome::Widened {
            range_width: widen_1,
            sem_target: base_sem_target,
        };
    }

    let widen_2 = base_range_width * 2.0;
    if item_count_in_band(widen_2) >= min_threshold {
        return RescueOutcome::Widened {
            range_width: widen_2,
            sem_target: base_sem_target,
        };
    }

    if total_items_in_cell >= min_threshold {
        RescueOutcome::Widened {
            range_width: widen_2,
            sem_target: base_sem_target + 0.10,
        }
    } else {
        RescueOutcome::Mastered
    }
}

/// djb2 string hash, used for deterministic traffic bucketing.
pub fn djb2_hash(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as u64);
    }
    hash
}

/// True if `learner_id` falls within the first `traffic_allocation` percent
/// of buckets (`[0, 100)`), deterministically across machines and runs.
pub fn in_traffic_bucket(learner_id: &str, traffic_allocation: f64) -> bool {
    let bucket = djb2_hash(learner_id) % 100;
    (bucket as f64) < traffic_allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quintile_boundaries_match_table() {
        assert_eq!(quintile_for_theta(-2.0), Quintile::Q1);
        assert_eq!(quintile_for_theta(-0.5), Quintile::Q2);
        assert_eq!(quintile_for_theta(0.0), Quintile::Q3);
        assert_eq!(quintile_for_theta(0.5), Quintile::Q4);
        assert_eq!(quintile_for_theta(2.0), Quintile::Q5);
    }

    #[test]
    fn baseline_tightens_target() {
        let config = DistributionAwareConvergenceConfig::default();
        let regular = effective_sem_target(0.0, QuizType::Regular, &config);
        let baseline = effective_sem_target(0.0, QuizType::Baseline, &config);
        assert!(baseline < regular);
    }

    #[test]
    fn practice_loosens_target() {
        let config = DistributionAwareConvergenceConfig::default();
        let regular = effective_sem_target(0.0, QuizType::Regular, &config);
        let practice = effective_sem_target(0.0, QuizType::PracticeNew, &config);
        assert!(practice > regular);
    }

    #[test]
    fn target_never_drops_below_floor() {
        let mut config = DistributionAwareConvergenceConfig::default();
        config.sem_q3 = 0.21;
        let target = effective_sem_target(0.0, QuizType::Baseline, &config);
        assert!(target >= DistributionAwareConvergenceConfig::SEM_FLOOR);
    }

    #[test]
    fn rescue_cascade_widens_once_when_first_step_suffices() {
        let outcome = rescue_cascade(0.5, 0.30, 5, 50, |half_width| {
            if half_width >= 0.75 {
                10
            } else {
                0
            }
        });
        assert_eq!(
            outcome,
            RescueOutcome::Widened {
                range_width: 0.75,
                sem_target: 0.30
            }
        );
    }

    #[test]
    fn rescue_cascade_widens_twice_when_needed() {
        let outcome = rescue_cascade(0.5, 0.30, 5, 50, |half_width| {
            if half_width >= 1.0 {
                10
            } else {
                0
            }
        });
        assert_eq!(
            outcome,
            RescueOutcome::Widened {
                range_width: 1.0,
                sem_target: 0.30
            }
        );
    }

    #[test]
    fn rescue_cascade_relaxes_sem_when_widening_fails_but_cell_has_items() {
        let outcome = rescue_cascade(0.5, 0.30, 5, 8, |_| 0);
        assert_eq!(
            outcome,
            RescueOutcome::Widened {
                range_width: 1.0,
                sem_target: 0.40
            }
        );
    }

    #[test]
    fn rescue_cascade_masters_cell_as_last_resort() {
        let outcome = rescue_cascade(0.5, 0.30, 5, 2, |_| 0);
        assert_eq!(outcome, RescueOutcome::Mastered);
    }

    #[test]
    fn djb2_hash_is_deterministic() {
        assert_eq!(djb2_hash("learner-42"), djb2_hash("learner-42"));
        assert_ne!(djb2_hash("learner-42"), djb2_hash("learner-43"));
    }

    #[test]
    fn full_traffic_allocation_admits_everyone() {
        for id in ["a", "b", "some-long-learner-id"] {
            assert!(in_traffic_bucket(id, 100.0));
        }
    }

    #[test]
    fn zero_traffic_allocation_admits_no_one() {
        for id in ["a", "b", "some-long-learner-id"] {
            assert!(!in_traffic_bucket(id, 0.0));
        }
    }
}
