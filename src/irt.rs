//! Item Response Theory: probability, information, and ability estimation.

use crate::error::{CatError, CatResult};
use std::f64::consts::PI;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Tagged dispatch between the 2PL and 3PL logistic models (Design Note §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IrtModel {
    TwoPl,
    ThreePl,
}

/// Pre-calibrated item parameters. Construction validates the ranges and the
/// model/guessing-parameter invariant; a successfully constructed value is
/// always safe to evaluate.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct IrtParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub model: IrtModel,
}

impl IrtParameters {
    pub fn new(a: f64, b: f64, c: f64, model: IrtModel) -> CatResult<Self> {
        if !(0.5..=2.5).contains(&a) {
            return Err(CatError::invalid_input(format!(
                "discrimination a={a} outside [0.5, 2.5]"
            )));
        }
        if !(-4.0..=4.0).contains(&b) {
            return Err(CatError::invalid_input(format!(
                "difficulty b={b} outside [-4, 4]"
            )));
        }
        if !(0.0..=0.35).contains(&c) {
            return Err(CatError::invalid_input(format!(
                "guessing c={c} outside [0, 0.35]"
            )));
        }
        match model {
            IrtModel::TwoPl if c != 0.0 => {
                return Err(CatError::invalid_input("2PL item must have c = 0"));
            }
            IrtModel::ThreePl if c <= 0.01 => {
                return Err(CatError::invalid_input("3PL item must have c > 0.01"));
            }
            _ => {}
        }
        Ok(Self { a, b, c, model })
    }

    /// Effective guessing floor the unified probability/information call uses:
    /// values below 0.01 are treated as the 2PL specialization regardless of
    /// the stored model tag.
    fn effective_c(&self) -> f64 {
        if self.c < 0.01 {
            0.0
        } else {
            self.c
        }
    }
}

/// `P(theta; a, b, c) = c + (1-c) * sigmoid(a(theta-b))`.
pub fn probability(theta: f64, params: &IrtParameters) -> f64 {
    let c = params.effective_c();
    c + (1.0 - c) * sigmoid(params.a * (theta - params.b))
}

/// Fisher information at `theta`. 2PL: `a^2 P (1-P)`. 3PL: `(P')^2 / (P Q)`.
pub fn information(theta: f64, params: &IrtParameters) -> f64 {
    let c = params.effective_c();
    let p = probability(theta, params).clamp(1e-10, 1.0 - 1e-10);
    let q = 1.0 - p;

    if c == 0.0 {
        params.a.powi(2) * p * q
    } else {
        let p_prime = params.a * (p - c) * (1.0 - p) / (1.0 - c);
        (p_prime.powi(2)) / (p * q)
    }
}

/// KL information of response probability `p` relative to a uniform 0.5 prior,
/// clamped to `[0.01, 0.99]`, 0 on non-finite input.
pub fn kl_information(p: f64) -> f64 {
    let p = p.clamp(0.01, 0.99);
    let value = p * (p / 0.5).ln() + (1.0 - p) * ((1.0 - p) / 0.5).ln();
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Total Fisher information across a set of items at a given ability.
pub fn total_information(theta: f64, items: &[IrtParameters]) -> f64 {
    items.iter().map(|p| information(theta, p)).sum()
}

/// `1 / sqrt(total information)`, infinite when information is zero.
pub fn sem_from_information(info: f64) -> f64 {
    if info <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / info.sqrt()
    }
}

/// A single recorded response, paired with the parameters of the item it
/// answered — ability re-estimation needs each response's own item, not just
/// the current candidate's.
#[derive(Debug, Clone, Copy)]
pub struct ResponseRecord {
    pub item: IrtParameters,
    pub is_correct: bool,
}

/// Method used to produce an [`AbilityEstimate`], selected by response count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityMethod {
    Prior,
    Eap,
    Mle,
}

#[derive(Debug, Clone, Copy)]
pub struct AbilityEstimate {
    pub theta: f64,
    pub sem: f64,
    pub confidence: f64,
    pub method: AbilityMethod,
}

/// Dispatches to Prior / EAP / MLE by response count (§4.1 table).
pub fn estimate_ability(responses: &[ResponseRecord], prior_mean: f64) -> AbilityEstimate {
    match responses.len() {
        0..=2 => AbilityEstimate {
            theta: prior_mean,
            sem: f64::INFINITY,
            confidence: 0.0,
            method: AbilityMethod::Prior,
        },
        3..=4 => estimate_eap(responses, prior_mean),
        _ => estimate_mle(responses, prior_mean),
    }
}

fn gaussian_log_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    -0.5 * z * z - (sigma * (2.0 * PI).sqrt()).ln()
}

fn estimate_eap(responses: &[ResponseRecord], prior_mean: f64) -> AbilityEstimate {
    const N_POINTS: usize = 49;
    const LO: f64 = -4.0;
    const HI: f64 = 4.0;
    const SIGMA0: f64 = 1.0;

    let step = (HI - LO) / (N_POINTS - 1) as f64;
    let mut nodes = [0.0_f64; N_POINTS];
    let mut log_weights = [0.0_f64; N_POINTS];

    for (k, node) in nodes.iter_mut().enumerate() {
        let theta_k = LO + step * k as f64;
        *node = theta_k;

        let mut log_lik = 0.0;
        for r in responses {
            let p = probability(theta_k, &r.item).clamp(1e-4, 1.0 - 1e-4);
            log_lik += if r.is_correct { p.ln() } else { (1.0 - p).ln() };
        }
        log_weights[k] = log_lik + gaussian_log_pdf(theta_k, prior_mean, SIGMA0);
    }

    let max_log = log_weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for (k, &theta_k) in nodes.iter().enumerate() {
        let w = (log_weights[k] - max_log).exp();
        total_weight += w;
        weighted_sum += w * theta_k;
    }

    let theta = if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(-4.0, 4.0)
    } else {
        prior_mean
    };

    let items: Vec<IrtParameters> = responses.iter().map(|r| r.item).collect();
    let sem = sem_from_information(total_information(theta, &items));
    let confidence = (responses.len() as f64 / 10.0).min(1.0);

    AbilityEstimate {
        theta,
        sem,
        confidence,
        method: AbilityMethod::Eap,
    }
}

fn estimate_mle(responses: &[ResponseRecord], prior_mean: f64) -> AbilityEstimate {
    const MAX_ITERATIONS: usize = 50;
    const TOLERANCE: f64 = 0.001;
    const MIN_INFO: f64 = 1e-10;

    let items: Vec<IrtParameters> = responses.iter().map(|r| r.item).collect();
    let mut theta = prior_mean.clamp(-3.0, 3.0);

    for iter in 0..MAX_ITERATIONS {
        let mut derivative = 0.0;
        let mut info = 0.0;
        for r in responses {
            let p = probability(theta, &r.item).clamp(1e-4, 1.0 - 1e-4);
            let c = r.item.effective_c();
            let p_prime = if c == 0.0 {
                r.item.a * p * (1.0 - p)
            } else {
                r.item.a * (p - c) * (1.0 - p) / (1.0 - c)
            };
            let u = if r.is_correct { 1.0 } else { 0.0 };
            derivative += p_prime * (u - p) / (p * (1.0 - p));
            info += information(theta, &r.item);
        }

        if info.abs() < MIN_INFO {
            // Newton's update aborts cleanly; fall back to the previous iterate.
            break;
        }

        let step = (1.0 / ((iter + 1) as f64).sqrt()).min(1.0);
        let delta = derivative / info;
        let theta_new = (theta + step * delta).clamp(-3.0, 3.0);

        if (theta_new - theta).abs() < TOLERANCE {
            theta = theta_new;
            break;
        }
        theta = theta_new;
    }

    let theta = theta.clamp(-4.0, 4.0);
    let sem = sem_from_information(total_information(theta, &items));
    let confidence = (1.0 - sem / 2.0).max(0.0);

    AbilityEstimate {
        theta,
        sem,
        confidence,
        method: AbilityMethod::Mle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pl(a: f64, b: f64) -> IrtParameters {
        IrtParameters::new(a, b, 0.0, IrtModel::TwoPl).unwrap()
    }

    fn three_pl(a: f64, b: f64, c: f64) -> IrtParameters {
        IrtParameters::new(a, b, c, IrtModel::ThreePl).unwrap()
    }

    #[test]
    fn rejects_discrimination_out_of_range() {
        assert!(IrtParameters::new(0.1, 0.0, 0.0, IrtModel::TwoPl).is_err());
    }

    #[test]
    fn rejects_two_pl_with_nonzero_c() {
        assert!(IrtParameters::new(1.0, 0.0, 0.1, IrtModel::TwoPl).is_err());
    }

    #[test]
    fn rejects_three_pl_with_tiny_c() {
        assert!(IrtParameters::new(1.0, 0.0, 0.005, IrtModel::ThreePl).is_err());
    }

    #[test]
    fn matched_item_probability_is_half() {
        let item = two_pl(1.0, 0.0);
        let p = probability(0.0, &item);
        assert!((p - 0.5).abs() < 1e-5);
    }

    #[test]
    fn matched_item_information_is_quarter() {
        let item = two_pl(1.0, 0.0);
        let info = information(0.0, &item);
        assert!((info - 0.25).abs() < 1e-2);
    }

    #[test]
    fn matched_item_kl_is_zero() {
        let item = two_pl(1.0, 0.0);
        let p = probability(0.0, &item);
        assert!(kl_information(p).abs() < 1e-9);
    }

    #[test]
    fn guessing_floor_probability_approaches_c() {
        let item = three_pl(1.0, 0.0, 0.25);
        let p = probability(-10.0, &item);
        assert!((p - 0.25).abs() < 0.1);
    }

    #[test]
    fn probability_is_monotone_in_theta() {
        let item = two_pl(1.2, 0.0);
        let p_low = probability(-2.0, &item);
        let p_mid = probability(0.0, &item);
        let p_high = probability(2.0, &item);
        assert!(p_low < p_mid && p_mid < p_high);
    }

    #[test]
    fn three_pl_reduces_to_two_pl_at_zero_c() {
        let two = two_pl(1.3, 0.5);
        let three = IrtParameters {
            a: 1.3,
            b: 0.5,
            c: 0.0,
            model: IrtModel::TwoPl,
        };
        let p2 = probability(0.2, &two);
        let p3 = probability(0.2, &three);
        assert!((p2 - p3).abs() < 1e-5);
    }

    #[test]
    fn kl_information_symmetric_in_distance() {
        let a = kl_information(0.7);
        let b = kl_information(0.3);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn kl_information_nonnegative() {
        for p in [0.01, 0.1, 0.5, 0.9, 0.99] {
            assert!(kl_information(p) >= -1e-9);
        }
    }

    #[test]
    fn sem_is_infinite_when_information_zero() {
        assert_eq!(sem_from_information(0.0), f64::INFINITY);
    }

    #[test]
    fn prior_used_below_three_responses() {
        let est = estimate_ability(&[], 0.3);
        assert_eq!(est.method, AbilityMethod::Prior);
        assert_eq!(est.theta, 0.3);
        assert!(est.sem.is_infinite());
        assert_eq!(est.confidence, 0.0);
    }

    #[test]
    fn eap_used_for_three_to_four_responses() {
        let responses: Vec<ResponseRecord> = (0..3)
            .map(|_| ResponseRecord {
                item: two_pl(1.0, 0.0),
                is_correct: true,
            })
            .collect();
        let est = estimate_ability(&responses, 0.0);
        assert_eq!(est.method, AbilityMethod::Eap);
        assert!(est.theta >= -4.0 && est.theta <= 4.0);
        assert!(est.theta > 0.0); // all correct should pull ability above prior
    }

    #[test]
    fn mle_used_for_five_or_more_responses() {
        let responses: Vec<ResponseRecord> = (0..6)
            .map(|i| ResponseRecord {
                item: two_pl(1.0, 0.0),
                is_correct: i % 2 == 0,
            })
            .collect();
        let est = estimate_ability(&responses, 0.0);
        assert_eq!(est.method, AbilityMethod::Mle);
        assert!(est.theta >= -4.0 && est.theta <= 4.0);
    }

    #[test]
    fn mle_ability_always_finite() {
        let responses: Vec<ResponseRecord> = (0..10)
            .map(|_| ResponseRecord {
                item: two_pl(2.0, 3.9),
                is_correct: false,
            })
            .collect();
        let est = estimate_ability(&responses, 0.0);
        assert!(est.theta.is_finite());
        assert!(est.theta >= -4.0 && est.theta <= 4.0);
    }

    #[test]
    fn sem_decreases_as_responses_accumulate_at_fixed_theta() {
        let mut responses = Vec::new();
        let mut sems = Vec::new();
        for i in 0..8 {
            responses.push(ResponseRecord {
                item: two_pl(1.0, 0.0),
                is_correct: i % 2 == 0,
            });
            if responses.len() >= 5 {
                let est = estimate_ability(&responses, 0.0);
                sems.push(est.sem);
            }
        }
        for pair in sems.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9);
        }
    }
}
