//! Blends LinUCB and IRT-based UCB scores, weighted by session progress (§4.6).

use crate::config::HybridWeights;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// LinUCB weight as a function of questions answered so far in the session
/// (`k`) and the model's current predictive uncertainty (`sigma`, used only
/// in the post-warm-up decay).
pub fn linucb_weight_for_progress(k: u32, sigma: f64, weights: &HybridWeights) -> f64 {
    if k < 7 {
        let t = k as f64 / 7.0;
        lerp(weights.w_min, weights.w_mid, t)
    } else if k < 26 {
        let t = (k - 7) as f64 / (26 - 7) as f64;
        lerp(weights.w_mid, weights.w_high, t)
    } else {
        weights.w_high + (weights.w_max - weights.w_high) * (-sigma / 2.0).exp()
    }
}

/// `final = w_L * sigmoid(UCB_L) + w_I * sigmoid(UCB_I / 2)`.
pub fn hybrid_score(
    ucb_linucb: f64,
    ucb_irt: f64,
    k: u32,
    sigma: f64,
    weights: &HybridWeights,
) -> f64 {
    let w_linucb = linucb_weight_for_progress(k, sigma, weights);
    let w_irt = 1.0 - w_linucb;
    w_linucb * sigmoid(ucb_linucb) + w_irt * sigmoid(ucb_irt / 2.0)
}
