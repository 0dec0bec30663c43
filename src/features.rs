//! 15-dimensional canonical context vector for LinUCB (§4.4).
//!
//! Field order is load-bearing: weight vectors and serialized models are
//! indexed positionally, never by name.

use crate::irt::{information, probability, IrtParameters};

pub const FEATURE_DIMENSION: usize = 15;

/// Raw inputs the feature builder needs, gathered by the engine from the
/// learner's mastery record, the candidate item, and the current session.
#[derive(Debug, Clone, Copy)]
pub struct FeatureInputs {
    pub theta: f64,
    pub sem: f64,
    pub confidence: f64,
    pub response_count: u32,
    pub recent_accuracy: Option<f64>,
    pub questions_in_session: u32,
    pub item: IrtParameters,
    pub exposure_count: u32,
    pub max_exposure: u32,
    pub item_historical_correct_rate: f64,
    pub topic_mastery: f64,
}

/// The canonical 15-D context vector, indexed `0..15` per §4.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_DIMENSION]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

fn clamp01_warn(name: &'static str, value: f64) -> f64 {
    if !(0.0..=1.0).contains(&value) {
        tracing::warn!(feature = name, value, "clamping feature to [0, 1]");
    }
    if !value.is_finite() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Builds the canonical feature vector from raw inputs, clamping every
/// component to `[0, 1]` (warning when a clamp actually changed the value).
pub fn build_features(inputs: &FeatureInputs) -> FeatureVector {
    let theta = inputs.theta;
    let item = &inputs.item;

    let user_theta_norm = (theta + 4.0) / 8.0;
    let user_sem_norm = (inputs.sem / 2.0).min(1.0);
    let user_confidence = inputs.confidence;
    let user_experience = (inputs.response_count as f64 / 50.0).min(1.0);
    let user_recent_accuracy = inputs.recent_accuracy.unwrap_or(0.5);
    let user_session_progress = (inputs.questions_in_session as f64 / 30.0).min(1.0);

    let item_difficulty_norm = (item.b + 4.0) / 8.0;
    let item_discrimination_norm = (item.a - 0.5) / 2.0;
    let item_guessing_norm = item.c / 0.35;
    let item_exposure_rate = if inputs.max_exposure == 0 {
        0.0
    } else {
        (inputs.exposure_count as f64 / inputs.max_exposure as f64).min(1.0)
    };
    let item_historical_correct_rate = inputs.item_historical_correct_rate;

    let interaction_distance = ((theta - item.b).abs() / 8.0).min(1.0);
    let interaction_irt_prob = probability(theta, item);
    let interaction_fisher_info = (information(theta, item) / 2.0).min(1.0);
    let interaction_topic_weakness = 1.0 - inputs.topic_mastery;

    let raw = [
        user_theta_norm,
        user_sem_norm,
        user_confidence,
        user_experience,
        user_recent_accuracy,
        user_session_progress,
        item_difficulty_norm,
        item_discrimination_norm,
        item_guessing_norm,
        item_exposure_rate,
        item_historical_correct_rate,
        interaction_distance,
        interaction_irt_prob,
        interaction_fisher_info,
        interaction_topic_weakness,
    ];

    const NAMES: [&str; FEATURE_DIMENSION] = [
        "user_theta_norm",
        "user_sem_norm",
        "user_confidence",
        "user_experience",
        "user_recent_accuracy",
        "user_session_progress",
        "item_difficulty_norm",
        "item_discrimination_norm",
        "item_guessing_norm",
        "item_exposure_rate",
        "item_historical_correct_rate",
        "interaction_distance",
        "interaction_irt_prob",
        "interaction_fisher_info",
        "interaction_topic_weakness",
    ];

    let mut out = [0.0_f64; FEATURE_DIMENSION];
    for i in 0..FEATURE_DIMENSION {
        out[i] = clamp01_warn(NAMES[i], raw[i]);
    }
    FeatureVector(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irt::IrtModel;

    fn sample_inputs() -> FeatureInputs {
        FeatureInputs {
            theta: 0.0,
            sem: 0.5,
            confidence: 0.6,
            response_count: 10,
            recent_accuracy: Some(0.8),
            questions_in_session: 5,
            item: IrtParameters::new(1.2, 0.0, 0.0, IrtModel::TwoPl).unwrap(),
            exposure_count: 2,
            max_exposure: 20,
            item_historical_correct_rate: 0.55,
            topic_mastery: 0.3,
        }
    }

    #[test]
    fn all_features_within_unit_interval() {
        let fv = build_features(&sample_inputs());
        for (i, &v) in fv.as_slice().iter().enumerate() {
            assert!((0.0..=1.0).contains(&v), "feature {i} out of range: {v}");
            assert!(v.is_finite());
        }
    }

    #[test]
    fn zero_max_exposure_yields_zero_rate() {
        let mut inputs = sample_inputs();
        inputs.max_exposure = 0;
        inputs.exposure_count = 0;
        let fv = build_features(&inputs);
        assert_eq!(fv.as_slice()[9], 0.0);
    }

    #[test]
    fn missing_recent_accuracy_defaults_to_half() {
        let mut inputs = sample_inputs();
        inputs.recent_accuracy = None;
        let fv = build_features(&inputs);
        assert_eq!(fv.as_slice()[4], 0.5);
    }

    #[test]
    fn extreme_theta_still_clamps_into_range() {
        let mut inputs = sample_inputs();
        inputs.theta = -10.0;
        let fv = build_features(&inputs);
        for &v in fv.as_slice() {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn full_topic_mastery_zeroes_weakness_feature() {
        let mut inputs = sample_inputs();
        inputs.topic_mastery = 1.0;
        let fv = build_features(&inputs);
        assert_eq!(fv.as_slice()[14], 0.0);
    }

    #[test]
    fn feature_vector_length_is_fifteen() {
        let fv = build_features(&sample_inputs());
        assert_eq!(fv.as_slice().len(), FEATURE_DIMENSION);
    }
}
