//! Sympson-Hetter probabilistic exposure control (§4.8).

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct ExposureConfig {
    pub max_rate: f64,
    pub admission_floor: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            max_rate: 0.20,
            admission_floor: 0.05,
        }
    }
}

/// `r_obs = exposure_count / total_responses_in_window` over a 30-day window.
pub fn observed_rate(exposure_count: u32, total_responses_in_window: u32) -> f64 {
    if total_responses_in_window == 0 {
        0.0
    } else {
        exposure_count as f64 / total_responses_in_window as f64
    }
}

/// `clip(max_rate / r_obs, admission_floor, 1)`, with `r_obs = 0` treated as
/// "never shown" and admitted at full probability.
pub fn admission_probability(observed_rate: f64, config: &ExposureConfig) -> f64 {
    if observed_rate <= 0.0 {
        return 1.0;
    }
    (config.max_rate / observed_rate).clamp(config.admission_floor, 1.0)
}

/// Walks candidates in ranked order, admitting the first whose Sympson-Hetter
/// draw succeeds; force-admits the top candidate if every draw rejects.
/// `observed_rates[i]` must correspond to `candidate_ids[i]`.
pub fn select_admitted<'a, T, R: Rng + ?Sized>(
    candidates: &'a [T],
    observed_rates: &[f64],
    config: &ExposureConfig,
    rng: &mut R,
) -> Option<&'a T> {
    debug_assert_eq!(candidates.len(), observed_rates.len());
    for (candidate, &rate) in candidates.iter().zip(observed_rates.iter()) {
        let p_adm = admission_probability(rate, config);
        let draw: f64 = rng.gen();
        if draw < p_adm {
            return Some(candidate);
        }
    }
    candidates.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn unobserved_candidate_is_always_admitted() {
        assert_eq!(admission_probability(0.0, &ExposureConfig::default()), 1.0);
    }

    #[test]
    fn admission_probability_clamped_to_floor() {
        let config = ExposureConfig::default();
        let p = admission_probability(10.0, &config);
        assert_eq!(p, config.admission_floor);
    }

    #[test]
    fn admission_probability_never_exceeds_one() {
        let config = ExposureConfig::default();
        let p = admission_probability(0.01, &config);
        assert!(p <= 1.0);
    }

    #[test]
    fn select_admitted_falls_back_to_top_candidate() {
        let config = ExposureConfig {
            max_rate: 0.0,
            admission_floor: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let candidates = vec!["a", "b", "c"];
        let rates = vec![1.0, 1.0, 1.0];
        let picked = select_admitted(&candidates, &rates, &config, &mut rng);
        assert_eq!(picked, Some(&"a"));
    }

    #[test]
    fn select_admitted_is_deterministic_for_a_fixed_seed() {
        let config = ExposureConfig::default();
        let candidates = vec![1, 2, 3];
        let rates = vec![0.3, 0.3, 0.3];

        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let picked1 = select_admitted(&candidates, &rates, &config, &mut rng1);

        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let picked2 = select_admitted(&candidates, &rates, &config, &mut rng2);

        assert_eq!(picked1, picked2);
    }

    #[test]
    fn observed_rate_is_zero_with_empty_window() {
        assert_eq!(observed_rate(5, 0), 0.0);
    }
}
