use crate::error::{CatError, CatResult};

fn env_var(prefix: &str, key: &str) -> Option<String> {
    std::env::var(format!("{prefix}{key}")).ok()
}

fn env_parse<T: std::str::FromStr>(prefix: &str, key: &str, default: T) -> T {
    env_var(prefix, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(prefix: &str, key: &str, default: bool) -> bool {
    env_var(prefix, key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// Contextual bandit operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BanditMode {
    Disabled,
    Linucb,
    Hybrid,
    IrtOnly,
}

impl std::str::FromStr for BanditMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" => Ok(BanditMode::Disabled),
            "linucb" => Ok(BanditMode::Linucb),
            "hybrid" => Ok(BanditMode::Hybrid),
            "irt-only" | "irt_only" => Ok(BanditMode::IrtOnly),
            _ => Err(()),
        }
    }
}

/// Weights for the multi-objective reward (§4.5). Must sum to 1 within tolerance.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RewardWeights {
    pub correctness: f64,
    pub info_gain: f64,
    pub speed: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            correctness: 0.7,
            info_gain: 0.2,
            speed: 0.1,
        }
    }
}

impl RewardWeights {
    pub fn validate(&self) -> CatResult<()> {
        let sum = self.correctness + self.info_gain + self.speed;
        if (sum - 1.0).abs() > 0.01 {
            return Err(CatError::invalid_input(format!(
                "reward weights sum to {sum}, expected 1.0 +/- 0.01"
            )));
        }
        Ok(())
    }
}

/// Session-progress-dependent LinUCB/IRT blend weights (§4.6).
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct HybridWeights {
    pub w_min: f64,
    pub w_mid: f64,
    pub w_high: f64,
    pub w_max: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            w_min: 0.403,
            w_mid: 0.708,
            w_high: 0.871,
            // Asymptotic ceiling for the post-warm-up regime; spec leaves the
            // exact value to the implementer.
            w_max: 0.95,
        }
    }
}

/// Per-item contextual bandit configuration, env-overridable under `CAT_BANDIT_`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ContextualBanditConfig {
    pub enabled: bool,
    pub mode: BanditMode,
    pub traffic: f64,
    pub alpha: f64,
    pub lambda: f64,
    pub verbose: bool,
}

impl Default for ContextualBanditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: BanditMode::Hybrid,
            traffic: 100.0,
            alpha: 1.5,
            lambda: 1.0,
            verbose: false,
        }
    }
}

impl ContextualBanditConfig {
    const PREFIX: &'static str = "CAT_BANDIT_";

    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            enabled: env_bool(Self::PREFIX, "ENABLED", default.enabled),
            mode: env_var(Self::PREFIX, "MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.mode),
            traffic: env_parse(Self::PREFIX, "TRAFFIC", default.traffic),
            alpha: env_parse(Self::PREFIX, "ALPHA", default.alpha),
            lambda: env_parse(Self::PREFIX, "LAMBDA", default.lambda),
            verbose: env_bool(Self::PREFIX, "VERBOSE", default.verbose),
        }
    }

    pub fn validate(&self) -> CatResult<()> {
        if !(0.0..=100.0).contains(&self.traffic) {
            return Err(CatError::invalid_input(format!(
                "bandit traffic {} outside [0, 100]",
                self.traffic
            )));
        }
        if self.lambda <= 0.0 {
            return Err(CatError::invalid_input(format!(
                "bandit lambda {} must be positive",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Ability-quintile SEM thresholds for distribution-aware convergence (§4.10),
/// env-overridable under `CAT_CONVERGENCE_`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct DistributionAwareConvergenceConfig {
    pub enabled: bool,
    pub traffic: f64,
    pub verbose: bool,
    pub sem_q1: f64,
    pub sem_q2: f64,
    pub sem_q3: f64,
    pub sem_q4: f64,
    pub sem_q5: f64,
}

impl Default for DistributionAwareConvergenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            traffic: 100.0,
            verbose: false,
            sem_q1: 0.50,
            sem_q2: 0.35,
            sem_q3: 0.35,
            sem_q4: 0.35,
            sem_q5: 0.50,
        }
    }
}

impl DistributionAwareConvergenceConfig {
    const PREFIX: &'static str = "CAT_CONVERGENCE_";
    pub const SEM_FLOOR: f64 = 0.20;

    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            enabled: env_bool(Self::PREFIX, "ENABLED", default.enabled),
            traffic: env_parse(Self::PREFIX, "TRAFFIC", default.traffic),
            verbose: env_bool(Self::PREFIX, "VERBOSE", default.verbose),
            sem_q1: env_parse(Self::PREFIX, "SEM_Q1", default.sem_q1),
            sem_q2: env_parse(Self::PREFIX, "SEM_Q2", default.sem_q2),
            sem_q3: env_parse(Self::PREFIX, "SEM_Q3", default.sem_q3),
            sem_q4: env_parse(Self::PREFIX, "SEM_Q4", default.sem_q4),
            sem_q5: env_parse(Self::PREFIX, "SEM_Q5", default.sem_q5),
        }
    }

    pub fn sem_targets(&self) -> [f64; 5] {
        [
            self.sem_q1,
            self.sem_q2,
            self.sem_q3,
            self.sem_q4,
            self.sem_q5,
        ]
    }

    pub fn validate(&self) -> CatResult<()> {
        if !(0.0..=100.0).contains(&self.traffic) {
            return Err(CatError::invalid_input(format!(
                "convergence traffic {} outside [0, 100]",
                self.traffic
            )));
        }
        for sem in self.sem_targets() {
            if !(0.0..=1.0).contains(&sem) || sem <= 0.0 {
                return Err(CatError::invalid_input(format!(
                    "SEM threshold {sem} outside (0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Process-wide config snapshot threaded through engine constructors; not a
/// global singleton (see Design Note on global mutable configuration).
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct CatConfig {
    pub bandit: ContextualBanditConfig,
    pub convergence: DistributionAwareConvergenceConfig,
    pub reward: RewardWeights,
    pub hybrid: HybridWeights,
}

impl CatConfig {
    pub fn from_env() -> Self {
        Self {
            bandit: ContextualBanditConfig::from_env(),
            convergence: DistributionAwareConvergenceConfig::from_env(),
            reward: RewardWeights::default(),
            hybrid: HybridWeights::default(),
        }
    }

    pub fn validate(&self) -> CatResult<()> {
        self.bandit.validate()?;
        self.convergence.validate()?;
        self.reward.validate()?;
        Ok(())
    }
}
