//! Cell selection with over-exposure penalty and coverage diagnostics (§4.7).

/// Tuning knobs for content balancing; defaults match §4.7.
#[derive(Debug, Clone, Copy)]
pub struct ContentBalancerConfig {
    pub max_per_cell: u32,
    pub diversity_weight: f64,
    pub min_cell_coverage: f64,
}

impl Default for ContentBalancerConfig {
    fn default() -> Self {
        Self {
            max_per_cell: 5,
            diversity_weight: 0.3,
            min_cell_coverage: 0.5,
        }
    }
}

/// `representation = selections_c / N` (0 if N=0).
pub fn representation(selections_in_cell: u32, total_selections: u32) -> f64 {
    if total_selections == 0 {
        0.0
    } else {
        selections_in_cell as f64 / total_selections as f64
    }
}

/// `exp(0.5 * max(0, selections_c - max_per_cell))`.
pub fn over_exposure_penalty(selections_in_cell: u32, max_per_cell: u32) -> f64 {
    let over = (selections_in_cell as i64 - max_per_cell as i64).max(0) as f64;
    (0.5 * over).exp()
}

/// `representation * penalty`.
pub fn balance_score(selections_in_cell: u32, total_selections: u32, max_per_cell: u32) -> f64 {
    representation(selections_in_cell, total_selections) * over_exposure_penalty(selections_in_cell, max_per_cell)
}

/// `UCB * max(0.1, 1 - balance_score * diversity_weight)`.
pub fn adjusted_score(
    ucb: f64,
    selections_in_cell: u32,
    total_selections: u32,
    config: &ContentBalancerConfig,
) -> f64 {
    let score = balance_score(selections_in_cell, total_selections, config.max_per_cell);
    let factor = (1.0 - score * config.diversity_weight).max(0.1);
    ucb * factor
}

/// Per-cell coverage snapshot used for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct CellCoverage {
    pub selections: u32,
    pub over_cap: bool,
    pub under_covered: bool,
}

/// Flags cells over their exposure cap or below the minimum coverage share.
pub fn coverage_diagnostic(
    selections_per_cell: &[u32],
    config: &ContentBalancerConfig,
) -> Vec<CellCoverage> {
    let total: u32 = selections_per_cell.iter().sum();
    let cell_count = selections_per_cell.len().max(1) as f64;
    let expected_share = 1.0 / cell_count;

    selections_per_cell
        .iter()
        .map(|&selections| {
            let share = representation(selections, total);
            CellCoverage {
                selections,
                over_cap: selections > config.max_per_cell,
                under_covered: share < config.min_cell_coverage * expected_share,
            }
        })
        .collect()
}
