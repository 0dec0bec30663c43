//! Orchestrates item selection and answer processing across every component
//! module (§4.11). Grounded on `amas/engine.rs::AMASEngine` for the
//! load-score-admit-emit shape of its public methods, generalized from a
//! single ensemble call to the hybrid KLI-UCB/LinUCB pipeline this crate
//! implements.

use std::collections::{HashMap, VecDeque};

use rand::Rng;

use crate::config::{BanditMode, CatConfig};
use crate::content_balancer::{self, ContentBalancerConfig};
use crate::convergence::{self, effective_sem_target, quintile_for_theta, QuizType};
use crate::error::{CatError, CatResult};
use crate::exposure::{self, ExposureConfig};
use crate::features::{self, FeatureInputs};
use crate::hybrid;
use crate::irt::{self, AbilityMethod, IrtParameters, ResponseRecord};
use crate::linucb::LinUCBModel;
use crate::reward::{self, RewardInputs, RewardMode};
use crate::stopping::{
    evaluate_stopping, CellState as StoppingCellState, StopDecision, StoppingDefaults,
    DEFAULT_POOL_MIN_THRESHOLD,
};
use crate::store::{ItemFilter, ItemStore, MasteryStore, ModelStore, QuizStore, ResponseStore, SnapshotStore};
use crate::types::{
    CellId, DecisionSnapshot, Item, ItemId, LearnerCellMastery, LearnerId, MasteryStatus, QuizId,
    QuizStatus, Response, TopicSelectionMode,
};
use crate::ucb::kli_ucb_score;

const RECENT_WINDOW: usize = 5;

/// Per-session caches the engine's caller owns: answer history and per-cell
/// item pools, invalidated on every response write rather than held globally.
#[derive(Default)]
pub struct SessionCache {
    recent_correctness: HashMap<QuizId, VecDeque<bool>>,
    recent_kl_info: HashMap<QuizId, VecDeque<f64>>,
    cell_pool: HashMap<CellId, Vec<Item>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_response(&mut self, quiz_id: &QuizId, is_correct: bool, kl_info: f64) {
        let correctness = self.recent_correctness.entry(quiz_id.clone()).or_default();
        correctness.push_back(is_correct);
        if correctness.len() > RECENT_WINDOW {
            correctness.pop_front();
        }

        let kl = self.recent_kl_info.entry(quiz_id.clone()).or_default();
        kl.push_back(kl_info);
        if kl.len() > RECENT_WINDOW {
            kl.pop_front();
        }
    }

    fn recent_accuracy(&self, quiz_id: &QuizId) -> Option<f64> {
        let window = self.recent_correctness.get(quiz_id)?;
        if window.is_empty() {
            return None;
        }
        let correct = window.iter().filter(|&&c| c).count();
        Some(correct as f64 / window.len() as f64)
    }

    fn avg_recent_kl_info(&self, quiz_id: &QuizId) -> Option<f64> {
        let window = self.recent_kl_info.get(quiz_id)?;
        if window.is_empty() {
            return None;
        }
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }

    fn invalidate_cell(&mut self, cell_id: &CellId) {
        self.cell_pool.remove(cell_id);
    }
}

/// Result of `process_answer`.
#[derive(Debug, Clone, Copy)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub old_theta: f64,
    pub new_theta: f64,
    pub confidence: f64,
    pub method: AbilityMethod,
}

/// Read-only progress snapshot returned by `quiz_status`.
#[derive(Debug, Clone)]
pub struct QuizStatusSnapshot {
    pub answered: u32,
    pub cell_masteries: Vec<LearnerCellMastery>,
    pub latest_decision: StopDecision,
}

/// Projects the SEM improvement from one additional response contributing
/// `added_info` Fisher information; the spec names the PSER comparison but
/// leaves the projection formula itself to the implementer.
fn project_sem_improvement(current_sem: f64, added_info: f64) -> f64 {
    if added_info <= 0.0 {
        return 0.0;
    }
    if current_sem.is_infinite() {
        return f64::INFINITY;
    }
    let current_info = if current_sem > 0.0 {
        1.0 / (current_sem * current_sem)
    } else {
        0.0
    };
    let new_sem = irt::sem_from_information(current_info + added_info);
    (current_sem - new_sem).max(0.0)
}

fn mean_item_params(items: &[Item]) -> IrtParameters {
    if items.is_empty() {
        return IrtParameters::new(1.0, 0.0, 0.0, crate::irt::IrtModel::TwoPl).unwrap();
    }
    let mean_a = items.iter().map(|i| i.irt.a).sum::<f64>() / items.len() as f64;
    let mean_b = items.iter().map(|i| i.irt.b).sum::<f64>() / items.len() as f64;
    IrtParameters::new(
        mean_a.clamp(0.5, 2.5),
        mean_b.clamp(-4.0, 4.0),
        0.0,
        crate::irt::IrtModel::TwoPl,
    )
    .unwrap()
}

pub struct CatEngine<IS, RS, MS, MoS, SS, QS>
where
    IS: ItemStore,
    RS: ResponseStore,
    MS: MasteryStore,
    MoS: ModelStore,
    SS: SnapshotStore,
    QS: QuizStore,
{
    item_store: IS,
    response_store: RS,
    mastery_store: MS,
    model_store: MoS,
    snapshot_store: SS,
    quiz_store: QS,
    config: CatConfig,
}

impl<IS, RS, MS, MoS, SS, QS> CatEngine<IS, RS, MS, MoS, SS, QS>
where
    IS: ItemStore,
    RS: ResponseStore,
    MS: MasteryStore,
    MoS: ModelStore,
    SS: SnapshotStore,
    QS: QuizStore,
{
    pub fn new(
        item_store: IS,
        response_store: RS,
        mastery_store: MS,
        model_store: MoS,
        snapshot_store: SS,
        quiz_store: QS,
        config: CatConfig,
    ) -> Self {
        Self {
            item_store,
            response_store,
            mastery_store,
            model_store,
            snapshot_store,
            quiz_store,
            config,
        }
    }

    async fn load_cell_items<'a>(
        &self,
        cell_id: &CellId,
        cache: &'a mut SessionCache,
    ) -> CatResult<Vec<Item>> {
        if let Some(items) = cache.cell_pool.get(cell_id) {
            return Ok(items.clone());
        }
        let items = self
            .item_store
            .fetch_items_in_cell(cell_id, &ItemFilter::default())
            .await
            .map_err(|e| CatError::store("item_store.fetch_items_in_cell", e))?;
        cache.cell_pool.insert(cell_id.clone(), items.clone());
        Ok(items)
    }

    async fn build_cell_states(
        &self,
        masteries: &[LearnerCellMastery],
        quiz_type: QuizType,
        defaults: &StoppingDefaults,
        cache: &mut SessionCache,
    ) -> CatResult<Vec<StoppingCellState>> {
        let mut out = Vec::with_capacity(masteries.len());
        for mastery in masteries {
            let items = self.load_cell_items(&mastery.cell_id, cache).await?;
            let half_width = quintile_for_theta(mastery.theta).base_range_width();

            let sem_target = if self.config.convergence.enabled {
                effective_sem_target(mastery.theta, quiz_type, &self.config.convergence)
            } else {
                defaults.target_sem
            };

            let unused = |band: f64| {
                items
                    .iter()
                    .filter(|i| i.active && i.exposure_count < i.max_exposure)
                    .filter(|i| (i.irt.b - mastery.theta).abs() <= band)
                    .count() as u32
            };
            let unused_in_band = unused(half_width);
            let total_unused = items
                .iter()
                .filter(|i| i.active && i.exposure_count < i.max_exposure)
                .count() as u32;

            let pool_exhausted = unused_in_band < DEFAULT_POOL_MIN_THRESHOLD;
            let rescue_outcome = if pool_exhausted {
                Some(convergence::rescue_cascade(
                    half_width,
                    sem_target,
                    DEFAULT_POOL_MIN_THRESHOLD,
                    total_unused,
                    unused,
                ))
            } else {
                None
            };

            let max_fisher_info_available = items
                .iter()
                .filter(|i| i.active && i.exposure_count < i.max_exposure)
                .map(|i| irt::information(mastery.theta, &i.irt))
                .fold(0.0_f64, f64::max);

            let pser_projection = project_sem_improvement(mastery.sem, max_fisher_info_available);

            out.push(StoppingCellState {
                mastered: mastery.is_mastered(),
                sem: mastery.sem,
                sem_target,
                pser_projection,
                pool_exhausted,
                rescue_outcome,
                max_fisher_info_available,
            });
        }
        Ok(out)
    }

    async fn evaluate_stop(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        answered: u32,
        quiz_type: QuizType,
        selected_cells: &Option<Vec<CellId>>,
        topic_mode: TopicSelectionMode,
        cache: &mut SessionCache,
    ) -> CatResult<(StopDecision, Vec<LearnerCellMastery>)> {
        let defaults = StoppingDefaults::for_quiz_type(quiz_type);

        let mut masteries = self
            .mastery_store
            .list_for_learner(learner_id)
            .await
            .map_err(|e| CatError::store("mastery_store.list_for_learner", e))?;
        if matches!(topic_mode, TopicSelectionMode::Manual) {
            if let Some(selected) = selected_cells {
                masteries.retain(|m| selected.contains(&m.cell_id));
            }
        }

        let active: Vec<LearnerCellMastery> =
            masteries.iter().filter(|m| !m.is_mastered()).cloned().collect();
        let cell_states = self
            .build_cell_states(&active, quiz_type, &defaults, cache)
            .await?;

        let inputs = crate::stopping::StoppingInputs {
            answered,
            quiz_type,
            convergence_enabled: self.config.convergence.enabled,
            active_cells: &cell_states,
            avg_kl_info_last_5: cache.avg_recent_kl_info(quiz_id),
        };
        Ok((evaluate_stopping(&inputs, &defaults), masteries))
    }

    /// Selects the next item to administer, or `None` if the session should stop.
    pub async fn select_next<R: Rng + ?Sized>(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        cache: &mut SessionCache,
        rng: &mut R,
    ) -> CatResult<Option<Item>> {
        let quiz = self
            .quiz_store
            .get(quiz_id)
            .await
            .map_err(|e| CatError::store("quiz_store.get", e))?
            .ok_or_else(|| CatError::invalid_input(format!("unknown quiz {quiz_id}")))?;

        if !matches!(quiz.status, QuizStatus::InProgress) {
            tracing::info!(quiz_id = %quiz_id, status = ?quiz.status, "quiz is not in progress");
            return Ok(None);
        }

        let answered = self
            .response_store
            .count_for_quiz(learner_id, quiz_id)
            .await
            .map_err(|e| CatError::store("response_store.count_for_quiz", e))?;

        if answered >= quiz.max_questions {
            tracing::info!(quiz_id = %quiz_id, answered, "quiz complete: max questions reached");
            self.quiz_store
                .update_status(quiz_id, QuizStatus::Completed, Some(chrono::Utc::now()))
                .await
                .map_err(|e| CatError::store("quiz_store.update_status", e))?;
            return Ok(None);
        }

        let (decision, masteries) = self
            .evaluate_stop(
                learner_id,
                quiz_id,
                answered,
                quiz.quiz_type,
                &quiz.selected_cells,
                quiz.topic_selection_mode,
                cache,
            )
            .await?;
        if decision.stop {
            tracing::info!(quiz_id = %quiz_id, reason = ?decision.reason, "stopping controller halted selection");
            self.quiz_store
                .update_status(quiz_id, QuizStatus::Completed, Some(chrono::Utc::now()))
                .await
                .map_err(|e| CatError::store("quiz_store.update_status", e))?;
            return Ok(None);
        }

        let mut active: Vec<LearnerCellMastery> =
            masteries.into_iter().filter(|m| !m.is_mastered()).collect();
        if active.is_empty() {
            return Ok(None);
        }

        let total_selections: u32 = active.iter().map(|m| m.selection_count).sum::<u32>().max(1);
        let content_config = ContentBalancerConfig::default();

        loop {
            if active.is_empty() {
                return Ok(None);
            }

            let mut scored: Vec<(usize, f64)> = Vec::with_capacity(active.len());
            for (idx, mastery) in active.iter().enumerate() {
                let items = self.load_cell_items(&mastery.cell_id, cache).await?;
                let cell_params = mean_item_params(&items);
                let p = irt::probability(mastery.theta, &cell_params);
                let base = kli_ucb_score(
                    mastery.theta,
                    cell_params.b,
                    p,
                    mastery.selection_count as u64,
                    total_selections as u64,
                    quiz.exploration_parameter,
                );
                let adjusted = content_balancer::adjusted_score(
                    base,
                    mastery.selection_count,
                    total_selections,
                    &content_config,
                );
                scored.push((idx, adjusted));
            }
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            let (chosen_idx, _) = scored[0];
            let chosen = active[chosen_idx].clone();

            let answered_items = self
                .response_store
                .list_for_learner_cell(learner_id, &chosen.cell_id)
                .await
                .map_err(|e| CatError::store("response_store.list_for_learner_cell", e))?;
            let answered_ids: Vec<ItemId> = answered_items.into_iter().map(|r| r.item_id).collect();

            let items = self.load_cell_items(&chosen.cell_id, cache).await?;
            let candidates: Vec<Item> = items
                .iter()
                .filter(|i| i.active && i.exposure_count < i.max_exposure)
                .filter(|i| !answered_ids.contains(&i.id))
                .cloned()
                .collect();

            if candidates.is_empty() {
                let mut mastered = chosen.clone();
                mastered.mastery_status = MasteryStatus::Mastered;
                self.mastery_store
                    .upsert(mastered)
                    .await
                    .map_err(|e| CatError::store("mastery_store.upsert", e))?;
                active.remove(chosen_idx);
                continue;
            }

            return self
                .select_item_within_cell(learner_id, quiz_id, &quiz, &chosen, &candidates, answered, cache, rng)
                .await;
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn select_item_within_cell<R: Rng + ?Sized>(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        quiz: &crate::types::QuizSession,
        mastery: &LearnerCellMastery,
        candidates: &[Item],
        answered: u32,
        cache: &SessionCache,
        rng: &mut R,
    ) -> CatResult<Option<Item>> {
        let bandit_active = self.config.bandit.enabled
            && !matches!(self.config.bandit.mode, BanditMode::Disabled)
            && convergence::in_traffic_bucket(learner_id.as_str(), self.config.bandit.traffic);

        let mut per_item_score = Vec::with_capacity(candidates.len());
        let mut per_item_context: HashMap<ItemId, [f64; features::FEATURE_DIMENSION]> = HashMap::new();
        let mut per_item_predict: HashMap<ItemId, (f64, f64, f64)> = HashMap::new();

        for item in candidates {
            let p = irt::probability(mastery.theta, &item.irt);
            let kli_score = kli_ucb_score(
                mastery.theta,
                item.irt.b,
                p,
                item.exposure_count as u64,
                answered.max(1) as u64,
                quiz.exploration_parameter,
            );

            let score = if bandit_active && !matches!(self.config.bandit.mode, BanditMode::IrtOnly) {
                let inputs = FeatureInputs {
                    theta: mastery.theta,
                    sem: mastery.sem,
                    confidence: mastery.confidence,
                    response_count: mastery.response_count,
                    recent_accuracy: cache.recent_accuracy(quiz_id),
                    questions_in_session: answered,
                    item: item.irt,
                    exposure_count: item.exposure_count,
                    max_exposure: item.max_exposure,
                    item_historical_correct_rate: item.historical_correct_rate,
                    topic_mastery: if mastery.is_mastered() { 1.0 } else { 0.0 },
                };
                let context = features::build_features(&inputs);
                per_item_context.insert(item.id.clone(), context.0);

                let model = self
                    .model_store
                    .get(&item.id)
                    .await
                    .map_err(|e| CatError::store("model_store.get", e))?
                    .unwrap_or_else(|| {
                        LinUCBModel::new(features::FEATURE_DIMENSION, self.config.bandit.lambda)
                            .expect("default LinUCB dimension/lambda are always valid")
                    });

                let (ucb_linucb, mu, sigma) = model.predict(context.as_slice(), self.config.bandit.alpha)?;
                per_item_predict.insert(item.id.clone(), (ucb_linucb, mu, sigma));

                if matches!(self.config.bandit.mode, BanditMode::Linucb) {
                    ucb_linucb
                } else {
                    hybrid::hybrid_score(ucb_linucb, kli_score, answered, sigma, &self.config.hybrid)
                }
            } else {
                kli_score
            };

            per_item_score.push((item.id.clone(), score));
        }

        per_item_score.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total_exposure: u32 = candidates.iter().map(|i| i.exposure_count).sum::<u32>().max(1);
        let ranked_items: Vec<&Item> = per_item_score
            .iter()
            .filter_map(|(id, _)| candidates.iter().find(|i| &i.id == id))
            .collect();
        let rates: Vec<f64> = ranked_items
            .iter()
            .map(|i| exposure::observed_rate(i.exposure_count, total_exposure))
            .collect();

        let exposure_config = ExposureConfig::default();
        let admitted = exposure::select_admitted(&ranked_items, &rates, &exposure_config, rng);

        let Some(&item) = admitted else {
            return Ok(None);
        };

        let (final_ucb, mu, sigma) = per_item_predict.get(&item.id).copied().unwrap_or((0.0, 0.0, 0.0));
        let context = per_item_context
            .get(&item.id)
            .copied()
            .unwrap_or([0.0; features::FEATURE_DIMENSION]);

        let algorithm = if bandit_active {
            match self.config.bandit.mode {
                BanditMode::Linucb => "linucb".to_string(),
                BanditMode::Hybrid => "hybrid".to_string(),
                _ => "kli-ucb".to_string(),
            }
        } else {
            "kli-ucb".to_string()
        };

        self.snapshot_store
            .write(DecisionSnapshot {
                learner_id: learner_id.clone(),
                quiz_id: quiz_id.clone(),
                item_id: item.id.clone(),
                context,
                final_ucb,
                mu,
                sigma,
                theta_at_selection: mastery.theta,
                algorithm,
                created_at: chrono::Utc::now(),
            })
            .await
            .map_err(|e| CatError::store("snapshot_store.write", e))?;

        let mut updated_mastery = mastery.clone();
        updated_mastery.selection_count += 1;
        self.mastery_store
            .upsert(updated_mastery)
            .await
            .map_err(|e| CatError::store("mastery_store.upsert", e))?;

        self.item_store
            .record_exposure(&item.id)
            .await
            .map_err(|e| CatError::store("item_store.record_exposure", e))?;

        Ok(Some(item.clone()))
    }

    /// Records a response, re-estimates ability, and (if the bandit is
    /// active) updates the per-item LinUCB model from the matching snapshot.
    pub async fn process_answer(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        item_id: &ItemId,
        is_correct: bool,
        response_time_ms: u32,
        cache: &mut SessionCache,
    ) -> CatResult<AnswerOutcome> {
        let item = self
            .item_store
            .get_item(item_id)
            .await
            .map_err(|e| CatError::store("item_store.get_item", e))?
            .ok_or_else(|| CatError::invalid_input(format!("unknown item {item_id}")))?;

        let mut mastery = self
            .mastery_store
            .get(learner_id, &item.cell_id)
            .await
            .map_err(|e| CatError::store("mastery_store.get", e))?
            .unwrap_or_else(|| LearnerCellMastery::new(learner_id.clone(), item.cell_id.clone()));
        let old_theta = mastery.theta;
        let sem_before = mastery.sem;

        self.response_store
            .append(Response {
                learner_id: learner_id.clone(),
                quiz_id: quiz_id.clone(),
                item_id: item_id.clone(),
                option_id: String::new(),
                is_correct,
                response_time_ms,
                created_at: chrono::Utc::now(),
            })
            .await
            .map_err(|e| CatError::store("response_store.append", e))?;

        let history = self
            .response_store
            .list_for_learner_cell(learner_id, &item.cell_id)
            .await
            .map_err(|e| CatError::store("response_store.list_for_learner_cell", e))?;

        let cell_items = self
            .item_store
            .fetch_items_in_cell(&item.cell_id, &ItemFilter::default())
            .await
            .map_err(|e| CatError::store("item_store.fetch_items_in_cell", e))?;
        let params_by_id: HashMap<&ItemId, &IrtParameters> =
            cell_items.iter().map(|i| (&i.id, &i.irt)).collect();

        let responses: Vec<ResponseRecord> = history
            .iter()
            .filter_map(|r| {
                params_by_id.get(&r.item_id).map(|&params| ResponseRecord {
                    item: *params,
                    is_correct: r.is_correct,
                })
            })
            .collect();

        let ability = irt::estimate_ability(&responses, 0.0);

        mastery.theta = ability.theta;
        mastery.sem = ability.sem;
        mastery.confidence = ability.confidence;
        mastery.response_count += 1;
        mastery.last_estimated_at = Some(chrono::Utc::now());
        if mastery.sem < 0.3 && mastery.response_count >= 3 {
            mastery.mastery_status = MasteryStatus::Mastered;
        }
        self.mastery_store
            .upsert(mastery.clone())
            .await
            .map_err(|e| CatError::store("mastery_store.upsert", e))?;

        let bandit_active = self.config.bandit.enabled
            && !matches!(self.config.bandit.mode, BanditMode::Disabled)
            && !matches!(self.config.bandit.mode, BanditMode::IrtOnly);

        if bandit_active {
            match self
                .snapshot_store
                .most_recent(learner_id, quiz_id, item_id)
                .await
                .map_err(|e| CatError::store("snapshot_store.most_recent", e))?
            {
                None => {
                    let err = CatError::MissingSnapshot {
                        quiz_id: quiz_id.to_string(),
                        item_id: item_id.to_string(),
                    };
                    tracing::warn!(quiz_id = %quiz_id, item_id = %item_id, %err, "skipping LinUCB update");
                }
                Some(snapshot) => {
                    let reward_inputs = RewardInputs {
                        is_correct,
                        sem_before,
                        sem_after: mastery.sem,
                        response_time_s: response_time_ms as f64 / 1000.0,
                    };
                    let reward = reward::compute_reward(
                        &reward_inputs,
                        RewardMode::Weighted,
                        &self.config.reward,
                    )?;

                    let mut model = self
                        .model_store
                        .get(item_id)
                        .await
                        .map_err(|e| CatError::store("model_store.get", e))?
                        .unwrap_or_else(|| {
                            LinUCBModel::new(features::FEATURE_DIMENSION, self.config.bandit.lambda)
                                .expect("default LinUCB dimension/lambda are always valid")
                        });

                    match model.update(&snapshot.context, reward) {
                        Ok(()) => {
                            self.model_store
                                .put(item_id, &model)
                                .await
                                .map_err(|e| CatError::store("model_store.put", e))?;
                        }
                        Err(err) => {
                            tracing::error!(item_id = %item_id, error = %err, "LinUCB update rejected");
                        }
                    }
                }
            }
        }

        let kl_info = irt::kl_information(irt::probability(old_theta, &item.irt));
        cache.push_response(quiz_id, is_correct, kl_info);
        cache.invalidate_cell(&item.cell_id);

        Ok(AnswerOutcome {
            is_correct,
            old_theta,
            new_theta: mastery.theta,
            confidence: mastery.confidence,
            method: ability.method,
        })
    }

    /// Read-only progress snapshot: no store writes, no side effects.
    pub async fn quiz_status(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        cache: &mut SessionCache,
    ) -> CatResult<QuizStatusSnapshot> {
        let quiz = self
            .quiz_store
            .get(quiz_id)
            .await
            .map_err(|e| CatError::store("quiz_store.get", e))?
            .ok_or_else(|| CatError::invalid_input(format!("unknown quiz {quiz_id}")))?;

        let answered = self
            .response_store
            .count_for_quiz(learner_id, quiz_id)
            .await
            .map_err(|e| CatError::store("response_store.count_for_quiz", e))?;

        let (decision, masteries) = self
            .evaluate_stop(
                learner_id,
                quiz_id,
                answered,
                quiz.quiz_type,
                &quiz.selected_cells,
                quiz.topic_selection_mode,
                cache,
            )
            .await?;

        Ok(QuizStatusSnapshot {
            answered,
            cell_masteries: masteries,
            latest_decision: decision,
        })
    }
}
