//! Persistence abstractions (§6): six async traits the engine drives, plus
//! in-memory reference implementations used by this crate's own tests and
//! available to downstream integrators for theirs.
//!
//! Grounded on the teacher's persistence-as-collaborator shape
//! (`amas/persistence.rs`) and the `async_trait`-over-`Send + Sync` idiom used
//! for storage traits elsewhere in the retrieval pack (e.g.
//! `krukah-robopoker/src/database/sink.rs`).

use crate::linucb::LinUCBModel;
use crate::types::{
    CellId, DecisionSnapshot, Item, ItemId, LearnerCellMastery, LearnerId, QuizId, QuizSession,
    QuizStatus, Response,
};
use async_trait::async_trait;
use std::error::Error as StdError;

/// Optional constraints for fetching candidate items within a cell.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub active_only: bool,
    pub exclude: Vec<ItemId>,
    pub difficulty_band: Option<(f64, f64)>,
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn fetch_items_in_cell(
        &self,
        cell_id: &CellId,
        filter: &ItemFilter,
    ) -> Result<Vec<Item>, Self::Error>;

    async fn get_item(&self, item_id: &ItemId) -> Result<Option<Item>, Self::Error>;

    async fn record_exposure(&self, item_id: &ItemId) -> Result<(), Self::Error>;
}

#[async_trait]
pub trait ResponseStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn append(&self, response: Response) -> Result<(), Self::Error>;

    /// Ordered oldest-first, for ability re-estimation.
    async fn list_for_learner_cell(
        &self,
        learner_id: &LearnerId,
        cell_id: &CellId,
    ) -> Result<Vec<Response>, Self::Error>;

    async fn count_for_quiz(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
    ) -> Result<u32, Self::Error>;
}

#[async_trait]
pub trait MasteryStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn get(
        &self,
        learner_id: &LearnerId,
        cell_id: &CellId,
    ) -> Result<Option<LearnerCellMastery>, Self::Error>;

    async fn upsert(&self, mastery: LearnerCellMastery) -> Result<(), Self::Error>;

    async fn list_for_learner(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Vec<LearnerCellMastery>, Self::Error>;
}

#[async_trait]
pub trait ModelStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn get(&self, item_id: &ItemId) -> Result<Option<LinUCBModel>, Self::Error>;

    async fn put(&self, item_id: &ItemId, model: &LinUCBModel) -> Result<(), Self::Error>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn write(&self, snapshot: DecisionSnapshot) -> Result<(), Self::Error>;

    async fn most_recent(
        &self,
        learner_id: &LearnerId,
        quiz_id: &QuizId,
        item_id: &ItemId,
    ) -> Result<Option<DecisionSnapshot>, Self::Error>;
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    async fn get(&self, quiz_id: &QuizId) -> Result<Option<QuizSession>, Self::Error>;

    async fn update_status(
        &self,
        quiz_id: &QuizId,
        status: QuizStatus,
        completed_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), Self::Error>;
}

/// In-memory reference implementations, used by this crate's own tests and
/// available to downstream integrators for theirs — mirrors the teacher's
/// `tests/common/mod.rs` test-app-builder habit rather than a mocking
/// framework.
#[cfg(any(test, feature = "test-util"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("in-memory store error: {0}")]
    pub struct MemoryStoreError(pub String);

    #[derive(Default)]
    pub struct InMemoryItemStore {
        items: Mutex<HashMap<ItemId, Item>>,
    }

    impl InMemoryItemStore {
        pub fn new(items: Vec<Item>) -> Self {
            let map = items.into_iter().map(|i| (i.id.clone(), i)).collect();
            Self {
                items: Mutex::new(map),
            }
        }
    }

    #[async_trait]
    impl ItemStore for InMemoryItemStore {
        type Error = MemoryStoreError;

        async fn fetch_items_in_cell(
            &self,
            cell_id: &CellId,
            filter: &ItemFilter,
        ) -> Result<Vec<Item>, Self::Error> {
            let items = self.items.lock().await;
            let mut out: Vec<Item> = items
                .values()
                .filter(|item| &item.cell_id == cell_id)
                .filter(|item| !filter.active_only || item.active)
                .filter(|item| !filter.exclude.contains(&item.id))
                .filter(|item| match filter.difficulty_band {
                    Some((lo, hi)) => item.irt.b >= lo && item.irt.b <= hi,
                    None => true,
                })
                .cloned()
                .collect();
            out.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
            Ok(out)
        }

        async fn get_item(&self, item_id: &ItemId) -> Result<Option<Item>, Self::Error> {
            Ok(self.items.lock().await.get(item_id).cloned())
        }

        async fn record_exposure(&self, item_id: &ItemId) -> Result<(), Self::Error> {
            let mut items = self.items.lock().await;
            if let Some(item) = items.get_mut(item_id) {
                item.exposure_count += 1;
                item.last_used_at = Some(chrono::Utc::now());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct InMemoryResponseStore {
        responses: Mutex<Vec<Response>>,
    }

    #[async_trait]
    impl ResponseStore for InMemoryResponseStore {
        type Error = MemoryStoreError;

        async fn append(&self, response: Response) -> Result<(), Self::Error> {
            self.responses.lock().await.push(response);
            Ok(())
        }

        async fn list_for_learner_cell(
            &self,
            learner_id: &LearnerId,
            cell_id: &CellId,
        ) -> Result<Vec<Response>, Self::Error> {
            let responses = self.responses.lock().await;
            // This store has no direct item->cell mapping; callers filter by
            // item membership themselves via ItemStore, so here we filter by
            // learner only and let the caller intersect with cell membership.
            let _ = cell_id;
            Ok(responses
                .iter()
                .filter(|r| &r.learner_id == learner_id)
                .cloned()
                .collect())
        }

        async fn count_for_quiz(
            &self,
            learner_id: &LearnerId,
            quiz_id: &QuizId,
        ) -> Result<u32, Self::Error> {
            let responses = self.responses.lock().await;
            Ok(responses
                .iter()
                .filter(|r| &r.learner_id == learner_id && &r.quiz_id == quiz_id)
                .count() as u32)
        }
    }

    #[derive(Default)]
    pub struct InMemoryMasteryStore {
        records: Mutex<HashMap<(LearnerId, CellId), LearnerCellMastery>>,
    }

    #[async_trait]
    impl MasteryStore for InMemoryMasteryStore {
        type Error = MemoryStoreError;

        async fn get(
            &self,
            learner_id: &LearnerId,
            cell_id: &CellId,
        ) -> Result<Option<LearnerCellMastery>, Self::Error> {
            let records = self.records.lock().await;
            Ok(records.get(&(learner_id.clone(), cell_id.clone())).cloned())
        }

        async fn upsert(&self, mastery: LearnerCellMastery) -> Result<(), Self::Error> {
            let mut records = self.records.lock().await;
            records.insert(
                (mastery.learner_id.clone(), mastery.cell_id.clone()),
                mastery,
            );
            Ok(())
        }

        async fn list_for_learner(
            &self,
            learner_id: &LearnerId,
        ) -> Result<Vec<LearnerCellMastery>, Self::Error> {
            let records = self.records.lock().await;
            Ok(records
                .values()
                .filter(|m| &m.learner_id == learner_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct InMemoryModelStore {
        models: Mutex<HashMap<ItemId, LinUCBModel>>,
    }

    #[async_trait]
    impl ModelStore for InMemoryModelStore {
        type Error = MemoryStoreError;

        async fn get(&self, item_id: &ItemId) -> Result<Option<LinUCBModel>, Self::Error> {
            Ok(self.models.lock().await.get(item_id).cloned())
        }

        async fn put(&self, item_id: &ItemId, model: &LinUCBModel) -> Result<(), Self::Error> {
            self.models
                .lock()
                .await
                .insert(item_id.clone(), model.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct InMemorySnapshotStore {
        snapshots: Mutex<HashMap<(LearnerId, QuizId, ItemId), DecisionSnapshot>>,
    }

    #[async_trait]
    impl SnapshotStore for InMemorySnapshotStore {
        type Error = MemoryStoreError;

        async fn write(&self, snapshot: DecisionSnapshot) -> Result<(), Self::Error> {
            let key = (
                snapshot.learner_id.clone(),
                snapshot.quiz_id.clone(),
                snapshot.item_id.clone(),
            );
            self.snapshots.lock().await.insert(key, snapshot);
            Ok(())
        }

        async fn most_recent(
            &self,
            learner_id: &LearnerId,
            quiz_id: &QuizId,
            item_id: &ItemId,
        ) -> Result<Option<DecisionSnapshot>, Self::Error> {
            let key = (learner_id.clone(), quiz_id.clone(), item_id.clone());
            Ok(self.snapshots.lock().await.get(&key).cloned())
        }
    }

    #[derive(Default)]
    pub struct InMemoryQuizStore {
        sessions: Mutex<HashMap<QuizId, QuizSession>>,
    }

    impl InMemoryQuizStore {
        pub fn new(sessions: Vec<QuizSession>) -> Self {
            let map = sessions.into_iter().map(|s| (s.quiz_id.clone(), s)).collect();
            Self {
                sessions: Mutex::new(map),
            }
        }
    }

    #[async_trait]
    impl QuizStore for InMemoryQuizStore {
        type Error = MemoryStoreError;

        async fn get(&self, quiz_id: &QuizId) -> Result<Option<QuizSession>, Self::Error> {
            Ok(self.sessions.lock().await.get(quiz_id).cloned())
        }

        async fn update_status(
            &self,
            quiz_id: &QuizId,
            status: QuizStatus,
            completed_at: Option<chrono::DateTime<chrono::Utc>>,
        ) -> Result<(), Self::Error> {
            let mut sessions = self.sessions.lock().await;
            if let Some(session) = sessions.get_mut(quiz_id) {
                session.status = status;
                session.completed_at = completed_at;
            }
            Ok(())
        }
    }

}
