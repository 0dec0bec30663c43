//! Computerized adaptive testing engine: IRT ability estimation, KLI-UCB and
//! LinUCB item selection, content balancing, exposure control, and
//! distribution-aware stopping/convergence rules.
//!
//! Grounded on `amas/mod.rs`'s module-declaration shape: a flat `pub mod` list
//! plus targeted re-exports of the types a host application actually needs at
//! its call sites, rather than a blanket `pub use module::*`.

pub mod config;
pub mod content_balancer;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod exposure;
pub mod features;
pub mod hybrid;
pub mod irt;
pub mod linucb;
pub mod logging;
pub mod matrix;
pub mod model_store;
pub mod reward;
pub mod sanitize;
pub mod stopping;
pub mod store;
pub mod types;
pub mod ucb;

pub use config::CatConfig;
pub use engine::{AnswerOutcome, CatEngine, QuizStatusSnapshot, SessionCache};
pub use error::{CatError, CatResult};
pub use types::{
    Cell, CellId, DecisionSnapshot, Item, ItemId, LearnerCellMastery, LearnerId,
    MasteryStatus, QuizId, QuizSession, QuizStatus, Response, TopicSelectionMode,
};
