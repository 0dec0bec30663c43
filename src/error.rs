use std::fmt;

/// Crate-wide result alias.
pub type CatResult<T> = Result<T, CatError>;

/// Errors produced by the core engine and its components.
///
/// Variants are kinds, not wire codes: callers match on them to decide whether to
/// retry, skip, or surface the failure to an operator.
#[derive(Debug, thiserror::Error)]
pub enum CatError {
    /// Structurally invalid input: wrong context dimension, weights not summing to
    /// one, parameters outside their documented range. Fatal for the call that
    /// raised it; never silently substituted except where a component explicitly
    /// documents clamping.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A LinUCB update produced non-finite matrix or vector entries. The update is
    /// rejected and the prior model is kept.
    #[error("numerical instability in model update: {0}")]
    NumericalInstability(String),

    /// No candidates remain in a cell after every relaxation step.
    #[error("item pool exhausted for cell {cell_id}")]
    PoolExhausted { cell_id: String },

    /// An answer arrived with no matching decision snapshot; the response and
    /// mastery update still proceed, but the LinUCB update is skipped.
    #[error("no decision snapshot for item {item_id} in quiz {quiz_id}")]
    MissingSnapshot { quiz_id: String, item_id: String },

    /// A persistence call failed. Carries enough context to retry; never
    /// swallowed silently.
    #[error("store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl CatError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CatError::InvalidInput(msg.into())
    }

    pub fn numerical_instability(msg: impl Into<String>) -> Self {
        CatError::NumericalInstability(msg.into())
    }

    pub fn store(operation: &'static str, source: impl StoreErrorSource) -> Self {
        CatError::Store {
            operation,
            source: source.into_boxed(),
        }
    }
}

/// Bridges a store implementation's own error type into [`CatError::Store`]
/// without forcing every implementor to share a concrete error type.
pub trait StoreErrorSource: fmt::Debug {
    fn into_boxed(self) -> Box<dyn std::error::Error + Send + Sync + 'static>;
}

impl<E> StoreErrorSource for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_boxed(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        Box::new(self)
    }
}
