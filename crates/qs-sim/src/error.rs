use qs_core::{EntityId, QsError, ResourceId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Qs(#[from] QsError),

    /// An activity or source asked to elapse a negative or non-finite
    /// duration.
    #[error("invalid delay {0}; delays must be finite and non-negative")]
    InvalidDelay(f64),

    #[error("no resource with id {0} in this simulation")]
    UnknownResource(ResourceId),

    #[error("no entity with id {0} in this run")]
    UnknownEntity(EntityId),

    #[error("simulation has already been started")]
    AlreadyStarted,
}

pub type SimResult<T> = Result<T, SimError>;
