//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown variant id: {0:?}")]
  UnknownVariant(String),

  #[error("unknown event type: {0:?}")]
  UnknownEventType(String),

  #[error("variant weights must sum to 100, got {sum}")]
  InvalidWeights { sum: u32 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
