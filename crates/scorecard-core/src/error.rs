//! Error types for `scorecard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("score {0} is outside the valid range 0..=5")]
  ScoreOutOfRange(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
