//! Service layer for the Scorecard evaluation backend.
//!
//! Each service wraps an [`EvalStore`](scorecard_core::store::EvalStore)
//! backend and enforces the referential hierarchy — a child operation first
//! validates every parent it references, then performs the store operation,
//! then returns plain entities. Failures come back as one of a closed set of
//! per-family error enums; nothing here panics or retries.
//!
//! The chain-hosting side (directory listing, batch invocation, schema
//! fetch) is behind the [`ChainHost`] trait; [`LangserveClient`] is the HTTP
//! implementation used in production.

pub mod answer;
pub mod chain;
pub mod configuration;
pub mod error;
pub mod host;
pub mod langserve;
pub mod question;
pub mod session;

pub use answer::AnswerService;
pub use chain::ChainService;
pub use configuration::ConfigurationService;
pub use error::{
  AnswerError, ChainError, ConfigurationError, QuestionError, SessionError,
};
pub use host::{ChainHost, HostError};
pub use langserve::{LangserveClient, LangserveConfig};
pub use question::QuestionService;
pub use session::SessionService;

#[cfg(test)]
mod tests;
