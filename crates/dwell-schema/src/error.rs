//! Errors raised while looking up or checking a data contract.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// No data contract is registered under this name.
    #[error("unknown schema '{0}'")]
    NotFound(String),

    /// The instance breaks the contract; one message per violation, in
    /// validator order.
    #[error("instance does not match schema: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// A schema held as data (for example one embedded in a backend request)
    /// does not compile.
    #[error("schema does not compile: {0}")]
    Generation(String),
}
