use crate::{cache::CacheError, expression::NameExpressionError};

/// Represents a result type for name generation operations.
///
/// This `Result` type is a standard Rust `Result` type where the error variant is the
/// crate-level [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// A name generation failure.
///
/// Whether the caller sees it is decided by
/// [`ExceptionHandlingStrategy`](crate::ExceptionHandlingStrategy): under `Catch` it is logged and
/// swallowed, under `Throw` it is returned as is.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The market description could not be resolved from any of the caches.
    #[error("market description not found (market_id: {market_id})")]
    MarketDescriptionNotFound {
        /// Requested market id.
        market_id: i64,
    },

    /// The market description was found but it does not contain the requested outcome.
    #[error("outcome not found (market_id: {market_id}, outcome_id: {outcome_id})")]
    OutcomeNotFound {
        /// Requested market id.
        market_id: i64,
        /// Requested outcome id.
        outcome_id: String,
    },

    /// The description does not carry a name template for the requested culture.
    #[error("no name available for culture {culture} (market_id: {market_id})")]
    NameNotFound {
        /// Requested market id.
        market_id: i64,
        /// Requested culture.
        culture: String,
    },

    /// A name expression could not be evaluated.
    #[error(transparent)]
    Expression(#[from] NameExpressionError),

    /// A name template or a score is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Market description caches failed to produce a description.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Malformed textual input: name templates, name expressions, scores and specifier strings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A single `{...}` expression token is malformed.
    #[error("invalid name expression: {0:?}")]
    InvalidExpression(String),

    /// A name template has unbalanced brackets.
    #[error("invalid name descriptor: {0:?}")]
    InvalidDescriptor(String),

    /// A score is not of the `home:away` form.
    #[error("invalid score: {0:?}")]
    InvalidScore(String),

    /// A specifier pair is not of the `name=value` form.
    #[error("invalid specifier: {0:?}")]
    InvalidSpecifier(String),

    /// A URN is not of the `prefix:type:id` form.
    #[error("invalid urn: {0:?}")]
    InvalidUrn(String),
}
