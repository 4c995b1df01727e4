//! Mapping validators.
//!
//! Market mappings carry a compact `valid_for` expression that decides whether the mapping applies
//! to a given set of specifiers. The expression is a `|`-separated list of clauses that all have
//! to hold:
//!
//! - `name=value` matches when specifier `name` equals `value` exactly;
//! - `name~*.F` (`F` one of `0`, `25`, `5`, `75`) matches when specifier `name` is a decimal
//!   whose fractional part is `0.F`.
//!
//! [`MappingValidatorFactory::build`] parses an expression and fails with
//! [`ValidatorBuildError`] if it is malformed. [`MappingValidator::validate`] fails with
//! [`ValidatorError`] when the specifiers cannot be checked at all (missing specifier, non-numeric
//! value), which is distinct from a clean `false`.
mod validator;

pub use validator::{MappingValidator, MappingValidatorFactory};

pub(crate) use validator::parse_decimal;

/// Malformed `valid_for` expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorBuildError {
    #[error("mapping validator expression is empty")]
    EmptyExpression,

    /// Clause is neither `name=value` nor `name~*.fraction`.
    #[error("invalid mapping validator clause: {0:?}")]
    InvalidClause(String),

    /// Decimal clause with an unsupported pattern.
    #[error("invalid decimal pattern in mapping validator clause: {0:?}")]
    InvalidDecimalPattern(String),
}

/// Specifiers cannot be checked against a validator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("specifier {0:?} required by mapping validator is missing")]
    MissingSpecifier(String),

    #[error("specifier {specifier:?} value {value:?} is not a decimal")]
    NotDecimal { specifier: String, value: String },
}
