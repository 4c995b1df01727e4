//! Name templates and the expressions embedded in them.
//!
//! Market and outcome names are templates such as `"{!periodnr} period - total {total}"`. Each
//! `{...}` token is an expression made of an optional operator and an operand:
//!
//! | token          | expression                      | example output  |
//! |----------------|---------------------------------|-----------------|
//! | `{total}`      | [`NameExpression::Cardinal`]     | `2.5`           |
//! | `{!periodnr}`  | [`NameExpression::Ordinal`]      | `2nd`           |
//! | `{+hcp}`       | [`NameExpression::Plus`]         | `+1.5`          |
//! | `{-hcp}`       | [`NameExpression::Minus`]        | `-1.5`          |
//! | `{$event}`     | [`NameExpression::Entity`]       | `Home vs Away`  |
//! | `{%player}`    | [`NameExpression::PlayerProfile`]| `Lionel Messi`  |
//!
//! Operands are specifier names or arithmetic over one specifier, e.g. `{!(inningnr+1)}`.
mod name_expression;
mod operand;
mod parser;

pub use name_expression::{EntityTarget, NameExpression, NameExpressionFactory};
pub use operand::{ArithmeticOperation, ExpressionOperand, Operand, SimpleOperand};
pub use parser::{parse_descriptor, parse_expression, Descriptor, OPERATORS};

pub(crate) use name_expression::resolve_profile_names;
#[cfg(test)]
pub(crate) use name_expression::tests;

use crate::{entities::EntityError, Urn};

/// Name expression could not be built or evaluated.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum NameExpressionError {
    #[error("specifier {0:?} is missing")]
    MissingSpecifier(String),

    #[error("specifier {specifier:?} value {value:?} is not an integer")]
    NotInteger { specifier: String, value: String },

    #[error("specifier {specifier:?} value {value:?} is not a decimal")]
    NotDecimal { specifier: String, value: String },

    #[error("arithmetic on specifier {specifier:?} value {value:?} overflows")]
    Overflow { specifier: String, value: String },

    /// The operand does not support the requested conversion.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// Operator is recognized but cannot be applied to the operand.
    #[error("operand {operand:?} is not supported by operator {operator:?}")]
    UnsupportedOperand { operator: char, operand: String },

    #[error("operator {0:?} is not supported")]
    UnsupportedOperator(char),

    #[error("invalid operand {0:?}")]
    InvalidOperand(String),

    #[error("invalid profile id {0:?}")]
    InvalidUrn(String),

    #[error("profile id {0} is neither a player nor a competitor")]
    UnsupportedUrnType(Urn),

    #[error("no {culture} name available for {entity}")]
    NameNotFound { entity: String, culture: String },

    #[error(transparent)]
    Lookup(#[from] EntityError),
}
