use std::sync::Arc;

use derive_more::From;
use rust_decimal::Decimal;

use crate::{mapping::parse_decimal, specifiers::Specifiers};

use super::NameExpressionError;

/// Arithmetic applied by an [`ExpressionOperand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
}

impl ArithmeticOperation {
    fn apply(self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        match self {
            ArithmeticOperation::Add => lhs.checked_add(rhs),
            ArithmeticOperation::Subtract => lhs.checked_sub(rhs),
        }
    }
}

/// Reads one specifier value.
#[derive(Debug, Clone)]
pub struct SimpleOperand {
    specifiers: Arc<Specifiers>,
    specifier: String,
}

impl SimpleOperand {
    pub fn new(specifiers: Arc<Specifiers>, specifier: impl Into<String>) -> SimpleOperand {
        SimpleOperand {
            specifiers,
            specifier: specifier.into(),
        }
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn get_int(&self) -> Result<i64, NameExpressionError> {
        parse_int(&self.specifier, self.raw()?)
    }

    pub fn get_decimal(&self) -> Result<Decimal, NameExpressionError> {
        parse_specifier_decimal(&self.specifier, self.raw()?)
    }

    pub fn get_string(&self) -> Result<String, NameExpressionError> {
        self.raw().map(str::to_owned)
    }

    fn raw(&self) -> Result<&str, NameExpressionError> {
        raw_value(&self.specifiers, &self.specifier)
    }
}

/// Applies `operation` with a static value to one numeric specifier, e.g. `(inningnr+1)`.
#[derive(Debug, Clone)]
pub struct ExpressionOperand {
    specifiers: Arc<Specifiers>,
    specifier: String,
    operation: ArithmeticOperation,
    value: Decimal,
}

impl ExpressionOperand {
    pub fn new(
        specifiers: Arc<Specifiers>,
        specifier: impl Into<String>,
        operation: ArithmeticOperation,
        value: Decimal,
    ) -> ExpressionOperand {
        ExpressionOperand {
            specifiers,
            specifier: specifier.into(),
            operation,
            value,
        }
    }

    pub fn get_int(&self) -> Result<i64, NameExpressionError> {
        let raw = raw_value(&self.specifiers, &self.specifier)?;
        let base = parse_int(&self.specifier, raw)?;
        let result = self.apply(Decimal::from(base), raw)?;
        integral(result).ok_or_else(|| NameExpressionError::NotInteger {
            specifier: self.specifier.clone(),
            value: result.to_string(),
        })
    }

    pub fn get_decimal(&self) -> Result<Decimal, NameExpressionError> {
        let raw = raw_value(&self.specifiers, &self.specifier)?;
        let base = parse_specifier_decimal(&self.specifier, raw)?;
        self.apply(base, raw)
    }

    fn apply(&self, base: Decimal, raw: &str) -> Result<Decimal, NameExpressionError> {
        self.operation
            .apply(base, self.value)
            .ok_or_else(|| NameExpressionError::Overflow {
                specifier: self.specifier.clone(),
                value: raw.to_owned(),
            })
    }

    /// Always fails: the value of an arithmetic expression is numeric.
    pub fn get_string(&self) -> Result<String, NameExpressionError> {
        Err(NameExpressionError::NotSupported(
            "expression operands have no string value",
        ))
    }
}

/// An operand of a name expression.
#[derive(Debug, Clone, From)]
pub enum Operand {
    Simple(SimpleOperand),
    Expression(ExpressionOperand),
}

impl Operand {
    /// Build an operand from its textual form: either a specifier name (`total`) or arithmetic
    /// over a specifier enclosed in parentheses (`(total+1)`, `(inningnr-1)`).
    pub fn parse(specifiers: Arc<Specifiers>, operand: &str) -> Result<Operand, NameExpressionError> {
        let invalid = || NameExpressionError::InvalidOperand(operand.to_owned());

        let Some(inner) = operand.strip_prefix('(') else {
            if operand.is_empty() || operand.contains(['(', ')']) {
                return Err(invalid());
            }
            return Ok(SimpleOperand::new(specifiers, operand).into());
        };
        let inner = inner.strip_suffix(')').ok_or_else(invalid)?;

        // The first character belongs to the specifier name, so a leading sign is not an operator.
        let position = inner
            .char_indices()
            .skip(1)
            .find(|(_, c)| matches!(c, '+' | '-'))
            .map(|(i, _)| i)
            .ok_or_else(invalid)?;
        let (specifier, rest) = inner.split_at(position);
        let operation = if rest.starts_with('+') {
            ArithmeticOperation::Add
        } else {
            ArithmeticOperation::Subtract
        };
        let value = parse_decimal(&rest[1..]).ok_or_else(invalid)?;

        Ok(ExpressionOperand::new(specifiers, specifier.trim(), operation, value).into())
    }

    pub fn get_int(&self) -> Result<i64, NameExpressionError> {
        match self {
            Operand::Simple(operand) => operand.get_int(),
            Operand::Expression(operand) => operand.get_int(),
        }
    }

    pub fn get_decimal(&self) -> Result<Decimal, NameExpressionError> {
        match self {
            Operand::Simple(operand) => operand.get_decimal(),
            Operand::Expression(operand) => operand.get_decimal(),
        }
    }

    pub fn get_string(&self) -> Result<String, NameExpressionError> {
        match self {
            Operand::Simple(operand) => operand.get_string(),
            Operand::Expression(operand) => operand.get_string(),
        }
    }
}

fn raw_value<'a>(specifiers: &'a Specifiers, name: &str) -> Result<&'a str, NameExpressionError> {
    specifiers
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| NameExpressionError::MissingSpecifier(name.to_owned()))
}

fn parse_int(specifier: &str, value: &str) -> Result<i64, NameExpressionError> {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| NameExpressionError::NotInteger {
            specifier: specifier.to_owned(),
            value: value.to_owned(),
        })
}

fn parse_specifier_decimal(specifier: &str, value: &str) -> Result<Decimal, NameExpressionError> {
    parse_decimal(value).ok_or_else(|| NameExpressionError::NotDecimal {
        specifier: specifier.to_owned(),
        value: value.to_owned(),
    })
}

fn integral(value: Decimal) -> Option<i64> {
    if value.fract().is_zero() {
        i64::try_from(value.trunc()).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use rust_decimal::Decimal;

    use super::{ArithmeticOperation, ExpressionOperand, Operand, SimpleOperand};
    use crate::expression::NameExpressionError;

    fn specifiers(pairs: &[(&str, &str)]) -> Arc<HashMap<String, String>> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn simple_operand_reads_values() {
        let specifiers = specifiers(&[("periodnr", "2"), ("total", "2.5")]);

        let period = SimpleOperand::new(specifiers.clone(), "periodnr");
        assert_eq!(period.get_int().unwrap(), 2);
        assert_eq!(period.get_decimal().unwrap(), Decimal::from(2));
        assert_eq!(period.get_string().unwrap(), "2");

        let total = SimpleOperand::new(specifiers, "total");
        assert_eq!(total.get_decimal().unwrap(), Decimal::new(25, 1));
        assert!(matches!(
            total.get_int(),
            Err(NameExpressionError::NotInteger { .. })
        ));
    }

    #[test]
    fn simple_operand_missing_specifier() {
        let operand = SimpleOperand::new(specifiers(&[]), "total");
        assert!(matches!(
            operand.get_string(),
            Err(NameExpressionError::MissingSpecifier(name)) if name == "total"
        ));
        assert!(matches!(
            operand.get_int(),
            Err(NameExpressionError::MissingSpecifier(_))
        ));
    }

    #[test]
    fn expression_operand_applies_operation() {
        let specifiers = specifiers(&[("inningnr", "3"), ("total", "2.5")]);

        let next = ExpressionOperand::new(
            specifiers.clone(),
            "inningnr",
            ArithmeticOperation::Add,
            Decimal::ONE,
        );
        assert_eq!(next.get_int().unwrap(), 4);

        let lower = ExpressionOperand::new(
            specifiers,
            "total",
            ArithmeticOperation::Subtract,
            Decimal::new(5, 1),
        );
        assert_eq!(lower.get_decimal().unwrap(), Decimal::from(2));
    }

    #[test]
    fn expression_operand_overflow_is_an_error() {
        let operand = ExpressionOperand::new(
            specifiers(&[("total", "79228162514264337593543950335")]),
            "total",
            ArithmeticOperation::Add,
            Decimal::ONE,
        );
        assert!(matches!(
            operand.get_decimal(),
            Err(NameExpressionError::Overflow { specifier, .. }) if specifier == "total"
        ));

        let operand = ExpressionOperand::new(
            specifiers(&[("total", "-79228162514264337593543950335")]),
            "total",
            ArithmeticOperation::Subtract,
            Decimal::ONE,
        );
        assert!(matches!(
            operand.get_decimal(),
            Err(NameExpressionError::Overflow { .. })
        ));
    }

    #[test]
    fn expression_operand_has_no_string_value() {
        let operand = ExpressionOperand::new(
            specifiers(&[("inningnr", "3")]),
            "inningnr",
            ArithmeticOperation::Add,
            Decimal::ONE,
        );
        assert!(matches!(
            operand.get_string(),
            Err(NameExpressionError::NotSupported(_))
        ));
    }

    #[test]
    fn parses_operands() {
        let specifiers = specifiers(&[("inningnr", "3"), ("hcp", "-1")]);

        let operand = Operand::parse(specifiers.clone(), "inningnr").unwrap();
        assert!(matches!(operand, Operand::Simple(_)));

        let operand = Operand::parse(specifiers.clone(), "(inningnr+1)").unwrap();
        assert!(matches!(operand, Operand::Expression(_)));
        assert_eq!(operand.get_int().unwrap(), 4);

        let operand = Operand::parse(specifiers.clone(), "(hcp-2)").unwrap();
        assert_eq!(operand.get_int().unwrap(), -3);

        for invalid in ["", "(inningnr", "(inningnr)", "(inningnr+x)", "a)"] {
            assert!(
                matches!(
                    Operand::parse(specifiers.clone(), invalid),
                    Err(NameExpressionError::InvalidOperand(_))
                ),
                "{invalid:?} should not parse"
            );
        }
    }
}
