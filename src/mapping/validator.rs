use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use rust_decimal::Decimal;

use crate::specifiers::Specifiers;

use super::{ValidatorBuildError, ValidatorError};

const CLAUSE_SEPARATOR: char = '|';

fn decimal_clause_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(?P<specifier>[^~=]+)~\*\.(?P<fraction>0|25|5|75)$")
            .expect("decimal clause regex is valid")
    })
}

/// Builds [`MappingValidator`]s from `valid_for` expressions.
///
/// The factory is stateless. It is a value so that callers can hold and pass it explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingValidatorFactory;

impl MappingValidatorFactory {
    pub fn new() -> MappingValidatorFactory {
        MappingValidatorFactory
    }

    /// Parse a `valid_for` expression.
    ///
    /// A single clause yields a single validator. Multiple clauses yield
    /// [`MappingValidator::Composite`] that requires all of them to hold.
    pub fn build(&self, expression: &str) -> Result<MappingValidator, ValidatorBuildError> {
        if expression.trim().is_empty() {
            return Err(ValidatorBuildError::EmptyExpression);
        }

        let mut validators = expression
            .split(CLAUSE_SEPARATOR)
            .map(build_clause)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if validators.len() == 1 {
            validators.remove(0)
        } else {
            MappingValidator::Composite(validators)
        })
    }
}

fn build_clause(clause: &str) -> Result<MappingValidator, ValidatorBuildError> {
    let clause = clause.trim();

    let exact = clause
        .split_once('=')
        .filter(|(specifier, _)| !specifier.contains('~'));

    if let Some((specifier, value)) = exact {
        if specifier.trim().is_empty() || value.is_empty() {
            return Err(ValidatorBuildError::InvalidClause(clause.to_owned()));
        }
        return Ok(MappingValidator::SpecificValue {
            specifier: specifier.trim().to_owned(),
            value: value.to_owned(),
        });
    }

    if clause.contains('~') {
        let captures = decimal_clause_regex()
            .captures(clause)
            .ok_or_else(|| ValidatorBuildError::InvalidDecimalPattern(clause.to_owned()))?;
        let fraction = match &captures["fraction"] {
            "0" => Decimal::ZERO,
            "25" => Decimal::new(25, 2),
            "5" => Decimal::new(5, 1),
            "75" => Decimal::new(75, 2),
            _ => return Err(ValidatorBuildError::InvalidDecimalPattern(clause.to_owned())),
        };
        return Ok(MappingValidator::DecimalValue {
            specifier: captures["specifier"].trim().to_owned(),
            fraction,
        });
    }

    Err(ValidatorBuildError::InvalidClause(clause.to_owned()))
}

/// A parsed `valid_for` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingValidator {
    /// `specifier=value`
    SpecificValue { specifier: String, value: String },
    /// `specifier~*.fraction`
    DecimalValue { specifier: String, fraction: Decimal },
    /// All validators must hold.
    Composite(Vec<MappingValidator>),
}

impl MappingValidator {
    /// Check whether `specifiers` satisfy the validator.
    ///
    /// # Errors
    ///
    /// - [`ValidatorError::MissingSpecifier`] if a referenced specifier is absent.
    /// - [`ValidatorError::NotDecimal`] if a decimal clause references a non-numeric value.
    pub fn validate(&self, specifiers: &Specifiers) -> Result<bool, ValidatorError> {
        match self {
            MappingValidator::SpecificValue { specifier, value } => {
                let actual = get_specifier(specifiers, specifier)?;
                Ok(actual == value)
            }
            MappingValidator::DecimalValue {
                specifier,
                fraction,
            } => {
                let actual = get_specifier(specifiers, specifier)?;
                let parsed = parse_decimal(actual).ok_or_else(|| ValidatorError::NotDecimal {
                    specifier: specifier.clone(),
                    value: actual.to_owned(),
                })?;
                Ok(parsed.fract().abs() == *fraction)
            }
            MappingValidator::Composite(validators) => {
                for validator in validators {
                    if !validator.validate(specifiers)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

fn get_specifier<'a>(specifiers: &'a Specifiers, name: &str) -> Result<&'a str, ValidatorError> {
    specifiers
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ValidatorError::MissingSpecifier(name.to_owned()))
}

/// Parse a specifier value as decimal. Accepts an explicit leading `+`.
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    Decimal::from_str(value).ok()
}

impl fmt::Display for MappingValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingValidator::SpecificValue { specifier, value } => {
                write!(f, "{specifier}={value}")
            }
            MappingValidator::DecimalValue {
                specifier,
                fraction,
            } => {
                let digits = fraction.normalize().to_string();
                let digits = digits.strip_prefix("0.").unwrap_or(&digits);
                write!(f, "{specifier}~*.{digits}")
            }
            MappingValidator::Composite(validators) => {
                for (i, validator) in validators.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{CLAUSE_SEPARATOR}")?;
                    }
                    write!(f, "{validator}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{MappingValidator, MappingValidatorFactory};
    use crate::mapping::{ValidatorBuildError, ValidatorError};

    fn specifiers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_specific_value_validator() {
        let validator = MappingValidatorFactory.build("total=2.5").unwrap();
        assert_eq!(
            validator,
            MappingValidator::SpecificValue {
                specifier: "total".into(),
                value: "2.5".into()
            }
        );
    }

    #[test]
    fn builds_composite_validator() {
        let validator = MappingValidatorFactory
            .build("setnr=1|gamenr=2|total~*.5")
            .unwrap();
        let MappingValidator::Composite(validators) = &validator else {
            panic!("expected composite validator, got {validator:?}");
        };
        assert_eq!(validators.len(), 3);
        assert_eq!(validator.to_string(), "setnr=1|gamenr=2|total~*.5");
    }

    #[test]
    fn clause_without_operator_is_rejected() {
        assert_eq!(
            MappingValidatorFactory.build("total"),
            Err(ValidatorBuildError::InvalidClause("total".into()))
        );
        assert_eq!(
            MappingValidatorFactory.build(""),
            Err(ValidatorBuildError::EmptyExpression)
        );
        assert_eq!(
            MappingValidatorFactory.build("total~*.3"),
            Err(ValidatorBuildError::InvalidDecimalPattern("total~*.3".into()))
        );
        assert_eq!(
            MappingValidatorFactory.build("total="),
            Err(ValidatorBuildError::InvalidClause("total=".into()))
        );
    }

    #[test]
    fn specific_value_may_contain_tilde() {
        let validator = MappingValidatorFactory.build("variant=sr:x~y").unwrap();
        assert_eq!(
            validator,
            MappingValidator::SpecificValue {
                specifier: "variant".to_owned(),
                value: "sr:x~y".to_owned(),
            }
        );
        assert!(validator
            .validate(&specifiers(&[("variant", "sr:x~y")]))
            .unwrap());
    }

    #[test]
    fn specific_value_requires_exact_match() {
        let validator = MappingValidatorFactory.build("total=2.5").unwrap();
        assert!(validator.validate(&specifiers(&[("total", "2.5")])).unwrap());
        assert!(!validator.validate(&specifiers(&[("total", "2.50")])).unwrap());
        assert!(!validator.validate(&specifiers(&[("total", "3.5")])).unwrap());
    }

    #[test]
    fn decimal_value_matches_fraction() {
        let cases = [
            ("hcp~*.0", "2", true),
            ("hcp~*.0", "2.5", false),
            ("hcp~*.25", "1.25", true),
            ("hcp~*.25", "-1.25", true),
            ("hcp~*.25", "1.75", false),
            ("hcp~*.5", "0.5", true),
            ("hcp~*.5", "+3.50", true),
            ("hcp~*.75", "2.75", true),
            ("hcp~*.75", "2.5", false),
        ];
        for (expression, value, expected) in cases {
            let validator = MappingValidatorFactory.build(expression).unwrap();
            assert_eq!(
                validator.validate(&specifiers(&[("hcp", value)])).unwrap(),
                expected,
                "{expression} against {value}"
            );
        }
    }

    #[test]
    fn missing_specifier_is_an_error() {
        let validator = MappingValidatorFactory.build("total=2.5").unwrap();
        assert_eq!(
            validator.validate(&specifiers(&[("hcp", "1")])),
            Err(ValidatorError::MissingSpecifier("total".into()))
        );
    }

    #[test]
    fn non_decimal_value_is_an_error() {
        let validator = MappingValidatorFactory.build("total~*.5").unwrap();
        assert_eq!(
            validator.validate(&specifiers(&[("total", "abc")])),
            Err(ValidatorError::NotDecimal {
                specifier: "total".into(),
                value: "abc".into()
            })
        );
    }

    #[test]
    fn composite_requires_all_clauses() {
        let validator = MappingValidatorFactory.build("setnr=1|total~*.5").unwrap();
        assert!(validator
            .validate(&specifiers(&[("setnr", "1"), ("total", "10.5")]))
            .unwrap());
        assert!(!validator
            .validate(&specifiers(&[("setnr", "2"), ("total", "10.5")]))
            .unwrap());
        assert!(!validator
            .validate(&specifiers(&[("setnr", "1"), ("total", "10")]))
            .unwrap());
    }
}
