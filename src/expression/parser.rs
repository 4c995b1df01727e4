use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::FormatError;

/// Operators that may prefix an operand inside `{...}`.
pub const OPERATORS: [char; 5] = ['!', '+', '-', '$', '%'];

/// Parse one `{operator?operand}` token into its operator (if any) and operand.
///
/// ```
/// # use oddsfeed::expression::parse_expression;
/// assert_eq!(parse_expression("{!periodnr}").unwrap(), (Some('!'), "periodnr"));
/// assert_eq!(parse_expression("{total}").unwrap(), (None, "total"));
/// assert!(parse_expression("$competitor1}").is_err());
/// ```
pub fn parse_expression(expression: &str) -> Result<(Option<char>, &str), FormatError> {
    let invalid = || FormatError::InvalidExpression(expression.to_owned());

    let body = expression
        .strip_prefix('{')
        .and_then(|it| it.strip_suffix('}'))
        .ok_or_else(invalid)?;
    if body.is_empty() || body.contains(['{', '}']) {
        return Err(invalid());
    }

    let mut chars = body.chars();
    match chars.next() {
        Some(first) if OPERATORS.contains(&first) => {
            let operand = chars.as_str();
            if operand.is_empty() {
                return Err(invalid());
            }
            Ok((Some(first), operand))
        }
        _ => Ok((None, body)),
    }
}

/// A name template split into its expression tokens and a positional format string.
///
/// For `"{$competitor1} to win by {+hcp}"` the format is `"{0} to win by {1}"` and the
/// expressions are `["{$competitor1}", "{+hcp}"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    format: String,
    expressions: Vec<String>,
}

impl Descriptor {
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Raw `{...}` tokens, in template order.
    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// Substitute `values` into the positional format. `values[i]` replaces `{i}`.
    pub fn render(&self, values: &[String]) -> String {
        placeholder_regex()
            .replace_all(&self.format, |captures: &Captures| {
                captures[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| values.get(i))
                    .cloned()
                    .unwrap_or_else(|| captures[0].to_owned())
            })
            .into_owned()
    }
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder regex is valid"))
}

/// Split `template` into a [`Descriptor`].
///
/// Fails if brackets are unbalanced or nested. Tokens are not validated here; use
/// [`parse_expression`] on each of them.
pub fn parse_descriptor(template: &str) -> Result<Descriptor, FormatError> {
    let invalid = || FormatError::InvalidDescriptor(template.to_owned());

    let mut format = String::with_capacity(template.len());
    let mut expressions = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(['{', '}']) {
        if rest[start..].starts_with('}') {
            return Err(invalid());
        }
        let end = rest[start + 1..]
            .find(['{', '}'])
            .map(|offset| start + 1 + offset)
            .filter(|&end| rest[end..].starts_with('}'))
            .ok_or_else(invalid)?;

        format.push_str(&rest[..start]);
        format.push_str(&format!("{{{}}}", expressions.len()));
        expressions.push(rest[start..=end].to_owned());
        rest = &rest[end + 1..];
    }
    format.push_str(rest);

    Ok(Descriptor {
        format,
        expressions,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_descriptor, parse_expression};
    use crate::error::FormatError;

    #[test]
    fn parses_operator_and_operand() {
        assert_eq!(
            parse_expression("{!periodNumber}").unwrap(),
            (Some('!'), "periodNumber")
        );
        assert_eq!(parse_expression("{+hcp}").unwrap(), (Some('+'), "hcp"));
        assert_eq!(parse_expression("{-hcp}").unwrap(), (Some('-'), "hcp"));
        assert_eq!(
            parse_expression("{$competitor1}").unwrap(),
            (Some('$'), "competitor1")
        );
        assert_eq!(parse_expression("{%player}").unwrap(), (Some('%'), "player"));
        assert_eq!(parse_expression("{total}").unwrap(), (None, "total"));
        assert_eq!(
            parse_expression("{!(inningnr+1)}").unwrap(),
            (Some('!'), "(inningnr+1)")
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expression in [
            "$competitor1}",
            "{$competitor1",
            "competitor1",
            "{}",
            "{!}",
            "{{total}",
            "{to}tal}",
        ] {
            assert_eq!(
                parse_expression(expression),
                Err(FormatError::InvalidExpression(expression.to_owned())),
                "{expression:?} should not parse"
            );
        }
    }

    #[test]
    fn splits_descriptor() {
        let descriptor = parse_descriptor("{$competitor1} to win by {+hcp} in {!setnr} set").unwrap();
        assert_eq!(descriptor.format(), "{0} to win by {1} in {2} set");
        assert_eq!(
            descriptor.expressions(),
            &["{$competitor1}", "{+hcp}", "{!setnr}"]
        );
    }

    #[test]
    fn descriptor_without_expressions() {
        let descriptor = parse_descriptor("1x2").unwrap();
        assert_eq!(descriptor.format(), "1x2");
        assert!(descriptor.expressions().is_empty());
        assert_eq!(descriptor.render(&[]), "1x2");
    }

    #[test]
    fn renders_values_in_order() {
        let descriptor = parse_descriptor("{total} goals, {!goalnr} goal").unwrap();
        assert_eq!(
            descriptor.render(&["2.5".to_owned(), "3rd".to_owned()]),
            "2.5 goals, 3rd goal"
        );
    }

    #[test]
    fn rejects_unbalanced_descriptor() {
        for template in ["{total goals", "total} goals", "{a{b}}", "x {a} }"] {
            assert_eq!(
                parse_descriptor(template),
                Err(FormatError::InvalidDescriptor(template.to_owned())),
                "{template:?} should not parse"
            );
        }
    }
}
