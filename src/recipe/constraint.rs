//! Translation of manifest dependency constraints into recipe lines.
//!
//! A raw spec is either a bare version (`"1.2.3"`, meaning `==`) or one of the
//! comparison operators `<`, `>`, `<=`, `>=` glued directly to a version
//! (`">=1.2.3"`). Anything else is rejected rather than guessed at.
//!
//! Each entry becomes one line of the recipe's run requirements:
//!
//! ```text
//!     - max >= 24.4
//! ```

use std::fmt;
use thiserror::Error;

/// Errors produced while translating dependency constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("malformed version spec for dependency '{name}': {spec:?}")]
    MalformedVersionSpec { name: String, spec: String },

    #[error("unsupported operator '{operator}' in version spec for dependency '{name}'")]
    UnsupportedOperator { name: String, operator: String },
}

/// Comparison operator of a normalized constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Two-character tokens must be tried before their one-character prefixes.
const SUPPORTED: [(&str, Operator); 4] = [
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("<", Operator::Lt),
    (">", Operator::Gt),
];

// Same ordering rule: "!=" before "!", "~=" before "~".
const UNSUPPORTED: [&str; 5] = ["!=", "~=", "~", "^", "!"];

/// Characters that may only appear as part of a leading operator.
const OPERATOR_CHARS: [char; 5] = ['<', '>', '=', '!', '~'];

/// Separators of compound expressions such as `">=1.0,<2.0"`.
const COMPOUND_SEPARATORS: [char; 2] = [',', '|'];

/// A single dependency constraint after operator detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedConstraint {
    pub name: String,
    pub operator: Operator,
    pub version: String,
}

impl NormalizedConstraint {
    /// Parse one `name = "spec"` entry.
    ///
    /// The version token is kept verbatim, including any whitespace.
    pub fn parse(name: &str, spec: &str) -> Result<Self, ConstraintError> {
        let malformed = || ConstraintError::MalformedVersionSpec {
            name: name.to_string(),
            spec: spec.to_string(),
        };

        if spec.is_empty() || spec.contains(COMPOUND_SEPARATORS) {
            return Err(malformed());
        }

        if let Some(op) = UNSUPPORTED.iter().find(|op| spec.starts_with(**op)) {
            return Err(ConstraintError::UnsupportedOperator {
                name: name.to_string(),
                operator: op.to_string(),
            });
        }

        let (operator, version) = SUPPORTED
            .iter()
            .find_map(|(token, op)| spec.strip_prefix(*token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Eq, spec));

        // Catches "<", "=1.0", "<>1.0", ">=!1.0", ">=^1.0" and ">=1.0 <2.0".
        if version.is_empty() || version.contains(OPERATOR_CHARS) || version.starts_with('^') {
            return Err(malformed());
        }

        Ok(Self {
            name: name.to_string(),
            operator,
            version: version.to_string(),
        })
    }

    /// Format as a recipe requirement line.
    pub fn recipe_line(&self) -> String {
        format!("    - {}", self)
    }
}

impl fmt::Display for NormalizedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.operator, self.version)
    }
}

/// Translate dependency entries into recipe lines, preserving input order.
///
/// Fails on the first malformed entry; a partial list is never returned.
pub fn translate<I, K, V>(dependencies: I) -> Result<Vec<String>, ConstraintError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    dependencies
        .into_iter()
        .map(|(name, spec)| {
            NormalizedConstraint::parse(name.as_ref(), spec.as_ref()).map(|c| c.recipe_line())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn malformed(name: &str, spec: &str) -> ConstraintError {
        ConstraintError::MalformedVersionSpec {
            name: name.to_string(),
            spec: spec.to_string(),
        }
    }

    #[test]
    fn bare_version_means_equality() {
        assert_eq!(translate([("a", "1.0.0")]).unwrap(), vec!["    - a == 1.0.0"]);
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(translate([("a", ">=1.2.3")]).unwrap(), vec!["    - a >= 1.2.3"]);
        assert_eq!(translate([("a", "<=1.0")]).unwrap(), vec!["    - a <= 1.0"]);
    }

    #[test]
    fn one_character_operators() {
        assert_eq!(translate([("a", "<2.0")]).unwrap(), vec!["    - a < 2.0"]);
        assert_eq!(translate([("a", ">2.0")]).unwrap(), vec!["    - a > 2.0"]);
    }

    #[test]
    fn input_order_is_preserved() {
        let deps = vec![("b", ">2.0"), ("a", "<=1.0"), ("c", "0.1")];
        assert_eq!(
            translate(deps).unwrap(),
            vec!["    - b > 2.0", "    - a <= 1.0", "    - c == 0.1"]
        );
    }

    #[test]
    fn duplicate_names_are_not_collapsed() {
        let deps = vec![("a", ">=1.0"), ("a", "<2.0")];
        assert_eq!(translate(deps).unwrap().len(), 2);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let deps: Vec<(String, String)> = Vec::new();
        assert!(translate(deps).unwrap().is_empty());
    }

    #[test]
    fn lone_operator_is_malformed() {
        assert_eq!(translate([("a", "<")]), Err(malformed("a", "<")));
        assert_eq!(translate([("a", ">")]), Err(malformed("a", ">")));
        assert_eq!(translate([("a", "<=")]), Err(malformed("a", "<=")));
        assert_eq!(translate([("a", ">=")]), Err(malformed("a", ">=")));
    }

    #[test]
    fn empty_spec_is_malformed() {
        assert_eq!(translate([("a", "")]), Err(malformed("a", "")));
    }

    #[test]
    fn unknown_operator_shapes_are_malformed() {
        for spec in ["=1.0", "==1.0", "<>1.0", ">>1.0", "<==1.0"] {
            assert_eq!(translate([("a", spec)]), Err(malformed("a", spec)), "{spec}");
        }
    }

    #[test]
    fn compound_ranges_are_rejected() {
        assert_eq!(
            translate([("a", ">=1.0,<2.0")]),
            Err(malformed("a", ">=1.0,<2.0"))
        );
        assert_eq!(translate([("a", "1.0|2.0")]), Err(malformed("a", "1.0|2.0")));
        assert_eq!(
            translate([("a", ">=1.0 <2.0")]),
            Err(malformed("a", ">=1.0 <2.0"))
        );
    }

    #[test]
    fn operators_inside_the_version_are_malformed() {
        for spec in [">=!1.0", "<~1.0", ">^1.0", "1.0=", "<2.0!"] {
            assert_eq!(translate([("a", spec)]), Err(malformed("a", spec)), "{spec}");
        }
    }

    #[test]
    fn unsupported_operators_are_named() {
        let cases = [("!=1.0", "!="), ("~=1.0", "~="), ("~1.0", "~"), ("^1.0", "^")];
        for (spec, operator) in cases {
            assert_eq!(
                translate([("pkg", spec)]),
                Err(ConstraintError::UnsupportedOperator {
                    name: "pkg".to_string(),
                    operator: operator.to_string(),
                })
            );
        }
    }

    #[test]
    fn first_bad_entry_aborts_translation() {
        let deps = vec![("ok", "1.0"), ("bad", "!=2.0"), ("worse", "<")];
        let err = translate(deps).unwrap_err();
        assert!(matches!(err, ConstraintError::UnsupportedOperator { ref name, .. } if name == "bad"));
    }

    #[test]
    fn whitespace_passes_through_verbatim() {
        assert_eq!(translate([("a", "< 2.0")]).unwrap(), vec!["    - a <  2.0"]);
        assert_eq!(translate([("a", "1.0 ")]).unwrap(), vec!["    - a == 1.0 "]);
    }

    #[test]
    fn wildcard_versions_are_not_validated() {
        assert_eq!(translate([("max", "*")]).unwrap(), vec!["    - max == *"]);
        assert_eq!(translate([("max", ">=24.4.*")]).unwrap(), vec!["    - max >= 24.4.*"]);
    }

    #[test]
    fn translation_is_repeatable() {
        let deps = vec![("a", "<=1.0"), ("b", ">2.0")];
        assert_eq!(translate(deps.clone()).unwrap(), translate(deps).unwrap());
    }

    #[test]
    fn parse_exposes_operator_and_version() {
        let c = NormalizedConstraint::parse("max", ">=24.4").unwrap();
        assert_eq!(c.operator, Operator::Ge);
        assert_eq!(c.version, "24.4");
        assert_eq!(c.to_string(), "max >= 24.4");
    }

    #[test]
    fn error_messages_name_the_dependency() {
        let err = translate([("max", "<")]).unwrap_err();
        assert_eq!(err.to_string(), "malformed version spec for dependency 'max': \"<\"");
    }
}
