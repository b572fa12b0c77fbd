//! Search rules and the rule list the search engine evaluates.
//!
//! A [`Rule`] tests one field of a record. A [`RuleList`] combines its
//! rules with one list-wide [`RuleMode`]; mixing AND and OR in one list is
//! rejected.

use crate::util::error::{invalid_arg, AuparseError, Result};
use std::fmt;
use std::str::FromStr;

// ── Operators ───────────────────────────────────────────────────────────

/// Comparison a rule applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SearchOp {
    /// The field is present, whatever its value.
    #[serde(rename = "exists")]
    Exists,
    /// The raw value equals the rule value.
    #[serde(rename = "=")]
    Equal,
    /// The raw value differs from the rule value.
    #[serde(rename = "!=")]
    NotEqual,
}

impl SearchOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Equal => "=",
            Self::NotEqual => "!=",
        }
    }
}

impl FromStr for SearchOp {
    type Err = AuparseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exists" => Ok(Self::Exists),
            "=" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            other => Err(invalid_arg(format!("unknown search operator '{other}'"))),
        }
    }
}

impl fmt::Display for SearchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Combination mode ────────────────────────────────────────────────────

/// How a new rule combines with the rules already in the list.
///
/// `Clear` empties the list before adding; a list built only from `Clear`
/// additions holds a single rule and matches like `Or`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    #[default]
    Clear,
    Or,
    And,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clear => "CLEAR",
            Self::Or => "OR",
            Self::And => "AND",
        })
    }
}

// ── Stop point ──────────────────────────────────────────────────────────

/// Where the cursors are left after a search match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPoint {
    /// First record, first field of the matching event.
    #[default]
    Event,
    /// First field of the matching record.
    Record,
    /// The matching field itself.
    Field,
}

impl FromStr for StopPoint {
    type Err = AuparseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "event" => Ok(Self::Event),
            "record" => Ok(Self::Record),
            "field" => Ok(Self::Field),
            other => Err(invalid_arg(format!("unknown stop point '{other}'"))),
        }
    }
}

impl TryFrom<i32> for StopPoint {
    type Error = AuparseError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Event),
            1 => Ok(Self::Record),
            2 => Ok(Self::Field),
            other => Err(invalid_arg(format!("stop point {other} out of range"))),
        }
    }
}

// ── Rules ───────────────────────────────────────────────────────────────

/// One search predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub field: String,
    pub op: SearchOp,
    /// Compared value; `None` exactly when `op` is [`SearchOp::Exists`].
    pub value: Option<String>,
}

impl Rule {
    /// Build a validated rule.
    ///
    /// # Errors
    /// [`AuparseError::InvalidArgument`] for an empty field name or a
    /// comparison without a value.
    pub fn new(field: &str, op: SearchOp, value: Option<&str>) -> Result<Self> {
        if field.is_empty() {
            return Err(invalid_arg("search rule needs a field name"));
        }
        let value = match op {
            SearchOp::Exists => None,
            SearchOp::Equal | SearchOp::NotEqual => Some(
                value
                    .ok_or_else(|| invalid_arg(format!("operator '{op}' needs a value")))?
                    .to_string(),
            ),
        };
        Ok(Self {
            field: field.to_string(),
            op,
            value,
        })
    }

    /// Test one field value against this rule.
    pub fn matches_value(&self, value: &str) -> bool {
        match self.op {
            SearchOp::Exists => true,
            SearchOp::Equal => self.value.as_deref() == Some(value),
            SearchOp::NotEqual => self.value.as_deref() != Some(value),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}{}{}", self.field, self.op, v),
            None => write!(f, "{} exists", self.field),
        }
    }
}

/// Parse a compact rule expression: `name=value`, `name!=value`, or a bare
/// `name` meaning "exists".
///
/// # Errors
/// [`AuparseError::InvalidArgument`] for an empty field name.
pub fn parse_rule_expr(expr: &str) -> Result<(String, SearchOp, Option<String>)> {
    let expr = expr.trim();
    let (field, op, value) = if let Some((field, value)) = expr.split_once("!=") {
        (field, SearchOp::NotEqual, Some(value.to_string()))
    } else if let Some((field, value)) = expr.split_once('=') {
        (field, SearchOp::Equal, Some(value.to_string()))
    } else {
        (expr, SearchOp::Exists, None)
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(invalid_arg(format!("rule '{expr}' has no field name")));
    }
    Ok((field.to_string(), op, value))
}

// ── Rule list ───────────────────────────────────────────────────────────

/// Ordered rules sharing one combination mode.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<Rule>,
    mode: RuleMode,
}

impl RuleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `rule` combined with `how`.
    ///
    /// `Clear` empties the list first. Otherwise an established AND/OR mode
    /// must match `how`.
    ///
    /// # Errors
    /// [`AuparseError::RuleConflict`] when `how` contradicts the list's mode;
    /// the list is left unchanged.
    pub fn add(&mut self, rule: Rule, how: RuleMode) -> Result<()> {
        if how == RuleMode::Clear {
            self.clear();
        } else if self.mode != RuleMode::Clear && self.mode != how {
            return Err(AuparseError::RuleConflict {
                established: self.mode.to_string(),
                requested: how.to_string(),
            });
        }
        tracing::debug!("Adding search rule {rule} ({how})");
        self.rules.push(rule);
        self.mode = how;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.mode = RuleMode::Clear;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(field: &str, value: &str) -> Rule {
        Rule::new(field, SearchOp::Equal, Some(value)).expect("valid rule")
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("exists".parse::<SearchOp>().ok(), Some(SearchOp::Exists));
        assert_eq!("!=".parse::<SearchOp>().ok(), Some(SearchOp::NotEqual));
        assert!("~".parse::<SearchOp>().is_err());
    }

    #[test]
    fn test_rule_validation() {
        assert!(Rule::new("", SearchOp::Exists, None).is_err());
        assert!(Rule::new("auid", SearchOp::Equal, None).is_err());
        let r = Rule::new("auid", SearchOp::Exists, Some("ignored")).expect("valid");
        assert_eq!(r.value, None);
    }

    #[test]
    fn test_matches_value() {
        assert!(eq("uid", "0").matches_value("0"));
        assert!(!eq("uid", "0").matches_value("00"));
        let ne = Rule::new("uid", SearchOp::NotEqual, Some("0")).expect("valid");
        assert!(ne.matches_value("500"));
        assert!(!ne.matches_value("0"));
    }

    #[test]
    fn test_clear_replaces_list() {
        let mut list = RuleList::new();
        list.add(eq("a", "1"), RuleMode::Clear).expect("add");
        list.add(eq("b", "2"), RuleMode::Clear).expect("add");
        assert_eq!(list.len(), 1);
        assert_eq!(list.rules()[0].field, "b");
    }

    #[test]
    fn test_mixing_and_or_is_rejected() {
        let mut list = RuleList::new();
        list.add(eq("a", "1"), RuleMode::Clear).expect("add");
        list.add(eq("b", "2"), RuleMode::And).expect("single rule may become AND");
        let err = list.add(eq("c", "3"), RuleMode::Or).expect_err("conflict");
        assert!(matches!(err, AuparseError::RuleConflict { .. }));
        assert_eq!(list.len(), 2);
        assert_eq!(list.mode(), RuleMode::And);
    }

    #[test]
    fn test_stop_point_conversions() {
        assert_eq!("Record".parse::<StopPoint>().ok(), Some(StopPoint::Record));
        assert_eq!(StopPoint::try_from(2).ok(), Some(StopPoint::Field));
        assert!(StopPoint::try_from(3).is_err());
        assert!("line".parse::<StopPoint>().is_err());
    }

    #[test]
    fn test_parse_rule_expr() {
        let (f, op, v) = parse_rule_expr("auid!=0").expect("valid");
        assert_eq!((f.as_str(), op, v.as_deref()), ("auid", SearchOp::NotEqual, Some("0")));
        let (f, op, v) = parse_rule_expr("exe=/bin/a=b").expect("valid");
        assert_eq!((f.as_str(), op, v.as_deref()), ("exe", SearchOp::Equal, Some("/bin/a=b")));
        let (_, op, v) = parse_rule_expr("auid").expect("valid");
        assert_eq!((op, v), (SearchOp::Exists, None));
        assert!(parse_rule_expr("=5").is_err());
    }
}
