//! Serialisable search preset for named rule lists.
//!
//! [`SearchPreset`] captures the parser's search configuration (rules,
//! combination mode and stop point) and is stored as JSON between runs.

use super::parser::AuParser;
use super::rule::{RuleMode, SearchOp, StopPoint};
use crate::util::error::{invalid_arg, AuparseError, Result};
use std::path::Path;

/// One rule as stored in a preset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuleSpec {
    pub field: String,
    pub op: SearchOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A named, serialisable snapshot of the parser's search state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchPreset {
    /// Display name of the preset.
    pub name: String,
    /// How the rules combine. `clear` for a single-rule preset.
    #[serde(default)]
    pub mode: RuleMode,
    /// Where the cursors rest after a match.
    #[serde(default)]
    pub stop: StopPoint,
    pub rules: Vec<RuleSpec>,
}

impl SearchPreset {
    /// Create a preset from the parser's current rules.
    pub fn from_parser(name: &str, parser: &AuParser) -> Self {
        Self {
            name: name.to_owned(),
            mode: parser.search_mode(),
            stop: parser.search_stop(),
            rules: parser
                .search_rules()
                .iter()
                .map(|rule| RuleSpec {
                    field: rule.field.clone(),
                    op: rule.op,
                    value: rule.value.clone(),
                })
                .collect(),
        }
    }

    /// Replace the parser's search state with this preset.
    ///
    /// Rules are re-added one by one with the preset's mode, so every
    /// validation of [`AuParser::search_add_item`] applies.
    ///
    /// # Errors
    /// [`AuparseError::InvalidArgument`] for several rules stored with mode
    /// `clear`; any error from [`AuParser::search_add_item`]. The parser's
    /// search state is left cleared on error.
    pub fn apply(&self, parser: &mut AuParser) -> Result<()> {
        parser.search_clear();
        if self.mode == RuleMode::Clear && self.rules.len() > 1 {
            return Err(invalid_arg(format!(
                "preset '{}' holds {} rules but no AND/OR mode",
                self.name,
                self.rules.len()
            )));
        }
        for spec in &self.rules {
            let added = parser.search_add_item(
                &spec.field,
                spec.op.as_str(),
                spec.value.as_deref(),
                self.mode,
            );
            if let Err(e) = added {
                parser.search_clear();
                return Err(e);
            }
        }
        parser.search_set_stop(self.stop);
        tracing::debug!(
            "Applied search preset '{}' ({} rule(s), {})",
            self.name,
            self.rules.len(),
            self.mode
        );
        Ok(())
    }

    /// Read a preset from a JSON file.
    ///
    /// # Errors
    /// [`AuparseError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AuparseError::Config(format!("Failed to read preset {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            AuparseError::Config(format!("Invalid preset {}: {e}", path.display()))
        })
    }

    /// Write this preset to `path` as pretty-printed JSON.
    ///
    /// # Errors
    /// [`AuparseError::Config`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AuparseError::Config(format!("Failed to encode preset: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            AuparseError::Config(format!("Failed to write preset {}: {e}", path.display()))
        })?;
        tracing::info!("Saved search preset '{}' to {}", self.name, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::Source;

    fn parser() -> AuParser {
        AuParser::new(Source::Buffer(String::new())).expect("buffer source")
    }

    #[test]
    fn test_capture_and_apply() {
        let mut src = parser();
        src.search_add_item("uid", "=", Some("0"), RuleMode::Clear)
            .expect("add");
        src.search_add_item("pid", "exists", None, RuleMode::And)
            .expect("add");
        src.search_set_stop(StopPoint::Record);
        let preset = SearchPreset::from_parser("root activity", &src);
        assert_eq!(preset.mode, RuleMode::And);
        assert_eq!(preset.rules.len(), 2);

        let mut dst = parser();
        preset.apply(&mut dst).expect("apply");
        assert_eq!(dst.search_rules(), src.search_rules());
        assert_eq!(dst.search_mode(), RuleMode::And);
        assert_eq!(dst.search_stop(), StopPoint::Record);
    }

    #[test]
    fn test_single_rule_keeps_mode() {
        let preset = SearchPreset {
            name: "any auid".into(),
            mode: RuleMode::Or,
            stop: StopPoint::Event,
            rules: vec![RuleSpec {
                field: "auid".into(),
                op: SearchOp::Equal,
                value: Some("500".into()),
            }],
        };
        let mut p = parser();
        preset.apply(&mut p).expect("apply");
        assert_eq!(p.search_mode(), RuleMode::Or);
        p.search_add_item("auid", "=", Some("0"), RuleMode::Or)
            .expect("OR continues");
    }

    #[test]
    fn test_invalid_preset_leaves_search_cleared() {
        let preset = SearchPreset {
            name: "broken".into(),
            mode: RuleMode::And,
            stop: StopPoint::Field,
            rules: vec![
                RuleSpec {
                    field: "uid".into(),
                    op: SearchOp::Exists,
                    value: None,
                },
                RuleSpec {
                    field: "auid".into(),
                    op: SearchOp::Equal,
                    value: None,
                },
            ],
        };
        let mut p = parser();
        assert!(preset.apply(&mut p).is_err());
        assert!(p.search_rules().is_empty());
    }

    #[test]
    fn test_several_clear_rules_rejected() {
        let spec = RuleSpec {
            field: "uid".into(),
            op: SearchOp::Exists,
            value: None,
        };
        let preset = SearchPreset {
            name: "ambiguous".into(),
            mode: RuleMode::Clear,
            stop: StopPoint::Event,
            rules: vec![spec.clone(), spec],
        };
        let mut p = parser();
        assert!(matches!(
            preset.apply(&mut p),
            Err(AuparseError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"name":"n","rules":[{"field":"auid","op":"!=","value":"0"}]}"#;
        let preset: SearchPreset = serde_json::from_str(json).expect("parse");
        assert_eq!(preset.mode, RuleMode::Clear);
        assert_eq!(preset.stop, StopPoint::Event);
        assert_eq!(preset.rules[0].op, SearchOp::NotEqual);
    }
}
