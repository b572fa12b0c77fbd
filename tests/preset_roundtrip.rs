//! Integration tests for search preset round-trips.

use auparse::core::rule::{parse_rule_expr, SearchOp};
use auparse::core::search_preset::{RuleSpec, SearchPreset};
use auparse::core::source::Source;
use auparse::{AuParser, RuleMode, StopPoint};

const LOG: &str = "\
type=LOGIN msg=audit(1143146623.787:142): login pid=2027 uid=0 old auid=4294967295 new auid=48
type=USER_LOGIN msg=audit(1143146623.879:146): user pid=2027 uid=0 auid=48 msg='uid=48: exe=\"/bin/login\" (hostname=?, addr=?, terminal=tty3 res=success)'
";

fn parser() -> AuParser {
    AuParser::new(Source::Buffer(LOG.to_string())).expect("buffer source")
}

#[test]
fn empty_parser_captures_empty_preset() {
    let preset = SearchPreset::from_parser("nothing", &parser());
    assert!(preset.rules.is_empty());
    assert_eq!(preset.mode, RuleMode::Clear);
    assert_eq!(preset.stop, StopPoint::Event);
}

#[test]
fn preset_roundtrip_preserves_search() {
    let mut original = parser();
    original
        .search_add_item("auid", "=", Some("48"), RuleMode::Clear)
        .expect("add");
    original
        .search_add_item("terminal", "exists", None, RuleMode::And)
        .expect("add");
    original.search_set_stop(StopPoint::Field);

    let preset = SearchPreset::from_parser("tty logins", &original);
    assert_eq!(preset.name, "tty logins");

    let mut restored = parser();
    preset.apply(&mut restored).expect("apply");
    assert_eq!(restored.search_rules(), original.search_rules());
    assert_eq!(restored.search_mode(), RuleMode::And);
    assert_eq!(restored.search_stop(), StopPoint::Field);

    assert!(restored.search_next_event().expect("search runs"));
    assert_eq!(restored.serial(), 146);
    assert_eq!(restored.field_name(), Some("terminal"));
}

#[test]
fn preset_serialization_roundtrip() {
    let preset = SearchPreset {
        name: "serde test".to_string(),
        mode: RuleMode::Or,
        stop: StopPoint::Record,
        rules: vec![
            RuleSpec {
                field: "auid".into(),
                op: SearchOp::NotEqual,
                value: Some("0".into()),
            },
            RuleSpec {
                field: "exe".into(),
                op: SearchOp::Exists,
                value: None,
            },
        ],
    };

    let json = serde_json::to_string(&preset).expect("serialize");
    assert!(json.contains("\"!=\""), "Operator stored symbolically: {json}");
    assert!(json.contains("\"or\""), "Mode stored lowercase: {json}");

    let restored: SearchPreset = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, preset);
}

#[test]
fn preset_file_roundtrip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("root.json");

    let mut p = parser();
    p.search_add_item("uid", "=", Some("0"), RuleMode::Clear)
        .expect("add");
    let preset = SearchPreset::from_parser("root", &p);
    preset.save(&path).expect("save");

    let loaded = SearchPreset::load(&path).expect("load");
    assert_eq!(loaded, preset);
}

#[test]
fn loading_garbage_is_a_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").expect("write");
    let msg = SearchPreset::load(&path)
        .expect_err("invalid preset")
        .to_string();
    assert!(msg.contains("Invalid preset"), "Should describe the problem: {msg}");
}

#[test]
fn rule_expressions_feed_search_add_item() {
    let mut p = parser();
    for (expr, how) in [("uid=0", RuleMode::Clear), ("res", RuleMode::And)] {
        let (field, op, value) = parse_rule_expr(expr).expect("valid expression");
        p.search_add_item(&field, op.as_str(), value.as_deref(), how)
            .expect("add");
    }
    assert_eq!(p.search_rules().len(), 2);
    assert!(p.search_next_event().expect("search runs"));
    assert_eq!(p.serial(), 146);
}
