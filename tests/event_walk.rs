//! Integration tests for event assembly and event/record/field traversal.

use auparse::core::source::Source;
use auparse::AuParser;
use std::io::{BufReader, Read, Write};

const BUF0: &str = "type=LOGIN msg=audit(1143146623.787:142): login pid=2027 uid=0 old auid=4294967295 new auid=48\n\
type=SYSCALL msg=audit(1143146623.875:143): arch=c000003e syscall=188 success=yes exit=0 a0=7fffffa9a9f0 a1=3958d11333 a2=5131f0 a3=20 items=1 pid=2027 auid=48 uid=0 gid=0 euid=0 suid=0 fsuid=0 egid=0 sgid=0 fsgid=0 tty=tty3 comm=\"login\" exe=\"/bin/login\" subj=system_u:system_r:local_login_t:s0-s0:c0.c255";

const BUF1: &str = "type=USER_LOGIN msg=audit(1143146623.879:146): user pid=2027 uid=0 auid=48 msg='uid=48: exe=\"/bin/login\" (hostname=?, addr=?, terminal=tty3 res=success)'";

const OPEN_EVENT: &str = "\
type=SYSCALL msg=audit(1143146700.100:200): arch=c000003e syscall=2 success=yes exit=3 a0=7fff0010 a1=0 a2=1b6 a3=0 items=1 pid=3001 auid=500 uid=500
type=CWD msg=audit(1143146700.100:200):  cwd=\"/home/user\"
type=PATH msg=audit(1143146700.100:200): item=0 name=\"/etc/passwd\" inode=1234 dev=fd:00 mode=0100644 ouid=0 ogid=0 rdev=00:00
type=USER_END msg=audit(1143146701.000:201): user pid=3002 uid=0 auid=500
";

fn buffers() -> AuParser {
    AuParser::new(Source::BufferArray(vec![BUF0.to_string(), BUF1.to_string()]))
        .expect("buffer array source")
}

/// `(serial, records, fields per record)` for every event in the parser.
fn walk(parser: &mut AuParser) -> Vec<(u64, usize, Vec<usize>)> {
    let mut events = Vec::new();
    while parser.next_event().expect("next_event") {
        let mut fields = Vec::new();
        let mut more = parser.first_record().expect("first_record");
        while more {
            fields.push(parser.num_fields());
            more = parser.next_record().expect("next_record");
        }
        events.push((parser.serial(), parser.num_records(), fields));
    }
    events
}

#[test]
fn buffer_array_yields_three_single_record_events() {
    let mut p = buffers();
    let events = walk(&mut p);
    assert_eq!(
        events,
        vec![(142, 1, vec![5]), (143, 1, vec![24]), (146, 1, vec![10])],
        "Unexpected event layout: {events:?}"
    );
}

#[test]
fn same_second_different_serial_splits_events() {
    let mut p = AuParser::new(Source::Buffer(BUF0.to_string())).expect("buffer source");
    assert!(p.next_event().expect("first event"));
    assert_eq!(p.record_type_name().as_deref(), Some("LOGIN"));
    assert_eq!(p.num_records(), 1);
    assert!(p.next_event().expect("second event"));
    assert_eq!(p.record_type_name().as_deref(), Some("SYSCALL"));
    assert_eq!(p.time(), 1143146623);
    assert_eq!(p.milli(), 875);
    assert!(!p.next_event().expect("exhausted"));
    assert!(!p.next_event().expect("stays exhausted"));
}

#[test]
fn shared_stamp_groups_lines_into_one_event() {
    let mut p = AuParser::new(Source::Buffer(OPEN_EVENT.to_string())).expect("buffer source");
    assert!(p.next_event().expect("event"));
    assert_eq!(p.num_records(), 3);
    assert_eq!(p.serial(), 200);

    assert!(p.find_record_type(1302));
    assert_eq!(p.record_type_name().as_deref(), Some("PATH"));
    assert!(p.find_record_type_range(1300, 1308));
    assert_eq!(p.record_type(), Some(1300));
    assert!(!p.find_record_type_range(1400, 1300));

    assert!(p.next_event().expect("event"));
    assert_eq!(p.serial(), 201);
    assert_eq!(p.num_records(), 1);
}

#[test]
fn field_walk_reads_names_and_values() {
    let mut p = buffers();
    assert!(p.first_record().expect("loads first event"));
    let mut pairs = Vec::new();
    assert!(p.first_field());
    loop {
        pairs.push(format!(
            "{}={}",
            p.field_name().unwrap_or_default(),
            p.field_str().unwrap_or_default()
        ));
        if !p.next_field() {
            break;
        }
    }
    assert_eq!(
        pairs,
        ["type=LOGIN", "pid=2027", "uid=0", "auid=4294967295", "auid=48"]
    );
    assert_eq!(p.field_name(), Some("auid"), "Cursor stays on the last field");
    assert_eq!(p.field_int(), Some(48));
}

#[test]
fn nested_user_message_fields_are_flattened() {
    let mut p = AuParser::new(Source::Buffer(BUF1.to_string())).expect("buffer source");
    assert!(p.next_event().expect("event"));
    let mut names = Vec::new();
    assert!(p.first_field());
    loop {
        names.push(p.field_name().unwrap_or_default().to_string());
        if !p.next_field() {
            break;
        }
    }
    for expected in ["pid", "uid", "auid", "exe", "hostname", "addr", "terminal", "res"] {
        assert!(
            names.iter().any(|n| n == expected),
            "Missing field {expected}: {names:?}"
        );
    }
    assert_eq!(p.find_field("res"), Some("success"));
}

#[test]
fn find_field_is_monotonic() {
    let mut p = buffers();
    assert!(p.next_event().expect("event"));
    assert_eq!(p.find_field("auid"), Some("4294967295"));
    assert_eq!(p.find_field_next().expect("name set"), Some("48"));
    assert_eq!(p.find_field_next().expect("name set"), None);
}

#[test]
fn find_field_crosses_records() {
    let mut p = AuParser::new(Source::Buffer(OPEN_EVENT.to_string())).expect("buffer source");
    assert!(p.next_event().expect("event"));
    assert_eq!(p.find_field("name"), Some("\"/etc/passwd\""));
    assert_eq!(p.record_type_name().as_deref(), Some("PATH"));
    assert_eq!(p.find_field_next().expect("name set"), None);
}

#[test]
fn find_field_next_without_name_is_an_error() {
    let mut p = buffers();
    assert!(p.next_event().expect("event"));
    assert!(p.find_field_next().is_err());
}

#[test]
fn reset_restarts_buffers() {
    let mut p = buffers();
    let first = walk(&mut p);
    p.reset().expect("reset");
    let second = walk(&mut p);
    assert_eq!(first, second);
}

#[test]
fn lines_before_the_first_stamp_are_skipped() {
    let text = format!("garbage without a stamp\n\n{BUF1}\n");
    let mut p = AuParser::new(Source::Buffer(text)).expect("buffer source");
    assert!(p.next_event().expect("event"));
    assert_eq!(p.serial(), 146);
    assert_eq!(p.num_records(), 1);
}

#[test]
fn node_prefix_is_reported() {
    let text = "node=web1 type=USER_END msg=audit(1143146701.000:201): user pid=3002 uid=0 auid=500";
    let mut p = AuParser::new(Source::Buffer(text.to_string())).expect("buffer source");
    assert!(p.next_event().expect("event"));
    assert_eq!(p.node(), Some("web1"));
    assert_eq!(p.record_type_name().as_deref(), Some("USER_END"));
}

#[test]
fn stream_source_is_read_once() {
    let reader = std::io::Cursor::new(format!("{BUF0}\n{BUF1}\n").into_bytes());
    let mut p = AuParser::new(Source::Reader(Box::new(reader))).expect("stream source");
    assert_eq!(walk(&mut p).len(), 3);
    p.reset().expect("reset on a stream succeeds");
    assert!(!p.next_event().expect("nothing left"));
}

#[test]
fn file_array_reads_files_in_order() {
    let mut first = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(first, "{BUF0}").expect("write");
    let mut second = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(second, "{BUF1}").expect("write");

    let mut p = AuParser::new(Source::FileArray(vec![
        first.path().to_path_buf(),
        second.path().to_path_buf(),
    ]))
    .expect("file array source");
    let serials: Vec<u64> = walk(&mut p).into_iter().map(|(s, _, _)| s).collect();
    assert_eq!(serials, vec![142, 143, 146]);

    p.reset().expect("reset");
    assert!(p.next_event().expect("event after reset"));
    assert_eq!(p.serial(), 142);
}

#[test]
fn blank_line_inside_event_is_an_empty_record() {
    let text = concat!(
        "type=SYSCALL msg=audit(1143146700.100:200): arch=c000003e syscall=2 success=yes exit=3 pid=3001\n",
        "\n",
        "type=CWD msg=audit(1143146700.100:200):  cwd=\"/home/user\"\n",
    );
    let mut p = AuParser::new(Source::Buffer(text.to_string())).expect("buffer source");
    assert!(p.next_event().expect("event"));
    assert_eq!(p.num_records(), 3);

    assert!(p.next_record().expect("second record"));
    assert_eq!(p.num_fields(), 0);
    assert_eq!(p.record_type(), None);
    assert!(p.next_record().expect("third record"));
    assert_eq!(p.record_type_name().as_deref(), Some("CWD"));
    assert!(!p.next_event().expect("exhausted"));
}

#[test]
fn identical_invalid_stamps_never_share_an_event() {
    let text = "\
type=USER_END msg=audit(bad): user pid=3002 uid=0
type=USER_END msg=audit(bad): user pid=3003 uid=0
";
    let mut p = AuParser::new(Source::Buffer(text.to_string())).expect("buffer source");
    let mut events = 0;
    while p.next_event().expect("next_event") {
        let id = p.timestamp().expect("identity");
        assert!(!id.is_valid(), "Stamp should be invalid: {id:?}");
        assert_eq!(p.num_records(), 1);
        assert_eq!(p.event_time(), None);
        events += 1;
    }
    assert_eq!(events, 2);
}

/// Reader that errors once its data is used up.
struct BrokenPipe;

impl Read for BrokenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "source went away"))
    }
}

#[test]
fn read_failure_mid_event_discards_partial_event() {
    let first = format!("{BUF1}\n").into_bytes();
    let reader = BufReader::new(std::io::Cursor::new(first).chain(BrokenPipe));
    let mut p = AuParser::new(Source::Reader(Box::new(reader))).expect("stream source");

    let err = p.next_event().expect_err("second line fails");
    assert!(
        matches!(err, auparse::AuparseError::Io(_)),
        "Should be an I/O error: {err}"
    );
    assert_eq!(p.num_records(), 0);
    assert!(p.timestamp().is_none());
}

#[test]
fn missing_file_fails_at_construction() {
    let result = AuParser::new(Source::File("/nonexistent_auparse_dir/audit.log".into()));
    let msg = result.expect_err("missing file must fail").to_string();
    assert!(msg.contains("audit.log"), "Should name the file: {msg}");
}
