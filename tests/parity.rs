use std::collections::BTreeMap;

use dotenvkit::{Entry, Parser, SystemEnv, parse_str_with_env, split_lines};

#[test]
fn parses_basic_fixture() {
    let fixture = include_str!("fixtures/basic.env");
    let entries = parse_str_with_env(fixture, &SystemEnv::empty()).expect("fixture should parse");

    let map = to_map(entries);
    assert_eq!(map.get("BASIC").expect("BASIC"), "basic");
    assert_eq!(map.get("EMPTY").expect("EMPTY"), "");
    assert_eq!(map.get("INLINE_COMMENT").expect("INLINE_COMMENT"), "value");
    assert_eq!(map.get("QUOTED").expect("QUOTED"), "hello world");
    assert_eq!(map.get("SINGLE").expect("SINGLE"), "literal $BASIC");
    assert_eq!(map.get("EXPORTED").expect("EXPORTED"), "1");
    assert_eq!(map.get("WITH_SPACES").expect("WITH_SPACES"), "a b c");
    assert_eq!(map.get("app.version").expect("app.version"), "1.2.3");
    assert_eq!(map.get("REFERENCE").expect("REFERENCE"), "basic_suffix");
    assert_eq!(
        map.get("UNDEFINED_REFERENCE").expect("UNDEFINED_REFERENCE"),
        "[]"
    );
    assert_eq!(
        map.get("ESCAPES").expect("ESCAPES"),
        "tab\\tkept, quote \" and slash \\"
    );
    assert_eq!(
        map.get("HASH_IN_QUOTES").expect("HASH_IN_QUOTES"),
        "# not a comment"
    );
}

#[test]
fn parses_multiline_fixture() {
    let fixture = include_str!("fixtures/multiline.env");
    let entries = parse_str_with_env(fixture, &SystemEnv::empty()).expect("fixture should parse");

    let map = to_map(entries);
    assert_eq!(
        map.get("MULTI_DOUBLE_QUOTED").expect("MULTI_DOUBLE_QUOTED"),
        "THIS\nIS\nA\nMULTILINE\nSTRING"
    );
    assert_eq!(
        map.get("MULTI_PEM_DOUBLE_QUOTED")
            .expect("MULTI_PEM_DOUBLE_QUOTED"),
        "-----BEGIN PUBLIC KEY-----\nLINE1\nLINE2\n-----END PUBLIC KEY-----"
    );
    assert_eq!(map.get("AFTER").expect("AFTER"), "after_line");
}

#[test]
fn lenient_parse_of_malformed_fixture_keeps_good_lines() {
    let fixture = include_str!("fixtures/malformed.env");
    let env = SystemEnv::empty();
    let entries = Parser::new(&env)
        .throw_if_malformed(false)
        .parse(&split_lines(fixture))
        .expect("lenient parse never fails");

    assert_eq!(
        entries,
        vec![Entry::new("GOOD", "1"), Entry::new("ALSO_GOOD", "12")]
    );
}

#[test]
fn strict_parse_of_malformed_fixture_stops_at_first_bad_line() {
    let fixture = include_str!("fixtures/malformed.env");
    let err = parse_str_with_env(fixture, &SystemEnv::empty()).expect_err("expected failure");

    match err {
        dotenvkit::Error::Malformed(err) => {
            assert_eq!(err.line, 2);
            assert_eq!(err.content, "this line has no separator");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

fn to_map(entries: Vec<Entry>) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect()
}
