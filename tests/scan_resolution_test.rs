//! Resolution precedence tests — payloads that could match several rules
//! must land on the first one, and the rule order must be observable from
//! the outside.

use dhms::scan::{BASE_PATH, PendingIndex, Resolution, resolve};

fn index(entries: &[(&str, i64)]) -> PendingIndex {
    PendingIndex::build(entries.iter().map(|(c, id)| (c.to_string(), *id)))
}

#[test]
fn digits_win_over_index_lookup() {
    // "1234" is also a known code; the numeric rule fires first, so the
    // index mapping must not be consulted.
    let idx = index(&[("1234", 99)]);
    assert_eq!(
        resolve("1234", &idx, BASE_PATH),
        Some(Resolution::Record { id: 1234, code: None })
    );
}

#[test]
fn json_wins_over_digits_inside_the_object() {
    let idx = index(&[]);
    assert_eq!(
        resolve(r#"{"id": "7", "note": "204819"}"#, &idx, BASE_PATH),
        Some(Resolution::Record { id: 7, code: None })
    );
}

#[test]
fn id_key_wins_over_form_id_key() {
    let idx = index(&[]);
    assert_eq!(
        resolve(r#"{"form_id": 2, "id": 1}"#, &idx, BASE_PATH),
        Some(Resolution::Record { id: 1, code: None })
    );
}

#[test]
fn url_rule_wins_over_embedded_digits() {
    // The code segment is all digits; URL handling must still treat the
    // payload as a path, not fall through to the numeric rule.
    let idx = index(&[("100200", 5)]);
    assert_eq!(
        resolve("https://other-host/laundry/100200/taken/", &idx, BASE_PATH),
        Some(Resolution::Record { id: 5, code: Some("100200".to_string()) })
    );
}

#[test]
fn trailing_slash_is_stripped_before_code_lookup() {
    let idx = index(&[("LAU-9981", 77)]);
    assert_eq!(
        resolve("LAU-9981/", &idx, BASE_PATH),
        Some(Resolution::Record { id: 77, code: Some("LAU-9981".to_string()) })
    );
}

#[test]
fn only_one_trailing_slash_is_stripped() {
    let idx = index(&[("LAU-9981", 77)]);
    // Two slashes leave "LAU-9981/" behind, which contains '/' but has no
    // laundry segment or action keyword, and is unknown to the index.
    assert_eq!(resolve("LAU-9981//", &idx, BASE_PATH), None);
}

#[test]
fn endpoint_path_round_trips_the_trailing_slash() {
    let idx = index(&[]);
    let payload = format!("https://host/{BASE_PATH}/public/laundry/LAU-1/taken/");
    match resolve(&payload, &idx, BASE_PATH) {
        Some(Resolution::Endpoint { path }) => {
            assert_eq!(path, "/public/laundry/LAU-1/taken/");
            assert!(path.ends_with('/'), "minted links end with a slash");
        }
        other => panic!("expected endpoint, got {other:?}"),
    }
}

#[test]
fn keyword_without_laundry_segment_still_resolves_code() {
    let idx = index(&[("LAU-9981", 77)]);
    assert_eq!(
        resolve("forms/LAU-9981/verify", &idx, BASE_PATH),
        Some(Resolution::Record { id: 77, code: Some("LAU-9981".to_string()) })
    );
}

#[test]
fn negative_number_is_not_a_bare_id() {
    let idx = index(&[]);
    assert_eq!(resolve("-42", &idx, BASE_PATH), None);
}

#[test]
fn json_array_is_unresolved() {
    let idx = index(&[]);
    assert_eq!(resolve("[1, 2, 3]", &idx, BASE_PATH), None);
}

#[test]
fn resolution_never_mutates_the_index() {
    let idx = index(&[("LAU-9981", 77)]);
    let _ = resolve("LAU-9981", &idx, BASE_PATH);
    let _ = resolve("garbage", &idx, BASE_PATH);
    assert_eq!(idx.len(), 1);
    assert_eq!(idx.get("LAU-9981"), Some(77));
}
