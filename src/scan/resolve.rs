use super::pending_index::PendingIndex;

/// Action segments recognized inside a scanned path. `taken` is what the
/// minted QR links carry; the others cover manual entry of API paths.
const ACTION_KEYWORDS: &[&str] = &["taken", "taken-out", "verify"];

/// What a scan payload resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A backend identifier, with the human-readable code when it is known.
    Record { id: i64, code: Option<String> },
    /// A relative API path extracted verbatim from a scanned URL that
    /// carried our own base path. Dispatched directly, bypassing lookup.
    Endpoint { path: String },
}

/// Resolve a raw scan payload to exactly one target.
///
/// Rules are tried in order and the first matching rule wins:
/// 1. trim, strip one trailing `/`
/// 2. path with a laundry segment or action keyword — direct endpoint if
///    the known base path is present, otherwise embedded-code lookup
/// 3. JSON object with an `id` or `form_id` field
/// 4. all digits — the identifier itself
/// 5. pending-index lookup of the whole payload as a code
///
/// `None` means the payload could not be mapped to any target; the caller
/// must not issue any mutating call in that case.
pub fn resolve(payload: &str, index: &PendingIndex, base_path: &str) -> Option<Resolution> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed.strip_suffix('/').unwrap_or(trimmed);

    // Rule 2: path-shaped payloads. Once the laundry pattern is recognized
    // the outcome here is final — later rules cannot apply to a URL.
    if stripped.contains('/') {
        if let Some(outcome) = resolve_path(trimmed, stripped, index, base_path) {
            return outcome;
        }
    }

    // Rule 3: JSON blob carrying the identifier.
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["id", "form_id"] {
            if let Some(id) = map.get(key).and_then(json_id) {
                return Some(Resolution::Record { id, code: None });
            }
        }
    }

    // Rule 4: bare numeric identifier, used directly without index lookup.
    if stripped.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = stripped.parse::<i64>() {
            return Some(Resolution::Record { id, code: None });
        }
    }

    // Rule 5: the payload is a human-readable code known to the index.
    index.get(stripped).map(|id| Resolution::Record {
        id,
        code: Some(stripped.trim().to_ascii_uppercase()),
    })
}

/// Accept both `"form_id": 42` and `"form_id": "42"`.
fn json_id(value: &serde_json::Value) -> Option<i64> {
    if let Some(id) = value.as_i64() {
        return Some(id);
    }
    value
        .as_str()
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
}

fn is_action_keyword(segment: &str) -> bool {
    ACTION_KEYWORDS
        .iter()
        .any(|k| segment.eq_ignore_ascii_case(k))
}

/// Rule 2 body. Outer `None` = pattern not recognized, keep trying rules;
/// `Some(outcome)` = rule matched and its outcome is final.
fn resolve_path(
    trimmed: &str,
    stripped: &str,
    index: &PendingIndex,
    base_path: &str,
) -> Option<Option<Resolution>> {
    let segments: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();

    let laundry_pos = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("laundry"));
    let keyword_pos = segments.iter().position(|s| is_action_keyword(s));

    if laundry_pos.is_none() && keyword_pos.is_none() {
        return None;
    }

    // Direct-endpoint resolution takes priority over code lookup: when the
    // URL carries our own base path, the remaining relative path is used
    // verbatim (taken from the untouched payload so it round-trips exactly).
    let marker = format!("/{base_path}/");
    if let Some(idx) = trimmed.find(&marker) {
        let path = &trimmed[idx + marker.len() - 1..];
        return Some(Some(Resolution::Endpoint {
            path: path.to_string(),
        }));
    }

    // Candidate code: the segment after "laundry", else the one before the
    // action keyword.
    let candidate = laundry_pos
        .and_then(|i| segments.get(i + 1))
        .filter(|s| !is_action_keyword(s))
        .copied()
        .or_else(|| {
            keyword_pos
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| segments.get(i))
                .copied()
        });

    Some(candidate.and_then(|code| {
        index.get(code).map(|id| Resolution::Record {
            id,
            code: Some(code.trim().to_ascii_uppercase()),
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::BASE_PATH;

    fn index() -> PendingIndex {
        PendingIndex::build([
            ("LAU-9981".to_string(), 77),
            ("LAU-2025-7AE938".to_string(), 204),
        ])
    }

    #[test]
    fn pure_digits_resolve_directly_without_index() {
        let empty = PendingIndex::new();
        assert_eq!(
            resolve("204819", &empty, BASE_PATH),
            Some(Resolution::Record { id: 204819, code: None })
        );
    }

    #[test]
    fn url_with_base_path_yields_verbatim_relative_endpoint() {
        let payload = "https://host/aau-dhms-api/public/laundry/LAU-2025-7AE938/taken/";
        assert_eq!(
            resolve(payload, &index(), BASE_PATH),
            Some(Resolution::Endpoint {
                path: "/public/laundry/LAU-2025-7AE938/taken/".to_string()
            })
        );
    }

    #[test]
    fn direct_endpoint_wins_over_code_lookup() {
        // The embedded code is in the index, but base-path extraction has
        // priority and must not consult it.
        let payload = "https://host/aau-dhms-api/public/laundry/LAU-9981/taken/";
        match resolve(payload, &index(), BASE_PATH) {
            Some(Resolution::Endpoint { path }) => {
                assert_eq!(path, "/public/laundry/LAU-9981/taken/");
            }
            other => panic!("expected direct endpoint, got {other:?}"),
        }
    }

    #[test]
    fn foreign_url_with_laundry_segment_falls_back_to_code_lookup() {
        let payload = "https://other-host/public/laundry/LAU-9981/taken/";
        assert_eq!(
            resolve(payload, &index(), BASE_PATH),
            Some(Resolution::Record { id: 77, code: Some("LAU-9981".to_string()) })
        );
    }

    #[test]
    fn foreign_url_with_unknown_code_is_unresolved() {
        let payload = "https://other-host/public/laundry/LAU-0000/taken/";
        assert_eq!(resolve(payload, &index(), BASE_PATH), None);
    }

    #[test]
    fn json_id_field_resolves_directly() {
        let empty = PendingIndex::new();
        assert_eq!(
            resolve(r#"{"id": 9}"#, &empty, BASE_PATH),
            Some(Resolution::Record { id: 9, code: None })
        );
    }

    #[test]
    fn json_form_id_field_resolves_directly() {
        let empty = PendingIndex::new();
        assert_eq!(
            resolve(r#"{"form_id": 42}"#, &empty, BASE_PATH),
            Some(Resolution::Record { id: 42, code: None })
        );
    }

    #[test]
    fn json_string_form_id_resolves() {
        let empty = PendingIndex::new();
        assert_eq!(
            resolve(r#"{"form_id": "42"}"#, &empty, BASE_PATH),
            Some(Resolution::Record { id: 42, code: None })
        );
    }

    #[test]
    fn known_code_resolves_to_mapped_id() {
        assert_eq!(
            resolve("LAU-9981", &index(), BASE_PATH),
            Some(Resolution::Record { id: 77, code: Some("LAU-9981".to_string()) })
        );
    }

    #[test]
    fn code_lookup_is_case_insensitive_and_trimmed() {
        assert_eq!(
            resolve("  lau-9981/ ", &index(), BASE_PATH),
            Some(Resolution::Record { id: 77, code: Some("LAU-9981".to_string()) })
        );
    }

    #[test]
    fn unknown_code_with_empty_index_is_unresolved() {
        let empty = PendingIndex::new();
        assert_eq!(resolve("LAU-0000", &empty, BASE_PATH), None);
    }

    #[test]
    fn empty_and_whitespace_payloads_are_unresolved() {
        assert_eq!(resolve("", &index(), BASE_PATH), None);
        assert_eq!(resolve("   ", &index(), BASE_PATH), None);
    }

    #[test]
    fn json_without_id_fields_is_unresolved() {
        assert_eq!(resolve(r#"{"note": "hi"}"#, &index(), BASE_PATH), None);
    }

    #[test]
    fn unrelated_url_is_unresolved() {
        assert_eq!(
            resolve("https://example.com/some/other/path/", &index(), BASE_PATH),
            None
        );
    }
}
