use chrono::{Datelike, Utc};
use rand::Rng;

/// Generate a record code like `LAU-2025-7AE938`: prefix, current year,
/// three random bytes as uppercase hex. Uniqueness is enforced by the
/// UNIQUE column; callers retry on collision.
pub fn generate_code(prefix: &str) -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 3] = rng.random();
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().year(),
        hex::encode_upper(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_prefix_year_and_hex_suffix() {
        let code = generate_code("LAU");
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "LAU");
        assert_eq!(parts[1].len(), 4);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn codes_differ_between_calls() {
        // 24 bits of randomness; 8 draws colliding would mean a broken RNG.
        let codes: std::collections::HashSet<String> =
            (0..8).map(|_| generate_code("PEN")).collect();
        assert!(codes.len() > 1);
    }
}
