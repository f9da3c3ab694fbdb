use chrono::{Datelike, Utc};
use rand::Rng;

/// Generate a human-readable order number: `ORD-<year>-<4 digits>`.
///
/// The random suffix can collide under concurrent order creation; the
/// orders table carries a unique constraint on order_number and the
/// acceptance path regenerates on conflict, so a collision costs one retry
/// rather than a duplicate number.
pub fn generate() -> String {
    let year = Utc::now().year();
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("ORD-{}-{:04}", year, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_suffix_is_zero_padded() {
        for _ in 0..200 {
            let number = generate();
            assert_eq!(number.len(), "ORD-2026-0000".len());
        }
    }
}
