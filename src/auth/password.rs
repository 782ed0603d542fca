use crate::error::AppError;
use log::error;

/// Hashes `password` with bcrypt at the given work factor (4..=31).
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(|e| {
        error!("bcrypt hashing failed at cost {}: {}", cost, e);
        AppError::from(e)
    })
}

/// Checks `password` against a stored bcrypt hash.
///
/// A hash that bcrypt cannot parse is an internal error, not a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, stored_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST_COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash_password("correct horse", FAST_COST).unwrap();

        assert_ne!(hashed, "correct horse");
        assert!(hashed.starts_with("$2"));
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("battery staple", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password", FAST_COST).unwrap();
        let second = hash_password("same-password", FAST_COST).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_out_of_range_cost_is_internal_error() {
        assert!(matches!(
            hash_password("anything", 3),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn test_unparsable_hash_is_not_a_match() {
        assert!(!matches!(
            verify_password("secret1", "invalidhashformat"),
            Ok(true)
        ));
    }
}
