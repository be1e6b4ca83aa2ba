//! Verification code generation.
//!
//! Codes are [`VERIFICATION_CODE_LENGTH`] characters drawn uniformly from
//! `A-Z0-9`. They are mailed to the user and typed back, so matching is
//! case-insensitive.

use rand::Rng;

use crate::VERIFICATION_CODE_LENGTH;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a code with the thread-local RNG.
///
/// ```rust
/// use biztrack_core::codes::generate_verification_code;
///
/// let code = generate_verification_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
/// ```
pub fn generate_verification_code() -> String {
    generate_code_with(&mut rand::thread_rng())
}

/// Generates a code from the given RNG.
pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..VERIFICATION_CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Canonical form of a user-typed code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_code_shape() {
        for _ in 0..200 {
            let code = generate_verification_code();
            assert_eq!(code.len(), VERIFICATION_CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = generate_code_with(&mut StdRng::seed_from_u64(42));
        let b = generate_code_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" a1b2c3 "), "A1B2C3");
    }
}
