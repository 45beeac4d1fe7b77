use rand::Rng;

const CODE_PREFIX: &str = "BK-";
const CODE_LEN: usize = 8;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a booking code (BK-XXXXXXXX), uniform over A-Z0-9.
///
/// 36^8 codes leave a real birthday-collision chance at scale; the unique
/// index on `booking_code` catches those and the caller retries.
pub fn generate_booking_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect();

    format!("{CODE_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_code_format() {
        let code = generate_booking_code();
        assert_eq!(code.len(), 3 + 8);
        assert!(code.starts_with("BK-"));
        assert!(code[3..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_booking_codes_vary() {
        let codes: std::collections::HashSet<String> =
            (0..64).map(|_| generate_booking_code()).collect();
        // 64 draws from 36^8 colliding would point at a broken generator
        assert_eq!(codes.len(), 64);
    }
}
