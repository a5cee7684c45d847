//! Unique public ids for uploaded images: `{unix_millis}_{token}.{ext}`

use rand::Rng;

const TOKEN_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Text after the last `.` of `filename`, if any.
///
/// Names without a dot, or ending in one, have no extension.
pub fn extension(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Random lowercase base-36 token
pub fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Name for `original` at a given time with a given randomness source.
pub fn generate_name_at<R: Rng + ?Sized>(original: &str, millis: i64, rng: &mut R) -> String {
    let token = random_token(rng, TOKEN_LEN);
    match extension(original) {
        Some(ext) => format!("{}_{}.{}", millis, token, ext),
        None => format!("{}_{}", millis, token),
    }
}

/// Name for `original` now. Collisions are not checked.
pub fn generate_name(original: &str) -> String {
    generate_name_at(
        original,
        chrono::Utc::now().timestamp_millis(),
        &mut rand::rng(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    #[test]
    fn test_generate_name_shape() {
        let pattern = Regex::new(r"^\d+_[0-9a-z]{6}\.png$").unwrap();
        for _ in 0..50 {
            let name = generate_name("photo.png");
            assert!(pattern.is_match(&name), "unexpected name {}", name);
        }
    }

    #[test]
    fn test_generate_name_uses_last_extension() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = generate_name_at("archive.tar.gz", 1_700_000_000_000, &mut rng);
        assert!(name.starts_with("1700000000000_"));
        assert!(name.ends_with(".gz"));
    }

    #[test]
    fn test_generate_name_without_extension() {
        let pattern = Regex::new(r"^\d+_[0-9a-z]{6}$").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pattern.is_match(&generate_name_at("README", 42, &mut rng)));
        assert!(pattern.is_match(&generate_name_at("trailing.", 42, &mut rng)));
    }

    #[test]
    fn test_generate_name_is_deterministic_for_seed() {
        let a = generate_name_at("a.jpg", 1, &mut StdRng::seed_from_u64(99));
        let b = generate_name_at("a.jpg", 1, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("photo.png"), Some("png"));
        assert_eq!(extension(".hidden"), Some("hidden"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("dot."), None);
    }
}
