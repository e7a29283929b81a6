use rand::distr::{Alphanumeric, Distribution};

const KEY_PREFIX: &str = "cp_";
const KEY_LENGTH: usize = 40;

/// Generate a fresh random API key.
pub fn generate_api_key() -> String {
    let mut rng = rand::rng();
    let body: String = (0..KEY_LENGTH)
        .map(|_| Alphanumeric.sample(&mut rng) as char)
        .collect();
    format!("{KEY_PREFIX}{body}")
}
