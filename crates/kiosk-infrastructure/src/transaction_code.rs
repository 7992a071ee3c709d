//! Time-plus-random transaction code generator.

use chrono::Utc;
use rand::Rng;

use kiosk_core::cart::TransactionCodeGenerator;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;

/// Generates codes of the form `<millis in base 36><4 random chars>`,
/// all uppercase alphanumeric.
///
/// Codes sort roughly by creation time. Collisions are possible only for
/// two checkouts in the same millisecond drawing the same suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeRandomCodeGenerator;

impl TimeRandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TransactionCodeGenerator for TimeRandomCodeGenerator {
    fn next_code(&self) -> String {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut code = to_base36(millis);

        let mut rng = rand::thread_rng();
        for _ in 0..SUFFIX_LEN {
            let idx = rng.gen_range(0..ALPHABET.len());
            code.push(char::from(ALPHABET[idx]));
        }
        code
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
