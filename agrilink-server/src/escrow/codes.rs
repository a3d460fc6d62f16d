//! Secret code and identifier generation
//!
//! 4 位确认码取值 1000–9999。随机生成采用有界的拒绝重采样，
//! 超过尝试次数返回 `IdSpaceExhausted`，不会无限循环。

use super::traits::EscrowError;
use rand::Rng;

/// Smallest 4-digit code
pub const CODE_MIN: u32 = 1000;
/// Largest 4-digit code
pub const CODE_MAX: u32 = 9999;

/// Maximum resample attempts before giving up
const MAX_ATTEMPTS: usize = 10_000;

/// Draw a 4-digit code (no uniqueness requirement)
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Draw a 4-digit code that `in_use` rejects at most `MAX_ATTEMPTS` times
///
/// `what` names the id space in the error (e.g. "buyer code").
pub fn unique_code<R, F>(rng: &mut R, what: &'static str, in_use: F) -> Result<String, EscrowError>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code(rng);
        if !in_use(&code) {
            return Ok(code);
        }
    }
    tracing::error!(id_space = what, attempts = MAX_ATTEMPTS, "Code space exhausted");
    Err(EscrowError::IdSpaceExhausted(what))
}

/// Sequential id: prefix + zero-padded counter (`O001`, `L007` ...)
///
/// Starts at `count + 1` and skips ids already taken.
pub fn sequential_id<F>(prefix: &str, count: usize, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut n = count + 1;
    loop {
        let id = format!("{}{:03}", prefix, n);
        if !taken(&id) {
            return id;
        }
        n += 1;
    }
}

/// Whether `s` is a 4–6 digit passcode
pub fn is_valid_passcode(s: &str) -> bool {
    (4..=6).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two short secrets without early exit
pub fn codes_match(submitted: &str, expected: &str) -> bool {
    let a = submitted.trim().as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
