//! 口令哈希
//!
//! 农户、买家、配送员和管理员的口令都以 argon2 PHC 字符串保存，
//! 明文不落盘、不进日志、不进事件日志。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

#[cfg(not(test))]
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

/// 测试使用低成本参数
#[cfg(test)]
fn hasher() -> Argon2<'static> {
    let params = argon2::Params::new(8, 1, 1, None).expect("valid argon2 test params");
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a passcode using argon2
pub fn hash_passcode(passcode: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher().hash_password(passcode.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a passcode against a stored PHC string
///
/// 解析失败的哈希视为不匹配
pub fn verify_passcode(passcode: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::error!("Stored passcode hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(passcode.as_bytes(), &parsed)
        .is_ok()
}
