//! PIN 与管理员密码的 argon2 哈希

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

pub fn hash_secret(secret: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// 校验明文与哈希是否匹配；哈希格式损坏时视为不匹配
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("无法解析密码哈希: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_secret("12345678").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("12345678", &hash));
        assert!(!verify_secret("87654321", &hash));
    }

    #[test]
    fn corrupt_hash_never_matches() {
        assert!(!verify_secret("12345678", "not-a-hash"));
    }
}
