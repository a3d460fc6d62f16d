//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文 (提取器)
//! - [`passcode`] - argon2 口令哈希

pub mod extractor;
pub mod jwt;
pub mod passcode;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use passcode::{hash_passcode, verify_passcode};
