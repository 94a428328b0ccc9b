//! 会话管理
//!
//! 登录后签发不透明的 UUID 令牌，保存在内存中，带过期时间。
//! 服务重启后所有会话失效，客户端需要重新登录。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header::AUTHORIZATION};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// 令牌持有者身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Pos { account_id: String },
    Admin { admin_id: String, username: String },
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin { .. })
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    principal: Principal,
    expires_at: Instant,
}

/// 会话有效期上限（30 天）
pub const MAX_SESSION_TTL_MINUTES: u64 = 43_200;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    /// 超过 `MAX_SESSION_TTL_MINUTES` 的 TTL 会被截断
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: ttl.min(Duration::from_secs(MAX_SESSION_TTL_MINUTES * 60)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 签发新令牌
    pub fn issue(&self, principal: Principal) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let entry = SessionEntry {
            principal,
            expires_at: Instant::now() + self.ttl,
        };
        self.sessions.write().insert(token.clone(), entry);
        token
    }

    /// 解析令牌，过期的令牌会被顺带清除
    pub fn resolve(&self, token: &str) -> Option<Principal> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                Some(entry) if entry.expires_at > now => return Some(entry.principal.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().remove(token);
        None
    }

    /// 注销令牌，返回令牌此前是否存在
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// 注销某账户的所有会话（账户被禁用时）
    pub fn revoke_account(&self, account_id: &str) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            !matches!(&entry.principal, Principal::Pos { account_id: id } if id == account_id)
        });
        before - sessions.len()
    }

    /// 清理所有过期会话
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 从 `Authorization: Bearer <token>` 头中取出令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 解析请求的身份，没有或无效令牌时返回 401
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<Principal> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    state.sessions.resolve(token).ok_or(AppError::Unauthorized)
}

/// 账户范围的操作：该账户自己的 POS 会话或任意管理员
pub fn authorize_account(
    state: &AppState,
    headers: &HeaderMap,
    account_id: &str,
) -> AppResult<Principal> {
    let principal = authenticate(state, headers)?;
    match &principal {
        Principal::Admin { .. } => Ok(principal),
        Principal::Pos { account_id: own } if own == account_id => Ok(principal),
        Principal::Pos { .. } => Err(AppError::Forbidden),
    }
}

/// 仅管理员可访问，返回 (admin_id, username)
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> AppResult<(String, String)> {
    match authenticate(state, headers)? {
        Principal::Admin { admin_id, username } => Ok((admin_id, username)),
        Principal::Pos { .. } => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn pos(id: &str) -> Principal {
        Principal::Pos {
            account_id: id.to_string(),
        }
    }

    #[test]
    fn issued_token_resolves_until_revoked() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue(pos("acc-1"));

        assert_eq!(store.resolve(&token), Some(pos("acc-1")));
        assert!(store.revoke(&token));
        assert_eq!(store.resolve(&token), None);
        assert!(!store.revoke(&token));
    }

    #[test]
    fn expired_tokens_are_rejected_and_purged() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.issue(pos("acc-1"));

        assert_eq!(store.resolve(&token), None);
        assert!(store.is_empty());

        store.issue(pos("acc-2"));
        assert_eq!(store.purge_expired(), 1);
    }

    #[test]
    fn oversized_ttl_is_capped() {
        let store = SessionStore::new(Duration::from_secs(u64::MAX));
        assert_eq!(store.ttl(), Duration::from_secs(MAX_SESSION_TTL_MINUTES * 60));

        let token = store.issue(pos("acc-1"));
        assert_eq!(store.resolve(&token), Some(pos("acc-1")));
    }

    #[test]
    fn revoke_account_only_drops_that_account() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.issue(pos("acc-1"));
        store.issue(pos("acc-1"));
        let other = store.issue(pos("acc-2"));

        assert_eq!(store.revoke_account("acc-1"), 2);
        assert!(store.resolve(&other).is_some());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }
}
