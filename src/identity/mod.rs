/// 사용자 식별 협력자
/// 가입/인증만 담당한다. 세션 상태는 두지 않으며,
/// 핵심 작업은 행위자 id를 항상 명시적 인자로 받는다.
// region:    --- Imports
use crate::error::CoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- User Model
// 사용자 모델
#[derive(Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub joined_at: DateTime<Utc>,
}
// endregion: --- User Model

// region:    --- Identity Provider
/// 사용자 식별 협력자 트레이트
#[async_trait]
pub trait IdentityProvider {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CoreError>;
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, CoreError>;
}

/// 사용자 식별 협력자 구현체
pub struct PostgresIdentity {
    pool: Arc<PgPool>,
}

impl PostgresIdentity {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// 비밀번호 다이제스트: H(username || ':' || password)
/// 사용자 이름을 솔트로 써서 같은 비밀번호라도 다이제스트가 달라진다.
fn password_digest(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl IdentityProvider for PostgresIdentity {
    /// 가입. 사용자 이름이 겹치면 UsernameTaken.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CoreError> {
        info!("{:<12} --> 가입 요청: {}", "Identity", username);

        let digest = password_digest(username, password);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_digest, joined_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, password_digest, joined_at",
        )
        .bind(username)
        .bind(email)
        .bind(&digest)
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                CoreError::UsernameTaken
            } else {
                CoreError::Store(e)
            }
        })?;
        Ok(user)
    }

    /// 인증. 사용자가 없거나 다이제스트가 다르면 InvalidCredentials.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, CoreError> {
        info!("{:<12} --> 로그인 요청: {}", "Identity", username);

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_digest, joined_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or(CoreError::InvalidCredentials)?;

        if user.password_digest != password_digest(username, password) {
            return Err(CoreError::InvalidCredentials);
        }
        Ok(user)
    }
}
// endregion: --- Identity Provider

#[cfg(test)]
mod tests {
    use super::*;

    /// 같은 입력이면 같은 다이제스트
    #[test]
    fn test_password_digest_deterministic() {
        assert_eq!(
            password_digest("alice", "secret"),
            password_digest("alice", "secret")
        );
    }

    /// 사용자 이름이 다르면 같은 비밀번호라도 다이제스트가 달라야 한다
    #[test]
    fn test_password_digest_salted_by_username() {
        assert_ne!(
            password_digest("alice", "secret"),
            password_digest("bob", "secret")
        );
    }

    #[test]
    fn test_password_digest_is_hex_sha256() {
        let digest = password_digest("alice", "secret");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
