//! Account linking and identity resolution. Not cached.

use tracing::info;

use crate::db::{Db, User};
use crate::error::{AppError, Result};
use crate::models::LinkAccountRequest;

#[derive(Clone)]
pub struct Accounts {
    db: Db,
}

impl Accounts {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates the user on first login, returns the existing one afterwards.
    pub async fn link_account(&self, req: &LinkAccountRequest) -> Result<User> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let user = self.db.write().await.link_account(
            req.provider.trim(),
            req.provider_account_id.trim(),
            req.name.trim(),
            req.image.as_deref(),
        );
        info!(user_id = %user.id, provider = %req.provider, "account linked");
        Ok(user)
    }

    /// Maps a provider account id to the internal user id.
    pub async fn user_id(&self, account_id: &str) -> Option<String> {
        self.db.read().await.user_id_for_account(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(account: &str) -> LinkAccountRequest {
        LinkAccountRequest {
            provider: "kakao".into(),
            provider_account_id: account.into(),
            name: "minji".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let accounts = Accounts::new(Db::new());
        let first = accounts.link_account(&request("123")).await.unwrap();
        let second = accounts.link_account(&request("123")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(accounts.user_id("123").await, Some(first.id));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let accounts = Accounts::new(Db::new());
        assert_eq!(accounts.user_id("nobody").await, None);
    }

    #[tokio::test]
    async fn test_link_requires_account_id() {
        let accounts = Accounts::new(Db::new());
        let result = accounts.link_account(&request(" ")).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
