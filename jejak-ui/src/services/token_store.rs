//! Session token ownership
//!
//! Single ownership point for the backend bearer credential. Every
//! component that talks to the backend receives this store by injection
//! instead of reading a shared key-value slot ad hoc. Cleared on logout
//! and on any 401/403 response from the backend.

use tokio::sync::RwLock;

/// Bearer token store for the active session
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a credential, replacing any previous one
    pub async fn set(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    /// Current credential, if any
    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Discard the credential (logout, or backend rejected it)
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_clear_round_trip() {
        let store = TokenStore::new();
        assert_eq!(store.get().await, None);

        store.set("abc123".to_string()).await;
        assert_eq!(store.get().await.as_deref(), Some("abc123"));

        store.set("def456".to_string()).await;
        assert_eq!(store.get().await.as_deref(), Some("def456"));

        store.clear().await;
        assert_eq!(store.get().await, None);
    }
}
