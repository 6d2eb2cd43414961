use std::collections::HashMap;
use std::sync::Mutex;

/// Key/value storage scoped to one user's browser session.
pub trait SessionStore: Send + Sync {
    fn put(&self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<String>;
    /// Remove and return the value under `key`.
    fn remove(&self, key: &str) -> Option<String>;
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_consumes_value() {
        let session = MemorySessionStore::new();
        session.put("state", "abc".to_string());
        assert_eq!(session.get("state").as_deref(), Some("abc"));
        assert_eq!(session.remove("state").as_deref(), Some("abc"));
        assert!(session.get("state").is_none());
        assert!(session.remove("state").is_none());
    }
}
