//! Application context and services

use super::User;
use std::sync::{Arc, Mutex};

/// Application context passed to all handlers
#[derive(Clone, Default)]
pub struct AppContext {
    /// User store
    pub db: DbService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory user store
#[derive(Clone)]
pub struct DbService {
    users: Arc<Mutex<Vec<User>>>,
}

impl DbService {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![
                User::new(1, "Alice", "alice@example.com"),
                User::new(2, "Bob", "bob@example.com"),
            ])),
        }
    }

    pub fn get_user(&self, id: u64) -> Option<User> {
        self.users.lock().ok()?.iter().find(|u| u.id == id).cloned()
    }

    /// Users whose name contains `filter`, case-insensitive, at most `limit`.
    pub fn list_users(&self, filter: Option<&str>, limit: usize) -> Vec<User> {
        let filter = filter.map(str::to_lowercase);
        self.users
            .lock()
            .map(|users| {
                users
                    .iter()
                    .filter(|u| match &filter {
                        Some(f) => u.name.to_lowercase().contains(f.as_str()),
                        None => true,
                    })
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn create_user(&self, name: &str, email: &str) -> Option<User> {
        let mut users = self.users.lock().ok()?;
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;

        let user = User::new(id, name, email);
        users.push(user.clone());
        Some(user)
    }

    pub fn count_users(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }
}

impl Default for DbService {
    fn default() -> Self {
        Self::new()
    }
}
