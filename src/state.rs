use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::auth::User;
use crate::services::auth_service::AuthService;

/// A registered user as the mock auth server stores it: public record plus
/// the argon2 hash. Nothing here survives a restart.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Shared state of the mock auth server: an in-process user map keyed by
/// lowercased email, and the token service.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<RwLock<HashMap<String, StoredUser>>>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            auth: Arc::new(auth),
        }
    }
}
