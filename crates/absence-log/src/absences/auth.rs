use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use axum::http::{header, HeaderMap};
use serde::Serialize;
use uuid::Uuid;

use crate::config::AdminConfig;

pub const SESSION_COOKIE: &str = "absence_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    pub id: u32,
    pub username: String,
}

/// Credential lookup for the report pages.
pub trait UserDirectory: Send + Sync {
    fn find_by_credentials(&self, username: &str, password: &str) -> Option<AdminUser>;
}

struct StaticAccount {
    user: AdminUser,
    password: String,
}

/// Fixed account list loaded from configuration.
#[derive(Default)]
pub struct StaticUserDirectory {
    accounts: Vec<StaticAccount>,
}

impl StaticUserDirectory {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::default().with_account(&config.username, &config.password)
    }

    pub fn with_account(mut self, username: &str, password: &str) -> Self {
        let id = self.accounts.len() as u32 + 1;
        self.accounts.push(StaticAccount {
            user: AdminUser {
                id,
                username: username.to_string(),
            },
            password: password.to_string(),
        });
        self
    }
}

impl std::fmt::Debug for StaticUserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.accounts.iter().map(|account| &account.user.username))
            .finish()
    }
}

impl UserDirectory for StaticUserDirectory {
    fn find_by_credentials(&self, username: &str, password: &str) -> Option<AdminUser> {
        self.accounts
            .iter()
            .find(|account| account.user.username == username && account.password == password)
            .map(|account| account.user.clone())
    }
}

/// In-memory login sessions keyed by an opaque cookie token.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, AdminUser>>,
}

impl SessionRegistry {
    pub fn open(&self, user: AdminUser) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), user);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<AdminUser> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// The user behind the session cookie in `headers`, if any.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<AdminUser> {
        session_token(headers).and_then(|token| self.resolve(&token))
    }
}

/// Pulls the session token out of the `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
