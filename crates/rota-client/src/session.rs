//! Authentication state for one API client.
//!
//! A [`Session`] starts anonymous, becomes authenticated once it holds an
//! access token, and is ready after the server has confirmed who the token
//! belongs to. Tokens live only in memory.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Ready => "ready",
        };
        f.write_str(label)
    }
}

/// The user behind the current token, as reported by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "id")]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub first_name_ru: Option<String>,
    #[serde(default)]
    pub last_name_ru: Option<String>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserProfile {
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name_ru, &self.last_name_ru) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self
                .telegram_username
                .as_ref()
                .map_or_else(|| "unknown user".to_string(), |u| format!("@{u}")),
        }
    }
}

/// Data from the Telegram login widget, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramLogin {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    pub auth_date: i64,
    pub hash: String,
}

/// Answer of the login and refresh endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            user: None,
        }
    }

    #[must_use]
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
            user: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        match (&self.access_token, &self.user) {
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::Authenticated,
            (Some(_), Some(_)) => SessionState::Ready,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Adopt tokens from a successful login or refresh.
    ///
    /// A refresh answer without a new refresh token keeps the old one. The
    /// confirmed user is dropped because the token changed.
    pub(crate) fn store_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        self.access_token = Some(access_token);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.user = None;
    }

    pub(crate) fn confirm(&mut self, user: UserProfile) {
        if self.access_token.is_some() {
            self.user = Some(user);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}
