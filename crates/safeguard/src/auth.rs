//! Authentication collaborator interface.
//!
//! Authentication itself lives outside this crate. The core only consumes a
//! provider that can log users in and out and that publishes the currently
//! signed-in user on a [`tokio::sync::watch`] channel. Components that need
//! the current user take a [`CurrentUser`] subscription when they mount and
//! drop it when they unmount.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// A signed-in user as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-assigned user identifier.
    pub uid: String,
    /// Email address used to sign in.
    pub email: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// Create a user with the given id and email.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
        }
    }
}

/// An error reported by the authentication provider.
///
/// The message is shown to the user exactly as the provider phrased it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    /// Provider-specific error code (e.g. `auth/wrong-password`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl AuthError {
    /// Create a new auth error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Trait for authentication providers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error verbatim if sign-in is rejected.
    async fn login(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Create an account with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error verbatim if sign-up is rejected.
    async fn signup(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Sign out the current user.
    ///
    /// # Errors
    ///
    /// Returns the provider's error verbatim if sign-out fails.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns the provider's error verbatim if the request is rejected.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    /// Subscribe to the current-user stream.
    fn subscribe(&self) -> CurrentUser;
}

/// A live subscription to the current signed-in user.
///
/// Dropping the subscription (or calling [`CurrentUser::unsubscribe`]) ends it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    rx: watch::Receiver<Option<User>>,
}

impl CurrentUser {
    /// Wrap a watch receiver.
    #[must_use]
    pub fn new(rx: watch::Receiver<Option<User>>) -> Self {
        Self { rx }
    }

    /// The user signed in right now, if any.
    #[must_use]
    pub fn get(&self) -> Option<User> {
        self.rx.borrow().clone()
    }

    /// The id of the user signed in right now, if any.
    #[must_use]
    pub fn uid(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|user| user.uid.clone())
    }

    /// Wait for the next change of the signed-in user.
    ///
    /// Returns `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<Option<User>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// End the subscription.
    pub fn unsubscribe(self) {
        debug!("Current-user subscription released");
    }
}

/// A provider whose signed-in user is fixed by the caller.
///
/// Used by the command-line binary, where the acting user is named on the
/// command line rather than established through an interactive sign-in.
/// Credential operations are not supported and report an error.
#[derive(Debug)]
pub struct FixedIdentity {
    tx: watch::Sender<Option<User>>,
}

impl FixedIdentity {
    /// Create a provider with `user` already signed in.
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        let (tx, _rx) = watch::channel(Some(user));
        Self { tx }
    }

    /// Create a provider with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    fn unsupported(operation: &str) -> AuthError {
        AuthError::new(
            "auth/operation-not-allowed",
            format!("{operation} is not available with a fixed identity"),
        )
    }
}

#[async_trait]
impl AuthProvider for FixedIdentity {
    async fn login(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        Err(Self::unsupported("login"))
    }

    async fn signup(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        Err(Self::unsupported("signup"))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.tx.send_replace(None);
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        Err(Self::unsupported("password reset"))
    }

    fn subscribe(&self) -> CurrentUser {
        CurrentUser::new(self.tx.subscribe())
    }
}
