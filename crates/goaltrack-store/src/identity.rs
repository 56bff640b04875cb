//! Identity provider interface
//!
//! Sign-in and sign-out happen elsewhere; the client only ever asks who is
//! signed in right now.

use goaltrack_model::{UserId, UserProfile};
use parking_lot::RwLock;

/// Source of the current user
pub trait IdentityProvider: Send + Sync {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<UserProfile>;

    /// Id of the currently signed-in user, if any
    fn current_user_id(&self) -> Option<UserId> {
        self.current_user().map(|p| p.uid)
    }
}

/// In-process identity holder
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: RwLock<Option<UserProfile>>,
}

impl StaticIdentity {
    /// Create with nobody signed in
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a signed-in user
    #[inline]
    #[must_use]
    pub fn signed_in(profile: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(profile)),
        }
    }

    /// Replace the current user
    pub fn sign_in(&self, profile: UserProfile) {
        tracing::info!(uid = %profile.uid, "signed in");
        *self.user.write() = Some(profile);
    }

    /// Clear the current user
    pub fn sign_out(&self) {
        if let Some(previous) = self.user.write().take() {
            tracing::info!(uid = %previous.uid, "signed out");
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().clone()
    }
}
