//! # Session gate
//!
//! Decides, for every navigation attempt, whether it may proceed or where it
//! must be redirected. The decision is split in two:
//!
//! - [`decide`] is a pure function of the target [`RouteDescriptor`] and the
//!   current [`SessionState`].
//! - [`SessionGate::check`] queries the identity provider (bounded by the
//!   request timeout) and feeds the result into [`decide`].
//!
//! ## Precedence
//!
//! | # | Condition | Outcome |
//! |---|-----------|---------|
//! | 1 | target is `login`/`register`, logged in | redirect to `admin` or `home` by role |
//! | 2 | target requires auth, logged out | redirect to `login` |
//! | 3 | target is admin-only, not an admin | redirect to `home` |
//! | 4 | target is `landing`, logged in | redirect to `admin` or `home` by role |
//! | 5 | otherwise | proceed |
//!
//! ## Failure policy
//!
//! A provider error or timeout is logged and collapsed to
//! [`SessionState::LoggedOut`] at this boundary only. Nothing is retried; the
//! next navigation queries the provider again.

use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::IdentityProvider;
use crate::error::ProviderError;
use crate::models::SessionState;
use crate::routes::{RouteDescriptor, RouteName};
use crate::timeout::with_timeout;

/// Outcome of a navigation check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(RouteName),
}

impl Decision {
    pub fn is_proceed(self) -> bool {
        matches!(self, Decision::Proceed)
    }

    pub fn redirect_target(self) -> Option<RouteName> {
        match self {
            Decision::Proceed => None,
            Decision::Redirect(name) => Some(name),
        }
    }
}

fn landing_for(session: &SessionState) -> RouteName {
    if session.is_admin() {
        RouteName::Admin
    } else {
        RouteName::Home
    }
}

/// Apply the navigation rules to a target route and a session.
pub fn decide(target: &RouteDescriptor, session: &SessionState) -> Decision {
    let logged_in = session.is_logged_in();

    if target.name.is_auth_page() && logged_in {
        return Decision::Redirect(landing_for(session));
    }
    if target.requires_auth && !logged_in {
        return Decision::Redirect(RouteName::Login);
    }
    if target.admin_only && !session.is_admin() {
        return Decision::Redirect(RouteName::Home);
    }
    if target.name == RouteName::Landing && logged_in {
        return Decision::Redirect(landing_for(session));
    }
    Decision::Proceed
}

/// Navigation gate over an identity provider.
#[derive(Clone, Debug)]
pub struct SessionGate<I> {
    identity: I,
    timeout: Duration,
}

impl<I: IdentityProvider> SessionGate<I> {
    pub fn new(identity: I, timeout: Duration) -> Self {
        Self { identity, timeout }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Ask the provider who is navigating.
    pub async fn query_session(&self) -> Result<SessionState, ProviderError> {
        let session = with_timeout(self.timeout, self.identity.get_session()).await??;
        Ok(session.into())
    }

    /// The current session, logged out when the provider cannot answer.
    pub async fn session_state(&self) -> SessionState {
        match self.query_session().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Session query failed, treating as logged out: {e}");
                SessionState::LoggedOut
            }
        }
    }

    /// Decide whether navigation to `target` may proceed.
    pub async fn check(&self, target: &RouteDescriptor) -> Decision {
        let session = self.session_state().await;
        let decision = decide(target, &session);
        debug!(route = %target.name, ?decision, "Navigation checked");
        decision
    }

    pub async fn check_route(&self, target: RouteName) -> Decision {
        self.check(target.descriptor()).await
    }
}
