//! Role resolution and navigation gates.
//!
//! Roles and gates only decide what a front end shows. They are not a
//! security boundary; the backend checks every protected request itself.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use shopease_core::{Email, Role};

use crate::api::ShopClient;
use crate::session::{SessionState, SessionStore};

/// The resolved role of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleState {
    /// `None` when nobody is signed in.
    pub role: Option<Role>,
    /// True while the session or the role lookup is unresolved.
    pub loading: bool,
}

impl RoleState {
    pub const LOADING: Self = Self {
        role: None,
        loading: true,
    };

    pub const SIGNED_OUT: Self = Self {
        role: None,
        loading: false,
    };

    #[must_use]
    pub const fn resolved(role: Role) -> Self {
        Self {
            role: Some(role),
            loading: false,
        }
    }
}

impl Default for RoleState {
    fn default() -> Self {
        Self::LOADING
    }
}

/// Resolve the role for a session state.
///
/// A signed-in session costs exactly one `GET /users/{email}`. Any failure
/// (unknown user, transport error, bad body) resolves to [`Role::User`].
pub async fn resolve_role(client: &ShopClient, session: &SessionState) -> RoleState {
    match session {
        SessionState::Uninitialized | SessionState::Loading => RoleState::LOADING,
        SessionState::Anonymous => RoleState::SIGNED_OUT,
        SessionState::Authenticated(identity) => {
            RoleState::resolved(lookup_role(client, &identity.email).await)
        }
    }
}

/// Look up the role stored for `email`, defaulting to [`Role::User`].
pub async fn lookup_role(client: &ShopClient, email: &Email) -> Role {
    match client.user(email).await {
        Ok(user) => {
            debug!(role = %user.role, "Resolved role");
            user.role
        }
        Err(e) => {
            warn!(error = %e, "Role lookup failed, defaulting to user");
            Role::User
        }
    }
}

/// Keeps a [`RoleState`] in step with a session.
///
/// A background task looks the role up once per signed-in account. Later
/// republishes of the same account (token refresh, profile update) reuse the
/// resolved role. Dropping the watcher stops the task.
#[derive(Debug)]
pub struct RoleWatcher {
    rx: watch::Receiver<RoleState>,
    task: JoinHandle<()>,
}

impl RoleWatcher {
    /// Start watching `session`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(client: ShopClient, session: &SessionStore) -> Self {
        let mut subscription = session.subscribe();
        let (tx, rx) = watch::channel(RoleState::LOADING);

        let task = tokio::spawn(async move {
            let mut state = subscription.current();
            // Account whose role is currently published
            let mut resolved_for: Option<Email> = None;
            loop {
                match state.identity() {
                    // Token refresh or profile update: same account, same role
                    Some(identity) if resolved_for.as_ref() == Some(&identity.email) => {}
                    Some(identity) => {
                        tx.send_replace(RoleState::LOADING);
                        let role = lookup_role(&client, &identity.email).await;
                        tx.send_replace(RoleState::resolved(role));
                        resolved_for = Some(identity.email.clone());
                    }
                    None => {
                        resolved_for = None;
                        tx.send_replace(resolve_role(&client, &state).await);
                    }
                }

                match subscription.changed().await {
                    Some(next) => state = next,
                    None => break,
                }
            }
        });

        Self { rx, task }
    }

    /// The latest role state.
    #[must_use]
    pub fn current(&self) -> RoleState {
        *self.rx.borrow()
    }

    /// Wait until the role is no longer loading.
    pub async fn settled(&mut self) -> RoleState {
        let settled = self
            .rx
            .wait_for(|state| !state.loading)
            .await
            .map(|state| *state);
        settled.unwrap_or_else(|_| *self.rx.borrow())
    }

    /// Wait for the next published role state.
    pub async fn changed(&mut self) -> Option<RoleState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Decide a gate against the latest state.
    #[must_use]
    pub fn decide(&self, gate: Gate) -> GateDecision {
        gate.decide(&self.current())
    }
}

impl Drop for RoleWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Outcome of a navigation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Show a spinner; neither redirect nor render yet.
    Loading,
    Authorized,
    /// Redirect to the unauthorized view. Signed-out and wrong-role are not
    /// distinguished.
    Unauthorized,
}

/// Route guard for a dashboard area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Admin dashboards: requires [`Role::Admin`].
    Admin,
    /// Shopper dashboards: requires exactly [`Role::User`], so admins are
    /// redirected too.
    User,
}

impl Gate {
    #[must_use]
    pub const fn decide(self, state: &RoleState) -> GateDecision {
        if state.loading {
            return GateDecision::Loading;
        }
        match (self, state.role) {
            (Self::Admin, Some(Role::Admin)) | (Self::User, Some(Role::User)) => {
                GateDecision::Authorized
            }
            _ => GateDecision::Unauthorized,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::tests::StubProvider;

    fn offline_client() -> ShopClient {
        ShopClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap()
    }

    #[test]
    fn test_gate_table() {
        let admin = RoleState::resolved(Role::Admin);
        let user = RoleState::resolved(Role::User);

        assert_eq!(Gate::Admin.decide(&admin), GateDecision::Authorized);
        assert_eq!(Gate::Admin.decide(&user), GateDecision::Unauthorized);
        assert_eq!(Gate::User.decide(&user), GateDecision::Authorized);
        assert_eq!(Gate::User.decide(&admin), GateDecision::Unauthorized);

        for gate in [Gate::Admin, Gate::User] {
            assert_eq!(gate.decide(&RoleState::LOADING), GateDecision::Loading);
            assert_eq!(gate.decide(&RoleState::SIGNED_OUT), GateDecision::Unauthorized);
        }
    }

    #[tokio::test]
    async fn test_resolve_without_session() {
        let client = offline_client();
        assert_eq!(
            resolve_role(&client, &SessionState::Anonymous).await,
            RoleState::SIGNED_OUT
        );
        assert_eq!(
            resolve_role(&client, &SessionState::Uninitialized).await,
            RoleState::LOADING
        );
    }

    #[tokio::test]
    async fn test_watcher_falls_back_to_user_when_lookup_fails() {
        let client = offline_client();
        let session = SessionStore::new(
            Arc::new(StubProvider::new("shopper@x.io", "Secret1")),
            client.clone(),
        );
        let mut watcher = RoleWatcher::spawn(client, &session);
        assert_eq!(watcher.decide(Gate::User), GateDecision::Loading);

        session
            .sign_in(
                &Email::parse("shopper@x.io").unwrap(),
                &SecretString::from("Secret1".to_string()),
            )
            .await
            .unwrap();

        let settled = watcher.settled().await;
        assert_eq!(settled, RoleState::resolved(Role::User));
        assert_eq!(watcher.decide(Gate::User), GateDecision::Authorized);
        assert_eq!(watcher.decide(Gate::Admin), GateDecision::Unauthorized);

        session.sign_out().await.unwrap();
        loop {
            if watcher.changed().await == Some(RoleState::SIGNED_OUT) {
                break;
            }
        }
        assert_eq!(watcher.decide(Gate::User), GateDecision::Unauthorized);
    }
}
