//! Role resolution and dashboard gates against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use shopease_client::access::{Gate, GateDecision, RoleState, RoleWatcher, lookup_role};
use shopease_client::identity::ProfileUpdate;
use shopease_client::session::SessionStore;
use shopease_core::{Email, Role};
use shopease_integration_tests::{FakeBackend, StubIdentity, user_doc};

const ROLE_LOOKUP: &str = "GET /users/{key}";

fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

fn password(raw: &str) -> SecretString {
    SecretString::from(raw.to_string())
}

#[tokio::test]
async fn test_role_lookup() {
    let backend = FakeBackend::start().await;
    {
        let mut state = backend.state();
        state.users.push(user_doc("u-1", "boss@shop.io", "admin", "Gold"));
        state.users.push(user_doc("u-2", "shopper@shop.io", "user", "Bronze"));
        let mut legacy = user_doc("u-3", "legacy@shop.io", "user", "Bronze");
        legacy["role"] = serde_json::Value::Null;
        state.users.push(legacy);
    }
    let client = backend.client();

    assert_eq!(lookup_role(&client, &email("boss@shop.io")).await, Role::Admin);
    assert_eq!(lookup_role(&client, &email("shopper@shop.io")).await, Role::User);
    assert_eq!(lookup_role(&client, &email("legacy@shop.io")).await, Role::User);
    // Unknown users answer 404
    assert_eq!(lookup_role(&client, &email("ghost@shop.io")).await, Role::User);
}

#[tokio::test]
async fn test_role_lookup_falls_back_when_backend_is_down() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    drop(backend);

    assert_eq!(lookup_role(&client, &email("boss@shop.io")).await, Role::User);
}

#[tokio::test]
async fn test_admin_gate_follows_session() {
    let backend = FakeBackend::start().await;
    backend
        .state()
        .users
        .push(user_doc("u-1", "boss@shop.io", "admin", "Gold"));
    let client = backend.client();
    let session = SessionStore::new(
        Arc::new(StubIdentity::with_account("boss@shop.io", "Secret1")),
        client.clone(),
    );
    let mut watcher = RoleWatcher::spawn(client, &session);
    assert_eq!(watcher.decide(Gate::Admin), GateDecision::Loading);

    session
        .sign_in(&email("boss@shop.io"), &password("Secret1"))
        .await
        .unwrap();

    assert_eq!(watcher.settled().await, RoleState::resolved(Role::Admin));
    assert_eq!(watcher.decide(Gate::Admin), GateDecision::Authorized);
    // The shopper area requires exactly the user role
    assert_eq!(watcher.decide(Gate::User), GateDecision::Unauthorized);

    // Sign-in upsert must not demote the stored role
    assert_eq!(backend.hits("POST /users/upsert"), 1);
    assert_eq!(backend.state().users[0]["role"], "admin");

    session.sign_out().await.unwrap();
    loop {
        match watcher.changed().await {
            Some(RoleState::SIGNED_OUT) | None => break,
            Some(_) => {}
        }
    }
    assert_eq!(watcher.decide(Gate::Admin), GateDecision::Unauthorized);
}

#[tokio::test]
async fn test_role_is_looked_up_once_per_account() {
    let backend = FakeBackend::start().await;
    backend
        .state()
        .users
        .push(user_doc("u-1", "boss@shop.io", "admin", "Gold"));
    let client = backend.client();
    let session = SessionStore::new(
        Arc::new(StubIdentity::with_account("boss@shop.io", "Secret1")),
        client.clone(),
    );
    let mut watcher = RoleWatcher::spawn(client, &session);

    session
        .sign_in(&email("boss@shop.io"), &password("Secret1"))
        .await
        .unwrap();
    assert_eq!(watcher.settled().await, RoleState::resolved(Role::Admin));
    assert_eq!(backend.hits(ROLE_LOOKUP), 1);

    // Same account republished
    session.refresh().await.unwrap();
    session
        .update_profile(&ProfileUpdate {
            display_name: Some("Boss".to_string()),
            photo_url: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(backend.hits(ROLE_LOOKUP), 1);
    assert_eq!(watcher.current(), RoleState::resolved(Role::Admin));
}
