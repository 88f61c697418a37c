//! Integration tests for the SQLite store.

use ally_core::{DatabaseConfig, OAuthConfig, ToolGroupInput, ToolInput};
use ally_oauth::{AuthError, CredentialStore, OAuthIssuer, SigningKey};
use ally_store::{SqliteStore, StoreError};
use std::sync::Arc;

fn tool_input(name: &str, code: &str) -> ToolInput {
    ToolInput {
        name: name.to_string(),
        description: format!("Instructions for {name}"),
        code: code.to_string(),
    }
}

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.unwrap()
}

#[tokio::test]
async fn test_tool_crud() {
    let store = store().await;

    let created = store
        .create_tool(tool_input("Random Number", "def rnd():\n    return 4"))
        .await
        .unwrap();
    assert_eq!(store.get_tool(created.id).await.unwrap(), created);

    let updated = store
        .update_tool(created.id, tool_input("Random Number v2", "def rnd2():\n    pass"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Random Number v2");
    assert_eq!(store.list_tools().await.unwrap(), vec![updated.clone()]);

    store.delete_tool(created.id).await.unwrap();
    assert!(matches!(
        store.get_tool(created.id).await,
        Err(StoreError::NotFound { entity: "tool", .. })
    ));
}

#[tokio::test]
async fn test_blank_name_is_validation_error() {
    let store = store().await;
    assert!(matches!(
        store.create_tool(tool_input("   ", "")).await,
        Err(StoreError::Validation { field: "name" })
    ));
    assert!(matches!(
        store.create_user("").await,
        Err(StoreError::Validation { field: "name" })
    ));
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let store = store().await;
    assert!(matches!(
        store.update_tool(99, tool_input("x", "")).await,
        Err(StoreError::NotFound { entity: "tool", id: 99 })
    ));
    assert!(matches!(
        store.delete_group(7).await,
        Err(StoreError::NotFound { entity: "tool group", id: 7 })
    ));
    assert!(matches!(
        store.enabled_set(5).await,
        Err(StoreError::NotFound { entity: "user", id: 5 })
    ));
}

#[tokio::test]
async fn test_group_members_sorted_and_set_semantics() {
    let store = store().await;
    let zeta = store.create_tool(tool_input("Zeta", "")).await.unwrap();
    let alpha = store.create_tool(tool_input("Alpha", "")).await.unwrap();

    let group = store
        .create_group(ToolGroupInput {
            name: "Letters".into(),
            instructions: "Use letters.".into(),
            tool_ids: vec![zeta.id, alpha.id, zeta.id],
        })
        .await
        .unwrap();

    let names: Vec<_> = group.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

#[tokio::test]
async fn test_group_with_unknown_member_rolls_back() {
    let store = store().await;
    let err = store
        .create_group(ToolGroupInput {
            name: "Broken".into(),
            instructions: String::new(),
            tool_ids: vec![1234],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "tool", id: 1234 }));
    assert!(store.list_groups().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_tool_cascades_membership_and_selection() {
    let store = store().await;
    let user = store.create_user("alice").await.unwrap();
    let a = store.create_tool(tool_input("A", "")).await.unwrap();
    let b = store.create_tool(tool_input("B", "")).await.unwrap();
    let group = store
        .create_group(ToolGroupInput {
            name: "G".into(),
            instructions: String::new(),
            tool_ids: vec![a.id, b.id],
        })
        .await
        .unwrap();
    store.set_selections(user.id, &[a.id], &[group.id]).await.unwrap();

    store.delete_tool(a.id).await.unwrap();

    let group = store.get_group(group.id).await.unwrap();
    assert_eq!(group.member_ids(), vec![b.id]);

    let enabled = store.enabled_set(user.id).await.unwrap();
    assert!(enabled.tools.is_empty());
    assert_eq!(enabled.groups.len(), 1);
}

#[tokio::test]
async fn test_selections_default_false_and_replace() {
    let store = store().await;
    let user = store.create_user("bob").await.unwrap();
    let a = store.create_tool(tool_input("A", "")).await.unwrap();
    let b = store.create_tool(tool_input("B", "")).await.unwrap();

    let selections = store.tool_selections(user.id).await.unwrap();
    assert!(selections.iter().all(|s| !s.enabled));

    store.set_selections(user.id, &[a.id, b.id], &[]).await.unwrap();
    store.set_selections(user.id, &[b.id], &[]).await.unwrap();

    let enabled: Vec<_> = store
        .tool_selections(user.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.enabled)
        .map(|s| s.id)
        .collect();
    assert_eq!(enabled, vec![b.id]);

    store.set_tool_enabled(user.id, a.id, true).await.unwrap();
    store.set_tool_enabled(user.id, b.id, false).await.unwrap();
    let set = store.enabled_set(user.id).await.unwrap();
    assert_eq!(set.tools.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id]);
}

#[tokio::test]
async fn test_selection_of_unknown_tool_is_not_found() {
    let store = store().await;
    let user = store.create_user("carol").await.unwrap();
    assert!(matches!(
        store.set_selections(user.id, &[42], &[]).await,
        Err(StoreError::NotFound { entity: "tool", id: 42 })
    ));
    assert!(matches!(
        store.set_group_enabled(user.id, 42, true).await,
        Err(StoreError::NotFound { entity: "tool group", id: 42 })
    ));
}

#[tokio::test]
async fn test_duplicate_user_name_conflicts() {
    let store = store().await;
    store.create_user("dave").await.unwrap();
    assert!(matches!(
        store.create_user("dave").await,
        Err(StoreError::Conflict { entity: "user", .. })
    ));
}

#[tokio::test]
async fn test_import_creates_tools_and_group() {
    let store = store().await;
    let group = store
        .create_group_with_tools(
            "email-server",
            "Handle email.",
            vec![tool_input("send_email_tool", ""), tool_input("get_email_body", "")],
        )
        .await
        .unwrap();

    assert_eq!(group.name, "email-server");
    assert_eq!(group.tools.len(), 2);
    assert_eq!(store.list_tools().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_credential_store_roundtrip() {
    let store = store().await;
    let user = store.create_user("erin").await.unwrap();

    assert_eq!(store.user_name(user.id).await.unwrap().as_deref(), Some("erin"));
    assert!(store.user_name(999).await.unwrap().is_none());

    let registration = ally_oauth::ClientRegistration {
        client_id: format!("ally_agent_user_{}", user.id),
        user_id: user.id,
        secret_hash: "$argon2id$first".into(),
        client_name: "erin OAuth Client".into(),
        grant_types: vec!["client_credentials".into()],
        redirect_uris: vec!["urn:ietf:wg:oauth:2.0:oob".into()],
    };
    let created = store.upsert_client(registration.clone()).await.unwrap();
    assert_eq!(created.redirect_uris, vec!["urn:ietf:wg:oauth:2.0:oob"]);
    assert!(!created.revoked);

    let rotated = store
        .upsert_client(ally_oauth::ClientRegistration {
            secret_hash: "$argon2id$second".into(),
            ..registration
        })
        .await
        .unwrap();
    assert_eq!(rotated.secret_hash, "$argon2id$second");
    assert_eq!(rotated.created_at, created.created_at);

    store
        .record_token(ally_oauth::TokenRecord {
            token_hash: "abc".into(),
            client_id: created.client_id.clone(),
            user_id: user.id,
            scope: "read:tools".into(),
            expires_at: 100,
        })
        .await
        .unwrap();
    assert!(!store.is_token_revoked("abc").await.unwrap());
    assert!(!store.is_token_revoked("unknown").await.unwrap());

    assert!(store.revoke_client(&created.client_id).await.unwrap());
    assert!(store.is_token_revoked("abc").await.unwrap());
    assert!(store.find_client(&created.client_id).await.unwrap().unwrap().revoked);
    assert!(!store.revoke_client("nobody").await.unwrap());

    assert_eq!(store.purge_expired_tokens(100).await.unwrap(), 1);
}

#[tokio::test]
async fn test_deleting_user_cascades_client() {
    let store = store().await;
    let user = store.create_user("frank").await.unwrap();
    store
        .upsert_client(ally_oauth::ClientRegistration {
            client_id: "ally_agent_user_x".into(),
            user_id: user.id,
            secret_hash: "h".into(),
            client_name: "frank OAuth Client".into(),
            grant_types: vec![],
            redirect_uris: vec![],
        })
        .await
        .unwrap();

    store.delete_user(user.id).await.unwrap();
    assert!(store.find_client_for_user(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("nested/ally.sqlite"),
    };

    {
        let store = SqliteStore::open(&config).await.unwrap();
        store.create_user("grace").await.unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteStore::open(&config).await.unwrap();
    assert_eq!(reopened.list_users().await.unwrap()[0].name, "grace");
}

#[tokio::test]
async fn test_issuer_over_sqlite() {
    let store = store().await;
    let user = store.create_user("heidi").await.unwrap();
    let issuer = OAuthIssuer::new(
        Arc::new(store.clone()),
        SigningKey::generate().unwrap(),
        &OAuthConfig::default(),
    );

    let first = issuer.rotate_secret(user.id).await.unwrap();
    let grant = issuer
        .issue_token(&first.client_id, &first.client_secret, None)
        .await
        .unwrap();
    assert_eq!(grant.scope, "read:tools");

    let claims = issuer.verify_bearer(&grant.access_token).await.unwrap();
    assert_eq!(claims.sub, user.id);

    let second = issuer.rotate_secret(user.id).await.unwrap();
    assert_eq!(second.client_id, first.client_id);
    assert!(matches!(
        issuer.issue_token(&first.client_id, &first.client_secret, None).await,
        Err(AuthError::InvalidSecret)
    ));
    // Rotation leaves issued tokens alone.
    assert!(issuer.verify_bearer(&grant.access_token).await.is_ok());

    issuer.revoke_client(user.id).await.unwrap();
    assert!(!issuer.introspect(&grant.access_token).await.active);
    assert!(matches!(
        issuer.issue_token(&second.client_id, &second.client_secret, None).await,
        Err(AuthError::InvalidClient)
    ));

    assert!(matches!(
        issuer.rotate_secret(9999).await,
        Err(AuthError::UnknownUser { user_id: 9999 })
    ));
}
