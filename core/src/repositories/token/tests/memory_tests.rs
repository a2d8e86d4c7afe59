//! Unit tests for the in-memory token repository

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainError;
use crate::repositories::token::{InMemoryTokenRepository, RotationOutcome, TokenRepository};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

fn family_root(user_id: Uuid, hash: &str) -> RefreshToken {
    RefreshToken::new_family(user_id, hash.to_string(), now(), Duration::days(7)).unwrap()
}

#[tokio::test]
async fn test_save_and_find_refresh_token() {
    let repo = InMemoryTokenRepository::new();
    let token = family_root(Uuid::new_v4(), "hash_a");

    let saved = repo.save_refresh_token(token.clone()).await.unwrap();
    assert_eq!(saved, token);

    let by_hash = repo.find_refresh_token("hash_a").await.unwrap();
    assert_eq!(by_hash, Some(token.clone()));

    let by_id = repo.find_by_id(token.id).await.unwrap();
    assert_eq!(by_id, Some(token));

    assert!(repo.find_refresh_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_hash_rejected() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();

    repo.save_refresh_token(family_root(user_id, "same")).await.unwrap();
    let result = repo.save_refresh_token(family_root(user_id, "same")).await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert_eq!(repo.all().await.len(), 1);
}

#[tokio::test]
async fn test_rotate_flips_predecessor_and_inserts_successor() {
    let repo = InMemoryTokenRepository::new();
    let root = repo
        .save_refresh_token(family_root(Uuid::new_v4(), "root"))
        .await
        .unwrap();
    let rotated_at = now() + Duration::hours(1);
    let successor = root
        .successor("child".to_string(), rotated_at, Duration::days(7))
        .unwrap();

    let outcome = repo
        .rotate_refresh_token(root.id, successor.clone(), rotated_at)
        .await
        .unwrap();
    assert_eq!(outcome, RotationOutcome::Rotated(successor.clone()));

    let stored_root = repo.find_by_id(root.id).await.unwrap().unwrap();
    assert!(stored_root.is_revoked);
    assert_eq!(stored_root.revoked_at, Some(rotated_at));
    assert_eq!(stored_root.revocation_reason, Some(RevocationReason::Rotated));

    let stored_child = repo.find_refresh_token("child").await.unwrap().unwrap();
    assert_eq!(stored_child.parent_id, Some(root.id));
    assert_eq!(stored_child.family_id, root.family_id);
}

#[tokio::test]
async fn test_second_rotation_of_same_predecessor_writes_nothing() {
    let repo = InMemoryTokenRepository::new();
    let root = repo
        .save_refresh_token(family_root(Uuid::new_v4(), "root"))
        .await
        .unwrap();
    let first = root.successor("first".to_string(), now(), Duration::days(7)).unwrap();
    let second = root.successor("second".to_string(), now(), Duration::days(7)).unwrap();

    let outcome = repo.rotate_refresh_token(root.id, first, now()).await.unwrap();
    assert!(matches!(outcome, RotationOutcome::Rotated(_)));

    let outcome = repo.rotate_refresh_token(root.id, second, now()).await.unwrap();
    assert_eq!(outcome, RotationOutcome::AlreadyRevoked);
    assert!(repo.find_refresh_token("second").await.unwrap().is_none());
    assert_eq!(repo.all().await.len(), 2);
}

#[tokio::test]
async fn test_rotate_unknown_predecessor_is_not_found() {
    let repo = InMemoryTokenRepository::new();
    let orphan = family_root(Uuid::new_v4(), "orphan");

    let result = repo.rotate_refresh_token(Uuid::new_v4(), orphan, now()).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert!(repo.all().await.is_empty());
}

#[tokio::test]
async fn test_rotate_with_colliding_successor_leaves_predecessor_valid() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let root = repo.save_refresh_token(family_root(user_id, "root")).await.unwrap();
    repo.save_refresh_token(family_root(user_id, "taken")).await.unwrap();

    let successor = root.successor("taken".to_string(), now(), Duration::days(7)).unwrap();
    let result = repo.rotate_refresh_token(root.id, successor, now()).await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    let stored_root = repo.find_by_id(root.id).await.unwrap().unwrap();
    assert!(!stored_root.is_revoked);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotations_have_single_winner() {
    let repo = Arc::new(InMemoryTokenRepository::new());
    let root = repo
        .save_refresh_token(family_root(Uuid::new_v4(), "root"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = Arc::clone(&repo);
        let successor = root
            .successor(format!("child_{}", i), now(), Duration::days(7))
            .unwrap();
        handles.push(tokio::spawn(async move {
            repo.rotate_refresh_token(root.id, successor, now()).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if let RotationOutcome::Rotated(_) = handle.await.unwrap().unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(repo.all().await.len(), 2);
}

#[tokio::test]
async fn test_revoke_token_is_monotonic() {
    let repo = InMemoryTokenRepository::new();
    let token = repo
        .save_refresh_token(family_root(Uuid::new_v4(), "hash"))
        .await
        .unwrap();
    let first_at = now() + Duration::minutes(5);

    assert!(repo.revoke_token(token.id, RevocationReason::Logout, first_at).await.unwrap());
    assert!(!repo
        .revoke_token(token.id, RevocationReason::Administrative, first_at + Duration::minutes(5))
        .await
        .unwrap());

    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(stored.revoked_at, Some(first_at));
    assert_eq!(stored.revocation_reason, Some(RevocationReason::Logout));

    assert!(!repo
        .revoke_token(Uuid::new_v4(), RevocationReason::Logout, now())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_family_only_touches_that_family() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let root = repo.save_refresh_token(family_root(user_id, "root")).await.unwrap();
    let child = root.successor("child".to_string(), now(), Duration::days(7)).unwrap();
    repo.rotate_refresh_token(root.id, child.clone(), now()).await.unwrap();
    let other = repo.save_refresh_token(family_root(user_id, "other")).await.unwrap();

    let revoked = repo
        .revoke_token_family(root.family_id, RevocationReason::ReuseDetected, now())
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    let stored_child = repo.find_by_id(child.id).await.unwrap().unwrap();
    assert_eq!(stored_child.revocation_reason, Some(RevocationReason::ReuseDetected));
    let stored_root = repo.find_by_id(root.id).await.unwrap().unwrap();
    assert_eq!(stored_root.revocation_reason, Some(RevocationReason::Rotated));
    assert!(!repo.find_by_id(other.id).await.unwrap().unwrap().is_revoked);

    let again = repo
        .revoke_token_family(root.family_id, RevocationReason::ReuseDetected, now())
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_find_by_family_orders_oldest_first() {
    let repo = InMemoryTokenRepository::new();
    let root = repo
        .save_refresh_token(family_root(Uuid::new_v4(), "root"))
        .await
        .unwrap();
    let later = now() + Duration::hours(2);
    let child = root.successor("child".to_string(), later, Duration::days(7)).unwrap();
    repo.rotate_refresh_token(root.id, child.clone(), later).await.unwrap();

    let family = repo.find_by_family(root.family_id).await.unwrap();
    let ids: Vec<Uuid> = family.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![root.id, child.id]);
}

#[tokio::test]
async fn test_revoke_all_user_tokens_and_active_listing() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let bystander = Uuid::new_v4();
    repo.save_refresh_token(family_root(user_id, "a")).await.unwrap();
    repo.save_refresh_token(family_root(user_id, "b")).await.unwrap();
    repo.save_refresh_token(family_root(bystander, "c")).await.unwrap();

    assert_eq!(repo.count_active_tokens(user_id, now()).await.unwrap(), 2);

    let revoked = repo
        .revoke_all_user_tokens(user_id, RevocationReason::UserRevoked, now())
        .await
        .unwrap();
    assert_eq!(revoked, 2);
    assert!(repo.find_active_by_user(user_id, now()).await.unwrap().is_empty());
    assert_eq!(repo.count_active_tokens(bystander, now()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_revoke_expired_tokens_uses_expiry_boundary() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let token = repo.save_refresh_token(family_root(user_id, "old")).await.unwrap();

    let just_before = token.expires_at - Duration::seconds(1);
    assert_eq!(repo.revoke_expired_tokens(just_before).await.unwrap(), 0);

    assert_eq!(repo.revoke_expired_tokens(token.expires_at).await.unwrap(), 1);
    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(stored.revocation_reason, Some(RevocationReason::Expired));

    assert_eq!(repo.revoke_expired_tokens(token.expires_at).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unavailable_store_reports_storage_error() {
    let repo = InMemoryTokenRepository::new();
    repo.set_unavailable(true);

    let result = repo.find_refresh_token("anything").await;
    assert!(matches!(result, Err(DomainError::Storage { .. })));
    assert!(result.unwrap_err().is_retryable());

    repo.set_unavailable(false);
    assert!(repo.find_refresh_token("anything").await.unwrap().is_none());
}
