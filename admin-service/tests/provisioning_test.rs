//! Integration tests for the super-admin provisioning workflow.
//!
//! The workflow runs against the exported test doubles (MockDirectory,
//! MemoryStore) so every external side effect can be counted.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use admin_service::dtos::CreateSuperAdminRequest;
use admin_service::middleware::{CallerClaims, CallerContext};
use admin_service::models::{
    AdminRecord, BackupRecord, ACTION_SUPERADMIN_CREATION, ACTION_SUPERADMIN_CREATION_FAILED,
    PURPOSE_INITIAL_CREATION,
};
use admin_service::services::{
    AdminStore, AuditService, MemoryStore, MockDirectory, ProvisionError, ProvisioningService,
};
use admin_service::utils::{OsCrypto, DEFAULT_MIN_PASSWORD_LENGTH};
use service_core::error::AppError;
use sha2::{Digest, Sha256};

const SECRET: &str = "test-provisioning-secret";

fn service(directory: Arc<MockDirectory>, store: Arc<MemoryStore>) -> ProvisioningService {
    let audit_store: Arc<dyn AdminStore> = store.clone();
    let workflow_store: Arc<dyn AdminStore> = store;
    ProvisioningService::new(
        directory,
        workflow_store,
        AuditService::new(audit_store),
        Arc::new(OsCrypto),
        SECRET.to_string(),
        DEFAULT_MIN_PASSWORD_LENGTH,
    )
}

fn authorized_context() -> CallerContext {
    CallerContext {
        authenticated: true,
        claims: CallerClaims {
            super_admin: true,
            ip_whitelisted: true,
        },
        caller_uid: "root-admin-1".to_string(),
        caller_ip: "10.0.0.1".to_string(),
        user_agent: Some("provisioning-tests".to_string()),
    }
}

fn request(email: &str, password: &str, secret: &str) -> CreateSuperAdminRequest {
    CreateSuperAdminRequest {
        email: email.to_string(),
        password: password.to_string(),
        secret: secret.to_string(),
    }
}

fn assert_no_side_effects(directory: &MockDirectory, store: &MemoryStore) {
    assert_eq!(directory.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(directory.claims_calls.load(Ordering::SeqCst), 0);
    assert!(store.admins.lock().unwrap().is_empty());
    assert!(store.backups.lock().unwrap().is_empty());
    assert!(store.audit.lock().unwrap().is_empty());
}

#[tokio::test]
async fn provisioning_succeeds_with_valid_input() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let response = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .expect("provisioning should succeed");

    assert!(response.success);
    assert_eq!(response.uid, "uid-1");
    assert_eq!(response.backup_code.len(), 32);
    assert_eq!(response.backup_key.len(), 16);
    assert!(response.backup_code.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(response.backup_key.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!response.warning.is_empty());
}

#[tokio::test]
async fn provisioning_persists_both_records_atomically() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let response = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap();

    let admins = store.admins.lock().unwrap();
    let backups = store.backups.lock().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(backups.len(), 1);

    let admin = &admins[0];
    assert_eq!(admin.uid, response.uid);
    assert_eq!(admin.email, "a@b.com");
    assert!(admin.is_active);
    assert_eq!(admin.status, "active");
    assert_eq!(admin.created_by, "root-admin-1");
    assert_eq!(admin.ip_address, "10.0.0.1");
    assert!(admin.created_at.is_some(), "store assigns created_at");

    // Only the hash of the backup code persists.
    let expected_hash = hex::encode(Sha256::digest(response.backup_code.as_bytes()));
    assert_eq!(admin.backup_code_hash, expected_hash);
    assert_eq!(admin.backup_key_id, response.backup_key);

    let backup = &backups[0];
    assert_eq!(backup.uid, response.uid);
    assert_eq!(backup.hashed_code, expected_hash);
    assert!(!backup.used);
    assert_eq!(backup.purpose, PURPOSE_INITIAL_CREATION);
    assert!(backup.created_at.is_some());
}

#[tokio::test]
async fn provisioning_attaches_the_full_claims_bundle() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap();

    assert_eq!(directory.claims_calls.load(Ordering::SeqCst), 1);
    let claims = directory.last_claims.lock().unwrap().clone().unwrap();
    assert!(claims.super_admin);
    assert!(claims.can_elevate);
    assert_eq!(claims.role, "super-admin");
    assert_eq!(claims.security_level, "maximum");
}

#[tokio::test]
async fn provisioning_records_a_success_audit_event() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let response = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap();

    let audit = store.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    let event = &audit[0];
    assert_eq!(event.action, ACTION_SUPERADMIN_CREATION);
    assert_eq!(event.uid.as_deref(), Some(response.uid.as_str()));
    assert_eq!(event.performer.as_deref(), Some("root-admin-1"));
    assert_eq!(event.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(event.user_agent.as_deref(), Some("provisioning-tests"));
}

#[tokio::test]
async fn unauthenticated_caller_is_denied_with_zero_side_effects() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let mut context = authorized_context();
    context.authenticated = false;

    let err = service
        .create_super_admin(request("a@b.com", "123456789012", SECRET), &context)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::PermissionDenied));
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn caller_without_super_admin_claim_is_denied() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let mut context = authorized_context();
    context.claims.super_admin = false;

    let err = service
        .create_super_admin(request("a@b.com", "123456789012", SECRET), &context)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::PermissionDenied));
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn wrong_secret_is_denied() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let err = service
        .create_super_admin(
            request("a@b.com", "123456789012", "not-the-secret"),
            &authorized_context(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::PermissionDenied));
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn non_whitelisted_ip_is_denied() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let mut context = authorized_context();
    context.claims.ip_whitelisted = false;

    let err = service
        .create_super_admin(request("a@b.com", "123456789012", SECRET), &context)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::PermissionDenied));
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn short_password_fails_validation_before_any_external_call() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let err = service
        .create_super_admin(request("a@b.com", "short", SECRET), &authorized_context())
        .await
        .unwrap_err();

    match err {
        ProvisionError::Validation(message) => {
            assert!(message.contains("12"), "message names the minimum: {message}")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn malformed_email_fails_validation() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    for email in ["no-at-sign", "a@b@c.com", "a@nodot", "white space@b.com"] {
        let err = service
            .create_super_admin(
                request(email, "123456789012", SECRET),
                &authorized_context(),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, ProvisionError::Validation(_)),
            "{email} should be rejected"
        );
    }
    assert_no_side_effects(&directory, &store);
}

#[tokio::test]
async fn duplicate_email_surfaces_as_provisioning_failure_with_audit_entry() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    *directory.fail_create_with.lock().unwrap() = Some("email already exists".to_string());

    let err = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Provisioning(_)));
    // Caller only ever sees the coarse internal kind.
    assert!(matches!(AppError::from(err), AppError::InternalError(_)));

    // No claims or record writes were attempted.
    assert_eq!(directory.claims_calls.load(Ordering::SeqCst), 0);
    assert!(store.admins.lock().unwrap().is_empty());
    assert!(store.backups.lock().unwrap().is_empty());

    // The failure is audited without a uid (the account never existed).
    let audit = store.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    let event = &audit[0];
    assert_eq!(event.action, ACTION_SUPERADMIN_CREATION_FAILED);
    assert!(event.uid.is_none());
    assert!(event
        .detail
        .as_deref()
        .unwrap()
        .contains("email already exists"));
}

#[tokio::test]
async fn claims_failure_is_audited_with_the_orphaned_uid() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    *directory.fail_claims_with.lock().unwrap() = Some("claims service unavailable".to_string());

    let err = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Claims(_)));

    // The account exists but nothing was persisted.
    assert_eq!(directory.create_calls.load(Ordering::SeqCst), 1);
    assert!(store.admins.lock().unwrap().is_empty());
    assert!(store.backups.lock().unwrap().is_empty());

    let audit = store.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, ACTION_SUPERADMIN_CREATION_FAILED);
    assert_eq!(audit[0].uid.as_deref(), Some("uid-1"));
}

#[tokio::test]
async fn persistence_failure_leaves_neither_record_behind() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    store.fail_persist.store(true, Ordering::SeqCst);

    let err = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Persistence(_)));

    // Atomicity: both records absent after the failed batch.
    assert!(store.admins.lock().unwrap().is_empty());
    assert!(store.backups.lock().unwrap().is_empty());

    let audit = store.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, ACTION_SUPERADMIN_CREATION_FAILED);
    assert_eq!(audit[0].uid.as_deref(), Some("uid-1"));
}

#[tokio::test]
async fn failure_between_batch_writes_rolls_the_admin_record_back() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    // The admin record is written, then the batch fails before the backup
    // record; the aborted batch must take the admin record with it.
    store.fail_persist_mid_batch.store(true, Ordering::SeqCst);

    let err = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Persistence(_)));
    assert!(store.admins.lock().unwrap().is_empty());
    assert!(store.backups.lock().unwrap().is_empty());

    let audit = store.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, ACTION_SUPERADMIN_CREATION_FAILED);
    assert_eq!(audit[0].uid.as_deref(), Some("uid-1"));
}

#[tokio::test]
async fn retried_persistence_keeps_the_original_created_at() {
    let store = MemoryStore::default();
    let admin = AdminRecord {
        uid: "uid-1".to_string(),
        email: "a@b.com".to_string(),
        created_at: None,
        backup_code_hash: "hash".to_string(),
        backup_key_id: "key".to_string(),
        is_active: true,
        created_by: "root-admin-1".to_string(),
        ip_address: "10.0.0.1".to_string(),
        status: "active".to_string(),
    };
    let backup = BackupRecord::for_initial_creation("uid-1", "hash");

    store.persist_admin(&admin, &backup).await.unwrap();
    let first_admin_stamp = store.admins.lock().unwrap()[0].created_at;
    let first_backup_stamp = store.backups.lock().unwrap()[0].created_at;
    assert!(first_admin_stamp.is_some());

    // A retry of the same uid upserts instead of duplicating, and the
    // original creation stamp survives.
    store.persist_admin(&admin, &backup).await.unwrap();
    let admins = store.admins.lock().unwrap();
    let backups = store.backups.lock().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(backups.len(), 1);
    assert_eq!(admins[0].created_at, first_admin_stamp);
    assert_eq!(backups[0].created_at, first_backup_stamp);
}

#[tokio::test]
async fn audit_failure_does_not_fail_the_operation() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    store.fail_audit.store(true, Ordering::SeqCst);

    let response = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .expect("audit failures must not surface");

    assert!(response.success);
    assert_eq!(store.admins.lock().unwrap().len(), 1);
    assert_eq!(store.backups.lock().unwrap().len(), 1);
    assert!(store.audit.lock().unwrap().is_empty());
}

#[tokio::test]
async fn permission_denial_maps_to_the_permission_denied_kind() {
    let err = ProvisionError::PermissionDenied;
    assert!(matches!(AppError::from(err), AppError::Forbidden(_)));
}

#[tokio::test]
async fn every_other_failure_maps_to_the_internal_kind() {
    let errors = [
        ProvisionError::Validation("password too short".to_string()),
        ProvisionError::Provisioning(anyhow::anyhow!("duplicate")),
        ProvisionError::Claims(anyhow::anyhow!("claims down")),
        ProvisionError::Persistence(anyhow::anyhow!("batch failed")),
    ];
    for err in errors {
        assert!(matches!(AppError::from(err), AppError::InternalError(_)));
    }
}

#[tokio::test]
async fn sequential_provisioning_yields_distinct_credentials() {
    let directory = Arc::new(MockDirectory::default());
    let store = Arc::new(MemoryStore::default());
    let service = service(directory.clone(), store.clone());

    let first = service
        .create_super_admin(
            request("a@b.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap();
    let second = service
        .create_super_admin(
            request("c@d.com", "123456789012", SECRET),
            &authorized_context(),
        )
        .await
        .unwrap();

    assert_ne!(first.uid, second.uid);
    assert_ne!(first.backup_code, second.backup_code);
    assert_ne!(first.backup_key, second.backup_key);
}
