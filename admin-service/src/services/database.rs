//! MongoDB document store for admin-service.
//!
//! The provisioning workflow only touches the store through the
//! [`AdminStore`] trait so tests can swap in [`MemoryStore`].

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_document, Document},
    options::{IndexOptions, UpdateModifications, UpdateOptions},
    Client, ClientSession, IndexModel,
};
use service_core::error::AppError;

use crate::models::{AdminRecord, AuditEvent, BackupRecord};

const ADMINS: &str = "admins";
const BACKUP_CODES: &str = "backup_codes";
const AUDIT_EVENTS: &str = "audit_events";

/// Document store behind the provisioning workflow.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Write the admin record and its backup-credential record as a single
    /// atomic batch: either both commit or neither does. `created_at` is
    /// assigned by the store at commit time.
    async fn persist_admin(
        &self,
        admin: &AdminRecord,
        backup: &BackupRecord,
    ) -> Result<(), anyhow::Error>;

    /// Append an event to the audit trail.
    async fn append_audit(&self, event: &AuditEvent) -> Result<(), anyhow::Error>;
}

/// MongoDB wrapper.
#[derive(Clone)]
pub struct MongoDb {
    client: Client,
    db: mongodb::Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB...");
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB");
        Ok(Self { client, db })
    }

    pub fn admins(&self) -> mongodb::Collection<AdminRecord> {
        self.db.collection(ADMINS)
    }

    pub fn backup_codes(&self) -> mongodb::Collection<BackupRecord> {
        self.db.collection(BACKUP_CODES)
    }

    pub fn audit_events(&self) -> mongodb::Collection<AuditEvent> {
        self.db.collection(AUDIT_EVENTS)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let unique = IndexOptions::builder().unique(true).build();

        self.admins()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "uid": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;
        self.admins()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;
        self.backup_codes()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "uid": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn write_records(
        &self,
        session: &mut ClientSession,
        admin: &AdminRecord,
        backup: &BackupRecord,
    ) -> Result<(), anyhow::Error> {
        let upsert = UpdateOptions::builder().upsert(true).build();

        // Pipeline updates let the server stamp created_at with its own
        // clock ($$NOW) at commit time; $ifNull keeps the original stamp if
        // a retry hits an existing document.
        let admin_doc = to_document(admin).context("failed to serialize admin record")?;
        self.db
            .collection::<Document>(ADMINS)
            .update_one_with_session(
                doc! { "uid": &admin.uid },
                UpdateModifications::Pipeline(vec![
                    doc! { "$set": admin_doc },
                    doc! { "$set": { "created_at": { "$ifNull": ["$created_at", "$$NOW"] } } },
                ]),
                upsert.clone(),
                session,
            )
            .await
            .context("failed to write admin record")?;

        let backup_doc = to_document(backup).context("failed to serialize backup record")?;
        self.db
            .collection::<Document>(BACKUP_CODES)
            .update_one_with_session(
                doc! { "uid": &backup.uid, "purpose": &backup.purpose },
                UpdateModifications::Pipeline(vec![
                    doc! { "$set": backup_doc },
                    doc! { "$set": { "created_at": { "$ifNull": ["$created_at", "$$NOW"] } } },
                ]),
                upsert,
                session,
            )
            .await
            .context("failed to write backup record")?;

        Ok(())
    }
}

#[async_trait]
impl AdminStore for MongoDb {
    async fn persist_admin(
        &self,
        admin: &AdminRecord,
        backup: &BackupRecord,
    ) -> Result<(), anyhow::Error> {
        let mut session = self
            .client
            .start_session(None)
            .await
            .context("failed to start session")?;
        session
            .start_transaction(None)
            .await
            .context("failed to start transaction")?;

        match self.write_records(&mut session, admin, backup).await {
            Ok(()) => session
                .commit_transaction()
                .await
                .context("failed to commit provisioning transaction"),
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!(error = %abort_err, "Failed to abort provisioning transaction");
                }
                Err(err)
            }
        }
    }

    async fn append_audit(&self, event: &AuditEvent) -> Result<(), anyhow::Error> {
        self.audit_events()
            .insert_one(event, None)
            .await
            .context("failed to append audit event")?;
        Ok(())
    }
}

/// In-memory store with forced-failure switches, for tests.
///
/// `persist_admin` mirrors the transactional store: writes are staged, a
/// failure between the two writes discards the staged admin record, and
/// only a completed batch becomes visible.
#[derive(Default)]
pub struct MemoryStore {
    pub admins: std::sync::Mutex<Vec<AdminRecord>>,
    pub backups: std::sync::Mutex<Vec<BackupRecord>>,
    pub audit: std::sync::Mutex<Vec<AuditEvent>>,
    pub fail_persist: std::sync::atomic::AtomicBool,
    /// Fail after the admin write but before the backup write.
    pub fail_persist_mid_batch: std::sync::atomic::AtomicBool,
    pub fail_audit: std::sync::atomic::AtomicBool,
}

fn upsert_admin(records: &mut Vec<AdminRecord>, mut admin: AdminRecord) {
    match records.iter_mut().find(|r| r.uid == admin.uid) {
        Some(existing) => {
            // created_at is assigned exactly once, on first commit.
            admin.created_at = existing.created_at;
            *existing = admin;
        }
        None => {
            admin.created_at = Some(Utc::now());
            records.push(admin);
        }
    }
}

fn upsert_backup(records: &mut Vec<BackupRecord>, mut backup: BackupRecord) {
    match records
        .iter_mut()
        .find(|r| r.uid == backup.uid && r.purpose == backup.purpose)
    {
        Some(existing) => {
            backup.created_at = existing.created_at;
            *existing = backup;
        }
        None => {
            backup.created_at = Some(Utc::now());
            records.push(backup);
        }
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn persist_admin(
        &self,
        admin: &AdminRecord,
        backup: &BackupRecord,
    ) -> Result<(), anyhow::Error> {
        if self.fail_persist.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("simulated batch write failure");
        }

        let mut admins = self.admins.lock().unwrap();
        let mut backups = self.backups.lock().unwrap();

        // Stage both writes; nothing commits until the batch completes.
        let mut staged_admins = admins.clone();
        let mut staged_backups = backups.clone();

        upsert_admin(&mut staged_admins, admin.clone());

        if self
            .fail_persist_mid_batch
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            // The staged admin write is discarded, as an aborted
            // transaction would discard it.
            anyhow::bail!("simulated failure between batch writes");
        }

        upsert_backup(&mut staged_backups, backup.clone());

        *admins = staged_admins;
        *backups = staged_backups;
        Ok(())
    }

    async fn append_audit(&self, event: &AuditEvent) -> Result<(), anyhow::Error> {
        if self.fail_audit.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("simulated audit write failure");
        }
        self.audit.lock().unwrap().push(event.clone());
        Ok(())
    }
}
