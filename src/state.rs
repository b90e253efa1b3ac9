use std::sync::Arc;

use crate::audit::AuditQueue;
use crate::auth::repo::{
    HistoryRepo, PasswordResetRepo, PgHistoryRepo, PgPasswordResetRepo, PgUserRepo, UserRepo,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::friends::repo::{FriendshipRepo, PgFriendshipRepo};
use crate::ledger::repo::{LedgerRepo, PgLedgerRepo};
use crate::mail::{LogMailer, Mailer};
use crate::storage::{MemoryStorage, Storage, StorageClient};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub resets: Arc<dyn PasswordResetRepo>,
    pub history: Arc<dyn HistoryRepo>,
    pub ledger: Arc<dyn LedgerRepo>,
    pub friendships: Arc<dyn FriendshipRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub audit: AuditQueue,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let mailer = Arc::new(LogMailer::new(config.mail_sender.clone())) as Arc<dyn Mailer>;

        if config.uses_memory_store() {
            tracing::warn!("DATABASE_URL is memory:, data will not survive a restart");
            return Ok(Self::in_memory(config, mailer, Arc::new(SystemClock)));
        }

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
        }

        // Real S3/MinIO
        let storage = Arc::new(Storage::new(&config.storage, "us-east-1").await?)
            as Arc<dyn StorageClient>;

        let history = Arc::new(PgHistoryRepo::new(db.clone())) as Arc<dyn HistoryRepo>;
        let audit = AuditQueue::spawn(
            history.clone(),
            config.audit.workers,
            config.audit.queue_capacity,
        );

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            resets: Arc::new(PgPasswordResetRepo::new(db.clone())),
            history,
            ledger: Arc::new(PgLedgerRepo::new(db.clone())),
            friendships: Arc::new(PgFriendshipRepo::new(db)),
            storage,
            mailer,
            clock: Arc::new(SystemClock),
            audit,
            config,
        })
    }

    /// State backed entirely by process memory. Must be called inside a Tokio
    /// runtime because the audit workers are spawned here.
    pub fn in_memory(
        config: Arc<AppConfig>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(MemoryStore::default());
        let audit = AuditQueue::spawn(
            store.clone(),
            config.audit.workers,
            config.audit.queue_capacity,
        );
        Self {
            users: store.clone(),
            resets: store.clone(),
            history: store.clone(),
            ledger: store.clone(),
            friendships: store,
            storage: Arc::new(MemoryStorage::default()),
            mailer,
            clock,
            audit,
            config,
        }
    }
}
