use async_trait::async_trait;
use chatctl_entities::sessions;
use chatctl_scheduler::SessionProvider;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr, Schema,
    TransactionTrait,
};
use tracing::{debug, info};

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Create the tables maintenance jobs operate on, if missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let stmt = schema.create_table_from_entity(sessions::Entity);
    match db
        .execute_unprepared(&backend.build(&stmt).to_string())
        .await
    {
        Ok(_) => info!("Created sessions table"),
        Err(e) if is_table_already_exists_error(&e) => {
            debug!("Table already exists, skipping creation");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Hands out one database transaction per scheduled run.
///
/// The transaction is committed when the job succeeds and rolled back when
/// it fails; it is never reused.
#[derive(Debug, Clone)]
pub struct DatabaseSessionProvider {
    db: DatabaseConnection,
}

impl DatabaseSessionProvider {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database for maintenance");
        let db = Database::connect(database_url).await?;
        Ok(Self { db })
    }

    #[must_use]
    pub const fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl SessionProvider for DatabaseSessionProvider {
    type Session = DatabaseTransaction;

    async fn acquire(&self) -> anyhow::Result<DatabaseTransaction> {
        Ok(self.db.begin().await?)
    }

    async fn release(&self, session: DatabaseTransaction, succeeded: bool) -> anyhow::Result<()> {
        if succeeded {
            session.commit().await?;
        } else {
            debug!("Rolling back maintenance transaction");
            session.rollback().await?;
        }
        Ok(())
    }
}
