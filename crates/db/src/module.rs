use std::sync::Arc;

use async_trait::async_trait;

use lms_kernel::{InitCtx, Module, ModuleHealth};

use crate::repository::Database;

/// Core module owning the storage engine handle.
pub struct DbModule<D: Database> {
    db: Arc<D>,
}

impl<D: Database> DbModule<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> Arc<D> {
        self.db.clone()
    }
}

#[async_trait]
impl<D: Database> Module for DbModule<D> {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let stats = self.db.stats().await?;
        tracing::info!(
            libraries = stats.libraries,
            books = stats.books,
            patrons = stats.patrons,
            "storage ready"
        );
        Ok(())
    }

    async fn health(&self) -> ModuleHealth {
        match self.db.stats().await {
            Ok(stats) => ModuleHealth::ok_with(serde_json::json!(stats)),
            Err(err) => ModuleHealth::failing(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDatabase;

    #[tokio::test]
    async fn health_reports_row_counts() {
        let module = DbModule::new(Arc::new(MemoryDatabase::new()));
        let health = module.health().await;
        assert!(health.healthy);
        assert_eq!(health.details["libraries"], 0);
        assert_eq!(health.details["checked_out_books"], 0);
    }
}
