use super::{QueryExecutor, StatementOutput};
use async_trait::async_trait;
use plansweep_error::{Result, SweepError};
use std::sync::Arc;

/// An in-process SQL engine. The engine itself lives outside this crate;
/// callers hand in a handle implementing this trait.
#[async_trait]
pub trait EmbeddedEngine: Send + Sync {
    async fn query(&self, sql: &str) -> anyhow::Result<StatementOutput>;
}

pub struct EmbeddedBackend {
    engine: Arc<dyn EmbeddedEngine>,
}

impl EmbeddedBackend {
    pub fn new(engine: Arc<dyn EmbeddedEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl QueryExecutor for EmbeddedBackend {
    async fn run_statement(&self, sql: &str) -> Result<StatementOutput> {
        self.engine
            .query(sql)
            .await
            .map_err(|e| SweepError::execution(e.to_string()))
    }

    async fn ping(&self) -> Result<()> {
        self.run_statement("SELECT 1").await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "embedded"
    }
}
