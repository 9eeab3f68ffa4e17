use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::cache::{CacheKey, QueryCache};
use crate::error::GraphError;
use crate::record::Record;
use crate::statement::Statement;

/// Runs one statement on a fresh database session and returns every row.
///
/// Implementations must release the session before returning, on success and
/// on error alike.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, statement: &Statement) -> Result<Vec<Record>, GraphError>;
}

/// Cache-aside query execution.
///
/// With a cache key, a hit is served from [`QueryCache`] without touching the
/// database; a miss runs the statement and stores the normalized records.
/// Without a key the statement always runs and nothing is stored.
#[derive(Clone)]
pub struct QueryExecutor {
    runner: Arc<dyn QueryRunner>,
    cache: Arc<QueryCache>,
}

impl QueryExecutor {
    pub fn new(runner: Arc<dyn QueryRunner>, cache: Arc<QueryCache>) -> Self {
        Self { runner, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn execute(
        &self,
        statement: &Statement,
        cache_key: Option<CacheKey>,
    ) -> Result<Vec<Record>, GraphError> {
        if let Some(key) = cache_key {
            if let Some(records) = self.cache.get(&key) {
                debug!(key = %key, "Cache hit");
                return Ok(records);
            }
        }

        debug!(statement = %statement, "Executing Cypher");
        let records: Vec<Record> = match self.runner.run(statement).await {
            Ok(rows) => rows.into_iter().map(Record::normalized).collect(),
            Err(e) => {
                error!(
                    name = statement.name,
                    params = ?statement.params,
                    error = %e,
                    "Cypher query failed"
                );
                return Err(e);
            }
        };

        if let Some(key) = cache_key {
            debug!(key = %key, rows = records.len(), "Cache set");
            self.cache.insert(key, records.clone());
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRunner;
    use serde_json::json;

    fn statement() -> Statement {
        Statement::new("ids", "MATCH (k:Kategori) RETURN k.kategori_id AS id").returns(&["id"])
    }

    fn setup(runner: MockRunner) -> (Arc<MockRunner>, QueryExecutor) {
        let runner = Arc::new(runner);
        let executor = QueryExecutor::new(runner.clone(), Arc::new(QueryCache::new()));
        (runner, executor)
    }

    #[tokio::test]
    async fn cached_key_skips_second_round_trip() {
        let (runner, executor) =
            setup(MockRunner::new().on("ids", vec![Record::new().with("id", json!(1))]));

        let first = executor.execute(&statement(), Some(CacheKey::Cards)).await.unwrap();
        let second = executor.execute(&statement(), Some(CacheKey::Cards)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(runner.calls("ids"), 1);
    }

    #[tokio::test]
    async fn no_key_always_runs_and_stores_nothing() {
        let (runner, executor) =
            setup(MockRunner::new().on("ids", vec![Record::new().with("id", json!(1))]));

        executor.execute(&statement(), None).await.unwrap();
        executor.execute(&statement(), None).await.unwrap();

        assert_eq!(runner.calls("ids"), 2);
        assert!(executor.cache().is_empty());
    }

    #[tokio::test]
    async fn records_are_normalized_before_caching() {
        let (_, executor) =
            setup(MockRunner::new().on("ids", vec![Record::new().with("id", json!(3.0))]));

        let records = executor.execute(&statement(), Some(CacheKey::Cards)).await.unwrap();
        assert_eq!(records[0].get("id"), Some(&json!(3)));

        let cached = executor.cache().get(&CacheKey::Cards).unwrap();
        assert_eq!(cached[0].get("id"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn errors_propagate_unchanged_and_are_not_cached() {
        let (runner, executor) = setup(MockRunner::new().fail_on("ids", "connection reset"));

        let err = executor
            .execute(&statement(), Some(CacheKey::Cards))
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::Connection(ref m) if m == "connection reset"));
        assert!(!executor.cache().contains(&CacheKey::Cards));
        assert_eq!(runner.calls("ids"), 1);
    }

    #[tokio::test]
    async fn empty_result_is_cached_too() {
        let (runner, executor) = setup(MockRunner::new().on("ids", vec![]));

        executor.execute(&statement(), Some(CacheKey::Cards)).await.unwrap();
        executor.execute(&statement(), Some(CacheKey::Cards)).await.unwrap();

        assert_eq!(runner.calls("ids"), 1);
    }
}
