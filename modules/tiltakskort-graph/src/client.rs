use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph};
use serde_json::Value;
use tracing::info;

use crate::error::GraphError;
use crate::executor::QueryRunner;
use crate::queries;
use crate::record::Record;
use crate::statement::Statement;

/// Thin wrapper around neo4rs::Graph providing connection setup.
///
/// The graph is a connection pool; every [`QueryRunner::run`] call borrows a
/// connection for the lifetime of its row stream and returns it when the
/// stream drops.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to the default `neo4j` database.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, GraphError> {
        Self::connect_to(uri, user, password, "neo4j").await
    }

    /// Connect to a named database.
    pub async fn connect_to(
        uri: &str,
        user: &str,
        password: &str,
        database: &str,
    ) -> Result<Self, GraphError> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .db(database)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    /// Run `RETURN 1` to prove the server answers.
    pub async fn verify_connectivity(&self) -> Result<(), GraphError> {
        let rows = self.run(&queries::ping()).await?;
        match rows.first().and_then(|r| r.get_i64("ping")) {
            Some(1) => {
                info!("Neo4j test query executed successfully");
                Ok(())
            }
            _ => Err(GraphError::Decode {
                column: "ping".to_string(),
                message: "connectivity probe returned no row".to_string(),
            }),
        }
    }
}

#[async_trait]
impl QueryRunner for GraphClient {
    async fn run(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        let mut stream = self.graph.execute(statement.to_query()).await?;

        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            let mut record = Record::new();
            for column in &statement.columns {
                let value: Value = row.get(column).map_err(|e| GraphError::Decode {
                    column: column.to_string(),
                    message: e.to_string(),
                })?;
                record.insert(column, value);
            }
            records.push(record);
        }
        Ok(records)
    }
}
