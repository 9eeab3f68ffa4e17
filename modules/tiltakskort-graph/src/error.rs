use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Neo4j(#[from] neo4rs::Error),

    #[error("No database session available: {0}")]
    Connection(String),

    #[error("Failed to decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("Card {0} not found")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GraphError::Validation(_))
    }
}
