pub mod cache;
pub mod client;
pub mod error;
pub mod executor;
pub mod queries;
pub mod record;
pub mod repository;
pub mod statement;
pub mod testing;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use cache::{CacheKey, QueryCache};
pub use client::GraphClient;
pub use error::GraphError;
pub use executor::{QueryExecutor, QueryRunner};
pub use neo4rs::query;
pub use record::Record;
pub use repository::CardRepository;
pub use statement::{Param, Statement};
