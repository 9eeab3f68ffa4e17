// Test doubles for the data-access layer.
//
// MockRunner stands in for a Neo4j session: canned records per statement
// name, optional failures, and a call log so tests can assert on round trips.
// No network, no database, no Docker.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::GraphError;
use crate::executor::QueryRunner;
use crate::record::Record;
use crate::statement::Statement;

/// Name-keyed fake runner. Returns `Err` for statements with no registered
/// response. Builder pattern: `.on()`, `.fail_on()`.
#[derive(Default)]
pub struct MockRunner {
    responses: Mutex<HashMap<String, Vec<Record>>>,
    failures: Mutex<HashMap<String, String>>,
    log: Mutex<Vec<Statement>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, name: &str, records: Vec<Record>) -> Self {
        self.respond(name, records);
        self
    }

    pub fn fail_on(self, name: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), message.to_string());
        self
    }

    /// Replace the canned response for `name` after construction.
    pub fn respond(&self, name: &str, records: Vec<Record>) {
        self.responses
            .lock()
            .unwrap()
            .insert(name.to_string(), records);
    }

    /// Number of times a statement with this name reached the "database".
    pub fn calls(&self, name: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name == name)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryRunner for MockRunner {
    async fn run(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        self.log.lock().unwrap().push(statement.clone());

        if let Some(message) = self.failures.lock().unwrap().get(statement.name) {
            return Err(GraphError::Connection(message.clone()));
        }

        self.responses
            .lock()
            .unwrap()
            .get(statement.name)
            .cloned()
            .ok_or_else(|| {
                GraphError::Connection(format!("no mock response for {}", statement.name))
            })
    }
}

// ---------------------------------------------------------------------------
// Record fixtures
// ---------------------------------------------------------------------------

/// One row of `id` column results, one per id.
pub fn id_rows(ids: &[i64]) -> Vec<Record> {
    ids.iter().map(|id| Record::new().with("id", json!(id))).collect()
}

/// A raw card row as the card query returns it.
pub fn card_row(id: i64, state: &str, questions: Value) -> Record {
    Record::new()
        .with("id", json!(id))
        .with("kategori_tekst", json!(format!("Kategori {id}")))
        .with("kategori_beskrivelse", json!("Beskrivelse"))
        .with("kategori_kort", json!("Kort"))
        .with("state", json!(state))
        .with("sporsmal_med_alternativer", questions)
        .with("direkte_rammeverk", json!([]))
        .with("dekkede_tiltak_lokal_id", json!([]))
}

/// A question with one alternative per given text and no measures.
pub fn question(text: &str, alternatives: &[&str]) -> Value {
    let alts: Vec<Value> = alternatives
        .iter()
        .map(|a| {
            json!({
                "alternativ_tekst": a,
                "alternativ_beskrivelse": null,
                "alternativ_hva": null,
                "alternativ_hvordan": null,
                "alternativ_tiltak_info": []
            })
        })
        .collect();
    json!({ "sporsmal_tekst": text, "alternativer": alts })
}
