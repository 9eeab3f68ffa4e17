use std::sync::Arc;

use tracing::{info, warn};

use tiltakskort_common::{Card, CardState, InvalidState, LocalId, Question, StateUpdate};

use crate::cache::{CacheKey, QueryCache};
use crate::error::GraphError;
use crate::executor::{QueryExecutor, QueryRunner};
use crate::queries;
use crate::record::Record;

/// Card and category data access. Owns the query cache for its lifetime.
#[derive(Clone)]
pub struct CardRepository {
    executor: QueryExecutor,
}

impl CardRepository {
    pub fn new(runner: Arc<dyn QueryRunner>, cache: Arc<QueryCache>) -> Self {
        Self {
            executor: QueryExecutor::new(runner, cache),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        self.executor.cache()
    }

    /// All category ids, ascending. Cached under `categoryIds`.
    pub async fn get_all_category_ids(&self) -> Result<Vec<i64>, GraphError> {
        let records = self
            .executor
            .execute(&queries::category_ids(), Some(CacheKey::CategoryIds))
            .await?;
        let ids = ids_from_records(&records);
        info!(count = ids.len(), "Category ids fetched");
        Ok(ids)
    }

    /// All card ids, ascending. Cached under `cards`.
    pub async fn get_all_cards(&self) -> Result<Vec<i64>, GraphError> {
        let records = self
            .executor
            .execute(&queries::card_ids(), Some(CacheKey::Cards))
            .await?;
        Ok(ids_from_records(&records))
    }

    /// One card with its question tree, or `None` when no such card exists.
    /// Cached under `card_<id>`.
    pub async fn get_card_by_id(&self, card_id: i64) -> Result<Option<Card>, GraphError> {
        validate_id(card_id)?;

        let records = self
            .executor
            .execute(&queries::card_by_id(card_id), Some(CacheKey::Card(card_id)))
            .await?;

        let Some(record) = records.first() else {
            info!(card_id, "No card found");
            return Ok(None);
        };

        let card = card_from_record(record)?;
        if card.is_none() {
            warn!(card_id, "Card row had no id, treating as missing");
        }
        Ok(card)
    }

    /// Set a card's completion state and drop its cache entry.
    ///
    /// `new_state` is validated before the database is touched. A card that
    /// does not exist yields [`GraphError::NotFound`].
    pub async fn update_state(
        &self,
        card_id: i64,
        new_state: &str,
    ) -> Result<StateUpdate, GraphError> {
        let state: CardState = new_state
            .parse()
            .map_err(|e: InvalidState| GraphError::Validation(e.to_string()))?;
        validate_id(card_id)?;

        let key = CacheKey::Card(card_id);
        if self.cache().invalidate(&key) {
            info!(key = %key, "Cache invalidated");
        }

        let records = self
            .executor
            .execute(&queries::update_state(card_id, state), None)
            .await?;

        let Some(record) = records.first() else {
            return Err(GraphError::NotFound(card_id));
        };

        // A fetch that ran during the write may have cached the old row.
        self.cache().invalidate(&key);

        let update = StateUpdate {
            id: record.get_i64("id").unwrap_or(card_id),
            state: record
                .get_str("state")
                .and_then(|s| s.parse().ok())
                .unwrap_or(state),
        };
        info!(card_id, state = %update.state, "Card state updated");
        Ok(update)
    }

    /// Points over every checked card. Never cached.
    pub async fn calculate_points(&self) -> Result<i64, GraphError> {
        let records = self.executor.execute(&queries::points(), None).await?;
        let points = records
            .first()
            .and_then(|r| {
                r.get_i64("points")
                    .or_else(|| r.get("points")?.as_f64().map(|f| f.round() as i64))
            })
            .unwrap_or(0);
        Ok(points)
    }

    /// Reset the id-list caches. Individual card entries are kept.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Reset every cache entry, including individual cards.
    pub fn clear_all_caches(&self) {
        self.cache().clear_all();
    }
}

fn validate_id(card_id: i64) -> Result<(), GraphError> {
    if card_id <= 0 {
        return Err(GraphError::Validation(format!(
            "card id must be a positive integer, got {card_id}"
        )));
    }
    Ok(())
}

fn ids_from_records(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(|r| r.get_i64("id")).collect()
}

fn decode<T>(record: &Record, column: &str) -> Result<T, GraphError>
where
    T: serde::de::DeserializeOwned + Default,
{
    record.decode(column).map_err(|e| GraphError::Decode {
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Flatten one raw card row into a [`Card`]. `None` when the row has no id.
pub fn card_from_record(record: &Record) -> Result<Option<Card>, GraphError> {
    let Some(id) = record.get_i64("id") else {
        return Ok(None);
    };

    let state = match record.get_str("state") {
        None => CardState::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(card_id = id, state = raw, "Unknown card state, treating as unchecked");
            CardState::default()
        }),
    };

    let sporsmal: Vec<Question> = decode::<Vec<Question>>(record, "sporsmal_med_alternativer")?
        .into_iter()
        .filter(|q| q.sporsmal_tekst.is_some() || !q.alternativer.is_empty())
        .collect();

    Ok(Some(Card {
        id,
        kategori_tekst: record.get_str("kategori_tekst").map(str::to_string),
        kategori_beskrivelse: record.get_str("kategori_beskrivelse").map(str::to_string),
        kategori_kort: record.get_str("kategori_kort").map(str::to_string),
        state,
        sporsmal,
        rammeverk: decode::<Vec<String>>(record, "direkte_rammeverk")?,
        lokal_ids: decode::<Vec<LocalId>>(record, "dekkede_tiltak_lokal_id")?,
    }))
}
