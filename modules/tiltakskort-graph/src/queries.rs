//! Every Cypher statement the service issues.
//!
//! Nested card content is built with pattern comprehensions, so a card with
//! no questions yields `[]` rather than a list holding one all-null entry.
//! The flat framework/measure aggregates use `OPTIONAL MATCH` with
//! `collect(DISTINCT ..)`, which drops the nulls an empty match produces.

use tiltakskort_common::CardState;

use crate::statement::Statement;

pub const CATEGORY_IDS: &str = "category_ids";
pub const CARD_IDS: &str = "card_ids";
pub const CARD_BY_ID: &str = "card_by_id";
pub const UPDATE_STATE: &str = "update_state";
pub const POINTS: &str = "points";
pub const PING: &str = "ping";

/// Columns returned by [`card_by_id`].
pub const CARD_COLUMNS: [&str; 8] = [
    "id",
    "kategori_tekst",
    "kategori_beskrivelse",
    "kategori_kort",
    "state",
    "sporsmal_med_alternativer",
    "direkte_rammeverk",
    "dekkede_tiltak_lokal_id",
];

fn id_list(name: &'static str) -> Statement {
    Statement::new(
        name,
        "MATCH (k:Kategori)
         WHERE k.kategori_id IS NOT NULL
         RETURN k.kategori_id AS id
         ORDER BY id",
    )
    .returns(&["id"])
}

/// All category ids, ascending.
pub fn category_ids() -> Statement {
    id_list(CATEGORY_IDS)
}

/// All card ids, ascending. Cards are categories, so this reads the same
/// nodes as [`category_ids`].
pub fn card_ids() -> Statement {
    id_list(CARD_IDS)
}

/// One card with its full question tree and flat aggregates.
pub fn card_by_id(card_id: i64) -> Statement {
    Statement::new(
        CARD_BY_ID,
        "MATCH (k:Kategori {kategori_id: $cardId})
         OPTIONAL MATCH (k)-[:Inneholder]->(:`Spørsmål`)-[:Inneholder]->(:Alternativ)
                        -[:Dekker]->(t:RammeverksTiltak)
         OPTIONAL MATCH (t)<-[:Inneholder]-(r:Rammeverk)
         WITH k,
              collect(DISTINCT r.Rammeverk) AS direkte_rammeverk,
              collect(DISTINCT t.`Lokal ID`) AS dekkede_tiltak_lokal_id
         RETURN
           k.kategori_id AS id,
           k.kategori AS kategori_tekst,
           k.kategori_beskrivelse AS kategori_beskrivelse,
           k.kategori_kort AS kategori_kort,
           k.state AS state,
           [(k)-[:Inneholder]->(s:`Spørsmål`) | {
             sporsmal_tekst: s.sporsmal,
             alternativer: [(s)-[:Inneholder]->(a:Alternativ) | {
               alternativ_tekst: a.alternativ_tekst,
               alternativ_beskrivelse: a.alternativ_beskrivelse,
               alternativ_hva: a.hva_skal_implementeres,
               alternativ_hvordan: a.hvordan_implementere,
               alternativ_tiltak_info: [(a)-[:Dekker]->(t2:RammeverksTiltak) | {
                 id: t2.`Lokal ID`,
                 tittel: t2.Tiltak,
                 kapittel: t2.Kapittel,
                 standard: t2.Standard,
                 rammeverk: head([(t2)<-[:Inneholder]-(r2:Rammeverk) | r2.Rammeverk])
               }]
             }]
           }] AS sporsmal_med_alternativer,
           direkte_rammeverk,
           dekkede_tiltak_lokal_id
         LIMIT 1",
    )
    .param("cardId", card_id)
    .returns(&CARD_COLUMNS)
}

/// Set a card's state. Yields no rows when the card does not exist.
pub fn update_state(card_id: i64, state: CardState) -> Statement {
    Statement::new(
        UPDATE_STATE,
        "MATCH (k:Kategori {kategori_id: $cardId})
         SET k.state = $state
         RETURN k.kategori_id AS id, k.state AS state",
    )
    .param("cardId", card_id)
    .param("state", state.as_str())
    .returns(&["id", "state"])
}

/// Sum of both point fields over every checked card.
pub fn points() -> Statement {
    Statement::new(
        POINTS,
        "MATCH (k:Kategori)
         WHERE k.state = $checked
         RETURN sum(coalesce(k.poeng, 0) + coalesce(k.ekstra_poeng, 0)) AS points",
    )
    .param("checked", CardState::Checked.as_str())
    .returns(&["points"])
}

/// Connectivity probe.
pub fn ping() -> Statement {
    Statement::new(PING, "RETURN 1 AS ping").returns(&["ping"])
}
