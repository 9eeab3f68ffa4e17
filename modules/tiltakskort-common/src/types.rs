use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// --- State ---

/// Completion flag on a card. Drives points aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CardState {
    #[serde(rename = "avhuket")]
    Checked,
    #[default]
    #[serde(rename = "ikke_avhuket")]
    Unchecked,
}

impl CardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::Checked => "avhuket",
            CardState::Unchecked => "ikke_avhuket",
        }
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is neither `avhuket` nor `ikke_avhuket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidState(pub String);

impl fmt::Display for InvalidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid state '{}', expected 'avhuket' or 'ikke_avhuket'",
            self.0
        )
    }
}

impl std::error::Error for InvalidState {}

impl FromStr for CardState {
    type Err = InvalidState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avhuket" => Ok(CardState::Checked),
            "ikke_avhuket" => Ok(CardState::Unchecked),
            other => Err(InvalidState(other.to_string())),
        }
    }
}

// --- Card tree ---

/// Local id of a framework measure. Stored as either a number or a dotted
/// string ("5.1.2") depending on the framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalId {
    Int(i64),
    Text(String),
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalId::Int(n) => write!(f, "{n}"),
            LocalId::Text(s) => f.write_str(s),
        }
    }
}

/// A framework measure covered by an alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureInfo {
    #[serde(default)]
    pub id: Option<LocalId>,
    #[serde(default)]
    pub tittel: Option<String>,
    #[serde(default)]
    pub kapittel: Option<String>,
    #[serde(default)]
    pub standard: Option<String>,
    /// Name of the framework the measure belongs to.
    #[serde(default)]
    pub rammeverk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub alternativ_tekst: Option<String>,
    #[serde(default)]
    pub alternativ_beskrivelse: Option<String>,
    /// What should be implemented.
    #[serde(default)]
    pub alternativ_hva: Option<String>,
    /// How to implement it.
    #[serde(default)]
    pub alternativ_hvordan: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub alternativ_tiltak_info: Vec<MeasureInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub sporsmal_tekst: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub alternativer: Vec<Alternative>,
}

/// A category with its full question tree, flattened for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub kategori_tekst: Option<String>,
    pub kategori_beskrivelse: Option<String>,
    pub kategori_kort: Option<String>,
    #[serde(default)]
    pub state: CardState,
    #[serde(default, deserialize_with = "nullable_list")]
    pub sporsmal: Vec<Question>,
    /// Frameworks reachable from any alternative on the card.
    #[serde(default, deserialize_with = "nullable_list")]
    pub rammeverk: Vec<String>,
    /// Local ids of every measure the card's alternatives cover.
    #[serde(default, deserialize_with = "nullable_list")]
    pub lokal_ids: Vec<LocalId>,
}

/// Result of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub id: i64,
    pub state: CardState,
}

/// Treat an explicit `null` the same as a missing list.
pub fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_parses_wire_values() {
        assert_eq!("avhuket".parse::<CardState>(), Ok(CardState::Checked));
        assert_eq!("ikke_avhuket".parse::<CardState>(), Ok(CardState::Unchecked));
    }

    #[test]
    fn state_rejects_anything_else() {
        let err = "checked".parse::<CardState>().unwrap_err();
        assert_eq!(err, InvalidState("checked".to_string()));
        assert!("".parse::<CardState>().is_err());
        assert!("AVHUKET".parse::<CardState>().is_err());
    }

    #[test]
    fn state_serializes_as_wire_value() {
        assert_eq!(serde_json::to_value(CardState::Checked).unwrap(), json!("avhuket"));
        assert_eq!(
            serde_json::to_value(StateUpdate { id: 3, state: CardState::Unchecked }).unwrap(),
            json!({"id": 3, "state": "ikke_avhuket"})
        );
    }

    #[test]
    fn null_lists_become_empty() {
        let alt: Alternative = serde_json::from_value(json!({
            "alternativ_tekst": "Ja",
            "alternativ_tiltak_info": null
        }))
        .unwrap();
        assert!(alt.alternativ_tiltak_info.is_empty());
        assert_eq!(alt.alternativ_hva, None);
    }

    #[test]
    fn local_id_accepts_numbers_and_strings() {
        let ids: Vec<LocalId> = serde_json::from_value(json!([4, "5.1.2"])).unwrap();
        assert_eq!(ids, vec![LocalId::Int(4), LocalId::Text("5.1.2".into())]);
        assert_eq!(ids[1].to_string(), "5.1.2");
    }
}
