use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One result row, keyed by the column names of the RETURN clause.
///
/// Values are plain JSON. Identifier columns are normalized to integers by
/// [`Record::normalized`] before a record is handed out or cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: Value) {
        self.0.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column).filter(|v| !v.is_null())
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(as_integer)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Deserialize one column. `null` and missing both yield `T::default()`.
    pub fn decode<T>(&self, column: &str) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(column) {
            Some(value) => T::deserialize(value),
            None => Ok(T::default()),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert whole-number floats under identifier keys (`id`, `*_id`) to
    /// integers, recursing into nested maps and lists.
    pub fn normalized(mut self) -> Self {
        for (key, value) in self.0.iter_mut() {
            normalize_value(key, value);
        }
        self
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_identifier_key(key: &str) -> bool {
    key == "id" || key.ends_with("_id")
}

fn normalize_value(key: &str, value: &mut Value) {
    let whole = match value {
        Value::Number(n) if is_identifier_key(key) => whole_float(n),
        _ => None,
    };
    if let Some(i) = whole {
        *value = Value::Number(Number::from(i));
        return;
    }

    match value {
        // A list under an id key holds ids itself.
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize_value(key, item);
            }
        }
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                normalize_value(k, v);
            }
        }
        _ => {}
    }
}

fn whole_float(n: &Number) -> Option<i64> {
    if n.is_i64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}
