use std::fmt;

/// A Cypher parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Str(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Str(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Str(v)
    }
}

/// A parameterized Cypher statement plus the columns its RETURN clause yields.
///
/// `name` identifies the statement in logs and in test doubles.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: &'static str,
    pub cypher: String,
    pub params: Vec<(&'static str, Param)>,
    pub columns: Vec<&'static str>,
}

impl Statement {
    pub fn new(name: &'static str, cypher: impl Into<String>) -> Self {
        Self {
            name,
            cypher: cypher.into(),
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<Param>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn returns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn int_param(&self, key: &str) -> Option<i64> {
        self.params.iter().find_map(|(k, v)| match v {
            Param::Int(i) if *k == key => Some(*i),
            _ => None,
        })
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.iter().find_map(|(k, v)| match v {
            Param::Str(s) if *k == key => Some(s.as_str()),
            _ => None,
        })
    }

    /// First 100 characters of the statement, whitespace collapsed.
    pub fn preview(&self) -> String {
        let collapsed = self.cypher.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().take(100).collect()
    }

    /// Convert into a driver query.
    pub fn to_query(&self) -> neo4rs::Query {
        self.params
            .iter()
            .fold(neo4rs::query(&self.cypher), |q, (key, value)| match value {
                Param::Int(i) => q.param(key, *i),
                Param::Str(s) => q.param(key, s.clone()),
            })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (len={}): {}", self.name, self.cypher.len(), self.preview())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_looked_up_by_key_and_type() {
        let stmt = Statement::new("t", "RETURN 1")
            .param("cardId", 7_i64)
            .param("state", "avhuket");
        assert_eq!(stmt.int_param("cardId"), Some(7));
        assert_eq!(stmt.str_param("state"), Some("avhuket"));
        assert_eq!(stmt.int_param("state"), None);
        assert_eq!(stmt.str_param("missing"), None);
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        let long = format!("MATCH (k:Kategori)\n     RETURN k {}", "x".repeat(200));
        let stmt = Statement::new("t", long);
        let preview = stmt.preview();
        assert!(preview.starts_with("MATCH (k:Kategori) RETURN k"));
        assert_eq!(preview.chars().count(), 100);
    }
}
