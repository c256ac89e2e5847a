use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use std::fmt;

/// Parameters of one forecast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub date: String,
    pub postal_code: String,
    /// Ask the service for data starting at `date` instead of today.
    pub history: bool,
}

/// Severity codes of all plants for a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRow {
    pub date: String,
    /// Positionally aligned with [`ForecastTable::pollen`].
    pub levels: Vec<String>,
}

/// The `content` payload of a forecast response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ForecastTable {
    pub pollen: Vec<String>,
    /// Rows in the order the service lists them.
    #[serde(deserialize_with = "rows_in_source_order")]
    pub values: Vec<ForecastRow>,
}

/// A severity code as sent by the service, either `"2"` or `2`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Text(String),
    Number(serde_json::Number),
}

impl RawLevel {
    fn into_text(self) -> String {
        match self {
            RawLevel::Text(s) => s,
            RawLevel::Number(n) => n.to_string(),
        }
    }
}

fn rows_in_source_order<'de, D>(deserializer: D) -> Result<Vec<ForecastRow>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RowsVisitor;

    impl<'de> Visitor<'de> for RowsVisitor {
        type Value = Vec<ForecastRow>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of dates to severity codes")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut rows = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((date, levels)) = map.next_entry::<String, Vec<RawLevel>>()? {
                rows.push(ForecastRow {
                    date,
                    levels: levels.into_iter().map(RawLevel::into_text).collect(),
                });
            }
            Ok(rows)
        }
    }

    deserializer.deserialize_map(RowsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_source_order() {
        let json = r#"{
            "pollen": ["Birke", "Gräser"],
            "values": {
                "2021-05-03": ["1", "2"],
                "2021-05-01": ["0", "3"],
                "2021-05-02": ["2", "2"]
            }
        }"#;

        let table: ForecastTable = serde_json::from_str(json).unwrap();
        let dates: Vec<_> = table.values.iter().map(|r| r.date.as_str()).collect();

        assert_eq!(table.pollen, vec!["Birke", "Gräser"]);
        assert_eq!(dates, vec!["2021-05-03", "2021-05-01", "2021-05-02"]);
        assert_eq!(table.values[1].levels, vec!["0", "3"]);
    }

    #[test]
    fn numeric_levels_are_read_as_text() {
        let json = r#"{"pollen": ["Birke"], "values": {"2021-05-01": [3, "1"]}}"#;

        let table: ForecastTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.values[0].levels, vec!["3", "1"]);
    }

    #[test]
    fn values_must_be_an_object() {
        let json = r#"{"pollen": [], "values": [["0"]]}"#;
        assert!(serde_json::from_str::<ForecastTable>(json).is_err());
    }
}
