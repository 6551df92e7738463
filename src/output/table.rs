//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// A two-column row for key/value listings
#[derive(Debug, Tabled)]
pub struct KeyValueRow {
    #[tabled(rename = "KEY")]
    pub key: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format `(key, value)` pairs as a two-column table
pub fn format_pairs<K: ToString, V: ToString>(pairs: impl IntoIterator<Item = (K, V)>) -> String {
    let rows: Vec<KeyValueRow> = pairs
        .into_iter()
        .map(|(k, v)| KeyValueRow {
            key: k.to_string(),
            value: v.to_string(),
        })
        .collect();
    format_table(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "LANE")]
        lane: String,
        #[tabled(rename = "SPEED")]
        speed: f64,
    }

    #[test]
    fn test_format_table_empty() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
    }

    #[test]
    fn test_format_table_rows() {
        let items = vec![
            TestRow {
                lane: "lane_1".to_string(),
                speed: 85.2,
            },
            TestRow {
                lane: "lane_2".to_string(),
                speed: 62.8,
            },
        ];

        let result = format_table(&items);

        assert!(result.contains("LANE"));
        assert!(result.contains("SPEED"));
        assert!(result.contains("lane_2"));
        assert!(result.contains("62.8"));
    }

    #[test]
    fn test_format_pairs() {
        let result = format_pairs([("car", 25), ("bus", 5)]);

        assert!(result.contains("KEY"));
        assert!(result.contains("car"));
        assert!(result.contains("25"));
    }
}
