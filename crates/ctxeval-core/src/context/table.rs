//! Tabular context: CSV text or column-oriented mappings.

use serde_json::{Map, Value as JsonValue};

use super::NormalizeError;
use crate::types::ContextType;

const HEADER_LINE: &str = "This data contains the following information:";
const DETAILS_LINE: &str = "\nHere are the details:";

/// Rendered in place of empty or missing CSV fields.
pub const MISSING_CELL: &str = "nan";

/// Column names plus rows of rendered cells, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from column names and rows.
    ///
    /// Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, NormalizeError> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(NormalizeError::CsvParse(format!(
                    "expected {} fields, saw {}",
                    columns.len(),
                    row.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parse CSV text whose first record is the header row.
    ///
    /// Short records are padded and empty fields rendered as [`MISSING_CELL`].
    /// Records wider than the header are rejected.
    pub fn from_csv(raw: &str) -> Result<Self, NormalizeError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| NormalizeError::CsvParse(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if columns.is_empty() {
            return Err(NormalizeError::CsvParse(
                "no columns to parse from input".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| NormalizeError::CsvParse(e.to_string()))?;
            if record.len() > columns.len() {
                let line = record.position().map_or(0, |p| p.line());
                return Err(NormalizeError::CsvParse(format!(
                    "expected {} fields in line {}, saw {}",
                    columns.len(),
                    line,
                    record.len()
                )));
            }

            let mut row: Vec<String> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        MISSING_CELL.to_string()
                    } else {
                        field.to_string()
                    }
                })
                .collect();
            row.resize(columns.len(), MISSING_CELL.to_string());
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Build a table from a mapping of column name to column values.
    ///
    /// Column order follows the mapping's insertion order. All columns must
    /// have the same length.
    pub fn from_columns(columns: &Map<String, JsonValue>) -> Result<Self, NormalizeError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut cells: Vec<&Vec<JsonValue>> = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            let values = values
                .as_array()
                .ok_or_else(|| NormalizeError::InvalidContextShape {
                    context_type: ContextType::DataFrame,
                    expected: "an object mapping column names to arrays",
                })?;

            if let Some(first) = cells.first() {
                if values.len() != first.len() {
                    return Err(NormalizeError::ShapeMismatch {
                        column: name.clone(),
                        expected: first.len(),
                        actual: values.len(),
                    });
                }
            }

            names.push(name.clone());
            cells.push(values);
        }

        let row_count = cells.first().map_or(0, |c| c.len());
        let rows = (0..row_count)
            .map(|i| cells.iter().map(|column| render_cell(&column[i])).collect())
            .collect();

        Ok(Self {
            columns: names,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Linearize the table into prompt text.
    ///
    /// Lossy and human-readable; delimiters inside values are not escaped.
    pub fn format(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        lines.push(HEADER_LINE.to_string());
        lines.push(self.columns.join(", "));
        lines.push(DETAILS_LINE.to_string());

        for row in &self.rows {
            let pairs: Vec<String> = self
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| format!("{}: {}", column, value))
                .collect();
            lines.push(pairs.join(" | "));
        }

        lines.join("\n")
    }
}

/// Strings render verbatim, everything else as compact JSON.
fn render_cell(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_format_layout() {
        let table = Table::new(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec!["Ann".to_string(), "31".to_string()],
                vec!["Bob".to_string(), "27".to_string()],
            ],
        )
        .unwrap();

        assert_eq!(
            table.format(),
            "This data contains the following information:\n\
             name, age\n\
             \n\
             Here are the details:\n\
             name: Ann | age: 31\n\
             name: Bob | age: 27"
        );
    }

    #[test]
    fn test_format_without_rows() {
        let table = Table::new(vec!["a".to_string()], vec![]).unwrap();
        assert_eq!(
            table.format(),
            "This data contains the following information:\na\n\nHere are the details:"
        );
    }

    #[test]
    fn test_from_csv() {
        let table = Table::from_csv("product,price\nWidget,9.99\nGadget,19.50").unwrap();
        assert_eq!(table.columns(), &["product", "price"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1], vec!["Gadget", "19.50"]);
    }

    #[test]
    fn test_from_csv_quoted_values_keep_commas() {
        let table = Table::from_csv("name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"").unwrap();
        assert_eq!(table.rows()[0], vec!["Doe, Jane", "said \"hi\""]);
        assert!(table.format().contains("name: Doe, Jane | note: said \"hi\""));
    }

    #[test]
    fn test_from_csv_ragged_record_fails() {
        let result = Table::from_csv("a,b\n1,2,3");
        assert!(matches!(result, Err(NormalizeError::CsvParse(_))));
    }

    #[test]
    fn test_from_csv_short_record_is_padded() {
        let table = Table::from_csv("a,b,c\n1\n4,5,6").unwrap();
        assert_eq!(table.rows()[0], vec!["1", "nan", "nan"]);
        assert_eq!(table.rows()[1], vec!["4", "5", "6"]);
        assert!(table.format().contains("a: 1 | b: nan | c: nan"));
    }

    #[test]
    fn test_from_csv_empty_field_renders_missing() {
        let table = Table::from_csv("a,b\n1,\n,2").unwrap();
        assert_eq!(table.rows()[0], vec!["1", "nan"]);
        assert_eq!(table.rows()[1], vec!["nan", "2"]);
    }

    #[test]
    fn test_from_csv_empty_input_fails() {
        let result = Table::from_csv("");
        assert!(matches!(result, Err(NormalizeError::CsvParse(_))));
    }

    #[test]
    fn test_from_columns_preserves_order() {
        let columns = json!({
            "zeta": ["z1", "z2"],
            "alpha": [1, 2.5]
        });
        let table = Table::from_columns(columns.as_object().unwrap()).unwrap();

        assert_eq!(table.columns(), &["zeta", "alpha"]);
        assert_eq!(table.rows()[0], vec!["z1", "1"]);
        assert_eq!(table.rows()[1], vec!["z2", "2.5"]);
    }

    #[test]
    fn test_from_columns_renders_non_strings_as_json() {
        let columns = json!({"flag": [true, null]});
        let table = Table::from_columns(columns.as_object().unwrap()).unwrap();
        assert_eq!(table.rows()[0], vec!["true"]);
        assert_eq!(table.rows()[1], vec!["null"]);
    }

    #[test]
    fn test_from_columns_length_mismatch() {
        let columns = json!({"a": [1, 2, 3], "b": [1]});
        let result = Table::from_columns(columns.as_object().unwrap());

        match result {
            Err(NormalizeError::ShapeMismatch {
                column,
                expected,
                actual,
            }) => {
                assert_eq!(column, "b");
                assert_eq!(expected, 3);
                assert_eq!(actual, 1);
            }
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_from_columns_scalar_column_rejected() {
        let columns = json!({"a": 1});
        let result = Table::from_columns(columns.as_object().unwrap());
        assert!(matches!(
            result,
            Err(NormalizeError::InvalidContextShape { .. })
        ));
    }

    fn csv_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
        prop::collection::btree_set("[a-z]{1,8}", 1..5)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|columns| {
                let width = columns.len();
                let rows = prop::collection::vec(
                    prop::collection::vec("[A-Za-z0-9]{1,8}", width),
                    0..6,
                );
                (Just(columns), rows)
            })
    }

    proptest! {
        #[test]
        fn prop_csv_format_contains_all_pairs_in_order((columns, rows) in csv_table()) {
            let mut raw = columns.join(",");
            for row in &rows {
                raw.push('\n');
                raw.push_str(&row.join(","));
            }

            let formatted = Table::from_csv(&raw).unwrap().format();
            let lines: Vec<&str> = formatted.lines().collect();

            for column in &columns {
                prop_assert!(lines[1].contains(column.as_str()));
            }
            prop_assert_eq!(lines.len(), 4 + rows.len());

            for (row, line) in rows.iter().zip(&lines[4..]) {
                let expected: Vec<String> = columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| format!("{}: {}", c, v))
                    .collect();
                prop_assert_eq!(*line, expected.join(" | "));
            }
        }
    }
}
