//! Typed emissions records and the dataset they are queried from.
//!
//! Rows arrive as string maps from whatever loaded the source file. Ingestion never fails
//! on a bad cell: rows without an entity or an integer-like year are skipped, numeric
//! fields that do not parse are kept as unusable (`None`), and every skip is recorded in
//! the returned [`IngestReport`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartError, DataIssue, IngestReport};

pub const ENTITY: &str = "Entity";
pub const YEAR: &str = "Year";

/// Per-capita CO₂ emissions, tonnes per person.
pub const PER_CAPITA_FIELD: &str = "Annual_CO2_emissions_(per_capita)";
/// Annual CO₂ emissions from fossil fuels and industry.
pub const FOSSIL_FIELD: &str = "Annual_CO₂_emissions";
/// Annual CO₂ emissions from land-use change.
pub const LAND_USE_FIELD: &str = "Annual_CO₂_emissions_from_land-use_change";

/// One raw row: column name → cell text.
pub type Row = IndexMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub entity: String,
    pub year: i32,
    /// Requested numeric fields; `None` when the cell was missing or non-numeric.
    pub values: IndexMap<String, Option<f64>>,
}

impl Record {
    /// Usable value of `field`, if any.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(y) = raw.parse::<i32>() {
        return Some(y);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Build records from raw rows, parsing `fields` as numbers.
    pub fn from_rows<I>(rows: I, fields: &[&str]) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = Row>,
    {
        let mut report = IngestReport::default();
        let mut records = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            report.rows_read += 1;

            let entity = row.get(ENTITY).map(|e| e.trim()).filter(|e| !e.is_empty());
            let Some(entity) = entity else {
                report.push(DataIssue::Unusable {
                    row: i,
                    entity: None,
                    field: ENTITY.to_string(),
                    raw: row.get(ENTITY).cloned(),
                });
                continue;
            };
            let Some(year) = row.get(YEAR).and_then(|y| parse_year(y)) else {
                report.push(DataIssue::Unusable {
                    row: i,
                    entity: Some(entity.to_string()),
                    field: YEAR.to_string(),
                    raw: row.get(YEAR).cloned(),
                });
                continue;
            };

            let mut values = IndexMap::with_capacity(fields.len());
            for field in fields {
                let raw = row.get(*field);
                let parsed = raw.and_then(|r| parse_value(r));
                if parsed.is_none() {
                    report.push(DataIssue::Unusable {
                        row: i,
                        entity: Some(entity.to_string()),
                        field: field.to_string(),
                        raw: raw.cloned(),
                    });
                }
                values.insert(field.to_string(), parsed);
            }

            records.push(Record {
                entity: entity.to_string(),
                year,
                values,
            });
        }

        (Self { records }, report)
    }

    /// Parse a JSON array of row objects. Scalar cells are read as their text form;
    /// `null` counts as missing.
    pub fn from_json(text: &str, fields: &[&str]) -> Result<(Self, IngestReport), ChartError> {
        let doc: Value = serde_json::from_str(text).map_err(|e| ChartError::load("records", e.to_string()))?;
        let Value::Array(items) = doc else {
            return Err(ChartError::load("records", "expected an array of row objects"));
        };

        let rows = items.into_iter().map(|item| match item {
            Value::Object(obj) => obj
                .into_iter()
                .filter_map(|(k, v)| {
                    let text = match v {
                        Value::Null => return None,
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    Some((k, text))
                })
                .collect::<Row>(),
            // A non-object entry becomes an empty row, reported as missing its entity.
            _ => Row::new(),
        });
        Ok(Self::from_rows(rows, fields))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ascending, deduplicated years present in any record.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Ascending years that have at least one usable value for `field`.
    pub fn usable_years(&self, field: &str) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .records
            .iter()
            .filter(|r| r.value(field).is_some())
            .map(|r| r.year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Most recent year with a usable value for `field`.
    pub fn latest_year(&self, field: &str) -> Option<i32> {
        self.records
            .iter()
            .filter(|r| r.value(field).is_some())
            .map(|r| r.year)
            .max()
    }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.year == year)
    }

    pub fn for_entity<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| r.entity == entity)
    }

    /// Distinct entities in first-seen order.
    pub fn entities(&self) -> IndexSet<&str> {
        self.records.iter().map(|r| r.entity.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row {
        cells.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_and_reports() {
        let rows = vec![
            row(&[(ENTITY, "Qatar"), (YEAR, "2019"), (PER_CAPITA_FIELD, "35.6")]),
            row(&[(ENTITY, "Chad"), (YEAR, "2019"), (PER_CAPITA_FIELD, "n/a")]),
            row(&[(ENTITY, "Peru"), (YEAR, "soon"), (PER_CAPITA_FIELD, "1.8")]),
            row(&[(YEAR, "2019"), (PER_CAPITA_FIELD, "1.0")]),
            row(&[(ENTITY, "Peru"), (YEAR, "2018.0"), (PER_CAPITA_FIELD, " 1.7 ")]),
        ];
        let (ds, report) = Dataset::from_rows(rows, &[PER_CAPITA_FIELD]);
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.unusable(), 3);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[0].value(PER_CAPITA_FIELD), Some(35.6));
        assert_eq!(ds.records()[1].value(PER_CAPITA_FIELD), None);
        assert_eq!(ds.records()[2].year, 2018);
        assert_eq!(ds.records()[2].value(PER_CAPITA_FIELD), Some(1.7));
        assert_eq!(ds.years(), vec![2018, 2019]);
        assert_eq!(ds.latest_year(PER_CAPITA_FIELD), Some(2019));
    }

    #[test]
    fn usable_years_skip_unusable_values() {
        let rows = vec![
            row(&[(ENTITY, "A"), (YEAR, "2000"), (PER_CAPITA_FIELD, "")]),
            row(&[(ENTITY, "A"), (YEAR, "2001"), (PER_CAPITA_FIELD, "2")]),
        ];
        let (ds, _) = Dataset::from_rows(rows, &[PER_CAPITA_FIELD]);
        assert_eq!(ds.years(), vec![2000, 2001]);
        assert_eq!(ds.usable_years(PER_CAPITA_FIELD), vec![2001]);
    }

    #[test]
    fn json_rows() {
        let text = r#"[
            {"Entity": "Qatar", "Year": 2019, "Annual_CO2_emissions_(per_capita)": 35.6},
            {"Entity": "Chad", "Year": "2019", "Annual_CO2_emissions_(per_capita)": null},
            42
        ]"#;
        let (ds, report) = Dataset::from_json(text, &[PER_CAPITA_FIELD]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.for_year(2019).count(), 2);
        assert_eq!(ds.for_entity("Qatar").next().unwrap().value(PER_CAPITA_FIELD), Some(35.6));
        assert_eq!(report.unusable(), 2);

        assert!(matches!(
            Dataset::from_json(r#"{"Entity": "Qatar"}"#, &[]),
            Err(ChartError::LoadFailure { .. })
        ));
        assert!(matches!(
            Dataset::from_json("not json", &[]),
            Err(ChartError::LoadFailure { .. })
        ));
    }
}
