//! Error types and data-quality reports for chart construction

use serde::{Deserialize, Serialize};

use carbonviz_engine::EngineError;

/// Failures surfaced to the caller of a chart. Each one is local to its chart; the
/// caller renders that chart as a placeholder and carries on with the others.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ChartError {
    /// Record or geometry source unreachable or malformed at the top level
    #[error("Failed to load {source_name}: {reason}")]
    LoadFailure { source_name: String, reason: String },

    /// No usable records for the requested selection
    #[error("No usable data for {context}")]
    EmptyDataset { context: String },

    /// Configuration outside its valid range
    #[error("Invalid chart configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ChartError {
    pub fn load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptyDataset {
            context: context.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::LoadFailure { .. } => "load",
            Self::EmptyDataset { .. } => "empty",
            Self::InvalidConfig { .. } => "config",
            Self::Engine(e) => e.category(),
        }
    }
}

/// A recovered data-quality condition. Never aborts a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DataIssue {
    /// A required field was missing or non-numeric; the value is excluded.
    Unusable {
        row: usize,
        entity: Option<String>,
        field: String,
        raw: Option<String>,
    },
    /// A geometry feature had no matching record; it binds to 0.
    JoinMiss { feature: String },
}

/// What ingestion or binding skipped along the way.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub issues: Vec<DataIssue>,
}

impl IngestReport {
    pub fn push(&mut self, issue: DataIssue) {
        match &issue {
            DataIssue::Unusable {
                row, field, raw, ..
            } => log::debug!("row {row}: unusable {field} ({raw:?})"),
            DataIssue::JoinMiss { feature } => log::debug!("join miss for feature '{feature}'"),
        }
        self.issues.push(issue);
    }

    pub fn unusable(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, DataIssue::Unusable { .. }))
            .count()
    }

    pub fn join_misses(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().filter_map(|i| match i {
            DataIssue::JoinMiss { feature } => Some(feature.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(ChartError::empty("year 2019").category(), "empty");
        assert_eq!(ChartError::load("rows", "not an array").category(), "load");
        let engine: ChartError = EngineError::InvalidPadding { padding: 2.0 }.into();
        assert_eq!(engine.category(), "scale");
    }

    #[test]
    fn report_counts() {
        let mut report = IngestReport::default();
        report.push(DataIssue::Unusable {
            row: 3,
            entity: Some("Chad".into()),
            field: "Year".into(),
            raw: Some("n/a".into()),
        });
        report.push(DataIssue::JoinMiss {
            feature: "Atlantis".into(),
        });
        assert_eq!(report.unusable(), 1);
        assert_eq!(report.join_misses().collect::<Vec<_>>(), vec!["Atlantis"]);
    }
}
