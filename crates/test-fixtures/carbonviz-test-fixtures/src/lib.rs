//! Manifest-driven access to the sample data under `fixtures/`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    records: HashMap<String, RecordsEntry>,
    geometry: HashMap<String, String>,
    flows: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        fields: Vec<String>,
    },
}

impl RecordsEntry {
    fn as_path(&self) -> &str {
        match self {
            RecordsEntry::Path(path) => path,
            RecordsEntry::Detailed { path, .. } => path,
        }
    }

    fn fields(&self) -> &[String] {
        match self {
            RecordsEntry::Path(_) => &[],
            RecordsEntry::Detailed { fields, .. } => fields,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Emissions rows: JSON arrays of `{ "Entity", "Year", <field>... }` objects.
pub mod records {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.records.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.records, "records", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.records, "records", name)?;
        super::load_json(entry.as_path())
    }

    /// Numeric columns the fixture carries.
    pub fn fields(name: &str) -> Result<Vec<String>> {
        let entry = lookup(&MANIFEST.records, "records", name)?;
        Ok(entry.fields().to_vec())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.records, "records", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}

/// GeoJSON feature collections.
pub mod geometry {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.geometry.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.geometry, "geometry", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.geometry, "geometry", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.geometry, "geometry", name)?;
        Ok(resolve_path(rel))
    }
}

/// Node/link flow definitions for the alluvial layout.
pub mod flows {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.flows.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.flows, "flows", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.flows, "flows", name)?;
        super::load_json(rel)
    }
}
