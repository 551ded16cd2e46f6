use derive_more::{AsRef, Deref, Display, From, Into};
use fs_err as fs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ProductId(String);

crate::impl_string_newtype!(ProductId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemLabel(String);

crate::impl_string_newtype!(ItemLabel);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CatalogName(String);

crate::impl_string_newtype!(CatalogName);

/// One selectable product. `children` are the variants shown when the
/// entry's submenu ring opens; an entry with no children is a leaf.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub label: ItemLabel,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub children: Vec<CatalogEntry>,
}

impl CatalogEntry {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Catalog {
    pub name: Option<CatalogName>,
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file error: {0}")]
    File(#[from] config::ConfigError),
    #[error("Catalog file has no entries: {0}")]
    Empty(PathBuf),
}

static ENTRIES: OnceLock<RwLock<Vec<CatalogEntry>>> = OnceLock::new();

pub fn refresh_cache() {
    let entries = scan_entries();
    let lock = ENTRIES.get_or_init(|| RwLock::new(Vec::new()));
    *lock.write() = entries;
}

fn get_all_entries() -> Vec<CatalogEntry> {
    let lock = ENTRIES.get_or_init(|| RwLock::new(scan_entries()));
    lock.read().clone()
}

fn get_catalog_directories() -> Vec<PathBuf> {
    let xdg = xdg::BaseDirectories::new();
    let mut dirs = Vec::new();

    if let Some(home) = xdg.get_data_home() {
        dirs.push(home.join("vitrine"));
    }

    dirs.extend(xdg.get_data_dirs().into_iter().map(|p| p.join("vitrine")));
    dirs
}

fn collect_catalog_files() -> Vec<PathBuf> {
    let mut files = HashMap::new();
    let dirs = get_catalog_directories();

    // later (home) dirs shadow earlier ones by file name
    for dir in dirs.iter().rev() {
        if let Ok(read_dir) = fs::read_dir(dir) {
            for entry in read_dir.flatten() {
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) == Some("toml")
                    && let Some(id) = path.file_name().and_then(|s| s.to_str())
                {
                    files.insert(id.to_string(), path);
                }
            }
        }
    }
    files.into_values().collect()
}

pub fn scan_entries() -> Vec<CatalogEntry> {
    collect_catalog_files()
        .into_iter()
        .filter_map(|path| match load_catalog_file(&path) {
            Ok(catalog) => Some(catalog.entries),
            Err(e) => {
                log::warn!("Skipping catalog {}: {}", path.display(), e);
                None
            }
        })
        .flatten()
        .collect()
}

pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()))
        .build()?;

    let catalog: Catalog = s.try_deserialize()?;
    if catalog.entries.is_empty() {
        return Err(CatalogError::Empty(path.to_path_buf()));
    }
    Ok(catalog)
}

pub fn find_entry(id: &ProductId) -> Option<CatalogEntry> {
    find_entry_in_list(id, &get_all_entries())
}

pub fn find_entry_in_list(id: &ProductId, entries: &[CatalogEntry]) -> Option<CatalogEntry> {
    let lower = id.to_lowercase();
    entries
        .iter()
        .find(|e| e.id.to_lowercase() == lower || e.label.to_lowercase() == lower)
        .cloned()
}

pub fn resolve_entries(ids: &[ProductId]) -> Vec<Option<CatalogEntry>> {
    ids.iter().map(find_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_toml(s: &str) -> Catalog {
        config::Config::builder()
            .add_source(config::File::from_str(s, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_catalog_parsing() {
        let catalog = parse_toml(
            r#"
            name = "watches"

            [[entries]]
            id = "chrono-01"
            label = "Chronograph"

            [[entries.children]]
            id = "chrono-01-steel"
            label = "Steel"

            [[entries.children]]
            id = "chrono-01-gold"
            label = "Gold"

            [[entries]]
            id = "diver-02"
            label = "Diver"
            blurb = "300m"
            "#,
        );

        assert_eq!(catalog.name, Some(CatalogName::new("watches")));
        assert_eq!(catalog.entries.len(), 2);
        assert!(catalog.entries[0].has_children());
        assert_eq!(catalog.entries[0].children.len(), 2);
        assert!(!catalog.entries[1].has_children());
        assert_eq!(catalog.entries[1].blurb.as_deref(), Some("300m"));
    }

    #[test]
    fn test_find_entry_in_list() {
        let entries = vec![
            CatalogEntry {
                id: ProductId::new("chrono-01"),
                label: ItemLabel::new("Chronograph"),
                blurb: None,
                children: Vec::new(),
            },
            CatalogEntry {
                id: ProductId::new("diver-02"),
                label: ItemLabel::new("Diver"),
                blurb: None,
                children: Vec::new(),
            },
        ];

        let cases = vec![
            ("chrono-01", Some("chrono-01")),
            ("CHRONO-01", Some("chrono-01")),
            ("diver", None),
            ("Diver", Some("diver-02")),
        ];

        for (query, expected) in cases {
            let found = find_entry_in_list(&ProductId::new(query), &entries);
            assert_eq!(
                found.map(|e| e.id.to_string()),
                expected.map(|s| s.to_string()),
                "query {query:?}"
            );
        }
    }

    #[test]
    fn test_newtype_serde_transparent() {
        let id: ProductId = serde_json::from_str("\"chrono-01\"").unwrap();
        assert_eq!(id, ProductId::new("chrono-01"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"chrono-01\"");
    }
}
