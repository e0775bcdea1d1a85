//! Named target domains.
//!
//! Batch jobs refer to their target grid by name ("expats") instead of
//! repeating bounds and resolution in every script. Domains come from the
//! built-in table or from a YAML file:
//!
//! ```yaml
//! domains:
//!   expats:
//!     description: "Central Europe / Alps"
//!     grid:
//!       lat_min: 42.0
//!       lat_max: 51.5
//!       lon_min: 5.0
//!       lon_max: 16.0
//!       resolution: 0.04
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::GridSpecification;

/// A named target grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub grid: GridSpecification,
}

impl Domain {
    /// The EXPATS domain: lat 42-51.5, lon 5-16 at 0.04 degrees.
    pub fn expats() -> Self {
        Self {
            description: Some("EXPATS: central Europe and the Alps".to_string()),
            grid: GridSpecification::new(42.0, 51.5, 5.0, 16.0, 0.04)
                .expect("EXPATS bounds are valid"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DomainFile {
    domains: BTreeMap<String, Domain>,
}

/// Lookup table of domains keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct DomainCatalog {
    domains: BTreeMap<String, Domain>,
}

impl DomainCatalog {
    /// Catalog holding only the built-in domains.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.insert("expats", Domain::expats());
        catalog
    }

    /// Parse a catalog from YAML text. Grid bounds are validated on load.
    pub fn from_yaml_str(yaml: &str) -> GridResult<Self> {
        let file: DomainFile = serde_yaml::from_str(yaml)?;
        if file.domains.is_empty() {
            return Err(GridError::Config("domain file defines no domains".to_string()));
        }

        let mut catalog = Self::default();
        for (name, domain) in file.domains {
            catalog.insert(&name, domain);
        }
        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&contents)?;
        debug!(path = %path.display(), domains = catalog.len(), "Loaded domain catalog");
        Ok(catalog)
    }

    /// Add or replace a domain. Names are case-insensitive.
    pub fn insert(&mut self, name: &str, domain: Domain) {
        self.domains.insert(name.to_lowercase(), domain);
    }

    pub fn get(&self, name: &str) -> GridResult<&Domain> {
        self.domains
            .get(&name.to_lowercase())
            .ok_or_else(|| GridError::UnknownDomain(name.to_string()))
    }

    /// Shorthand for the grid of a named domain.
    pub fn grid(&self, name: &str) -> GridResult<GridSpecification> {
        self.get(name).map(|d| d.grid)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_expats() {
        let catalog = DomainCatalog::builtin();
        let grid = catalog.grid("EXPATS").unwrap();
        assert_eq!(grid.lat_min(), 42.0);
        assert_eq!(grid.lat_max(), 51.5);
        assert_eq!(grid.lon_min(), 5.0);
        assert_eq!(grid.lon_max(), 16.0);
        assert_eq!(grid.resolution(), 0.04);
    }

    #[test]
    fn test_unknown_domain() {
        let catalog = DomainCatalog::builtin();
        assert!(matches!(
            catalog.get("nowhere"),
            Err(GridError::UnknownDomain(name)) if name == "nowhere"
        ));
    }

    #[test]
    fn test_yaml_rejects_invalid_bounds() {
        let yaml = r#"
domains:
  broken:
    grid:
      lat_min: 10.0
      lat_max: 5.0
      lon_min: 0.0
      lon_max: 1.0
      resolution: 0.1
"#;
        assert!(DomainCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_yaml_requires_domains() {
        assert!(matches!(
            DomainCatalog::from_yaml_str("domains: {}\n"),
            Err(GridError::Config(_))
        ));
    }
}
