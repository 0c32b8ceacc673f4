//! Dependency manifest (ps_dependencies.json)
//!
//! The manifest is shipped inside the owning module directory and declares the modules
//! it needs. A missing or broken manifest is always an error: it must never read as
//! "no dependencies".

mod serialization;


use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::Settings;
use crate::error::{Result, manifest};
use serialization::DependencyList;

/// Key holding the dependency declarations
const DEPENDENCIES_KEY: &str = "dependencies";

/// Key holding the optional help URL table
const HELP_URL_KEY: &str = "help_url";

/// A single declared dependency
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyDeclaration {
    /// Technical module name
    pub name: String,

    /// Minimum version, when declared
    pub min_version: Option<String>,

    /// Free-form fields of list-shaped records
    pub metadata: Map<String, Value>,
}

impl DependencyDeclaration {
    /// Create a declaration with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_version: None,
            metadata: Map::new(),
        }
    }
}

/// A loaded dependency manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    /// File the manifest was read from
    pub path: PathBuf,

    /// Declared dependencies, in manifest order
    pub dependencies: Vec<DependencyDeclaration>,

    /// Raw `help_url` document, if any
    pub help_url: Option<Value>,
}

impl Manifest {
    /// Find and load the manifest of a module directory.
    ///
    /// The configured filename is tried first, then the legacy ones. When none exists
    /// the error names the primary filename.
    pub fn locate(module_dir: &Path, settings: &Settings) -> Result<Self> {
        let path = settings
            .manifest_candidates()
            .map(|name| module_dir.join(name))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| module_dir.join(&settings.manifest_filename));

        Self::load(&path)
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                manifest::not_found(path.display().to_string())
            } else {
                manifest::parse_failed(path.display().to_string(), e.to_string())
            }
        })?;

        let manifest = Self::parse(&content, path)?;
        tracing::debug!(
            "loaded {} dependencies from {}",
            manifest.dependencies.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Parse manifest content; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let display = path.display().to_string();

        let document: Value = serde_json::from_str(content)
            .map_err(|e| manifest::parse_failed(&display, e.to_string()))?;

        let Value::Object(mut root) = document else {
            return Err(manifest::invalid(&display, "top level must be an object"));
        };

        let raw_dependencies = root.remove(DEPENDENCIES_KEY).ok_or_else(|| {
            manifest::invalid(&display, format!("missing '{DEPENDENCIES_KEY}' key"))
        })?;

        let DependencyList(dependencies) = serde_json::from_value(raw_dependencies)
            .map_err(|e| manifest::invalid(&display, e.to_string()))?;

        let manifest = Self {
            path: path.to_path_buf(),
            dependencies,
            help_url: root.remove(HELP_URL_KEY),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate declarations: names must be non-empty and unique
    pub fn validate(&self) -> Result<()> {
        let display = self.path.display().to_string();
        let mut seen = std::collections::HashSet::new();

        for dependency in &self.dependencies {
            if dependency.name.trim().is_empty() {
                return Err(manifest::invalid(
                    &display,
                    "dependency name cannot be empty",
                ));
            }
            if !seen.insert(dependency.name.as_str()) {
                return Err(manifest::invalid(
                    &display,
                    format!("dependency '{}' is declared twice", dependency.name),
                ));
            }
        }

        Ok(())
    }

    /// Whether a module is declared
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }
}
