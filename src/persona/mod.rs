//! Persona store: discovery, sampling, and loading of persona files.
//!
//! Persona records live as one YAML mapping per file, directly under the
//! personas directory (no recursion). A run samples `min(count, available)`
//! files uniformly at random without replacement and parses each one. A
//! malformed file is logged and skipped; the run continues with fewer
//! personas.

use crate::error::{Error, Result};
use crate::models::Persona;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default namespace subdirectory for persona files.
pub const DEFAULT_NAMESPACE: &str = "market_agents_personas";

/// Resolve the effective personas directory from a base path.
///
/// Persona files live under `personas/<namespace>/` relative to the base
/// directory. If the base path already contains the namespace segment it is
/// used as-is; otherwise the suffix is appended.
pub fn resolve_personas_dir(base: &Path, namespace: &str) -> PathBuf {
    let has_namespace = base
        .components()
        .any(|c| c.as_os_str().to_str() == Some(namespace));

    if has_namespace {
        base.to_path_buf()
    } else {
        base.join("personas").join(namespace)
    }
}

/// Loads a random sample of personas from a directory.
pub struct PersonaStore {
    dir: PathBuf,
    /// Optional RNG seed for reproducible sampling.
    seed: Option<u64>,
}

impl PersonaStore {
    /// Create a store over the given (already resolved) directory.
    pub fn new(dir: PathBuf, seed: Option<u64>) -> Self {
        Self { dir, seed }
    }

    /// The directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load up to `count` personas, sampled without replacement.
    ///
    /// Returns `Ok(vec![])` when the directory holds no persona files; the
    /// caller decides whether an empty panel is fatal. Fails with
    /// [`Error::PersonaDirNotFound`] if the directory cannot be read.
    pub fn load(&self, count: usize) -> Result<Vec<Persona>> {
        info!("Loading {} personas from {}", count, self.dir.display());

        let files = self.persona_files()?;
        info!("Found {} persona files", files.len());

        let selected = self.sample(files, count);

        let mut personas = Vec::with_capacity(selected.len());
        let mut seen_names: HashSet<String> = HashSet::new();

        for path in &selected {
            debug!("Loading persona from {}", path.display());
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Error reading persona file {}: {}", path.display(), e);
                    continue;
                }
            };
            match Self::parse(path, &content) {
                Ok(persona) => {
                    if !seen_names.insert(persona.name.clone()) {
                        warn!(
                            "Duplicate persona name '{}' in {}; skipping file",
                            persona.name,
                            path.display()
                        );
                        continue;
                    }
                    debug!("Loaded persona: {}", persona.name);
                    personas.push(persona);
                }
                Err(e) => {
                    // Recovered: the run continues with fewer personas
                    warn!("{}", e);
                }
            }
        }

        info!("Successfully loaded {} personas", personas.len());
        Ok(personas)
    }

    /// Collect YAML files directly under the personas directory.
    fn persona_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::PersonaDirNotFound {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
            })
            .collect();

        // Stable order so seeded sampling is reproducible across platforms
        files.sort();
        Ok(files)
    }

    /// Sample `min(count, available)` files uniformly without replacement.
    fn sample(&self, files: Vec<PathBuf>, count: usize) -> Vec<PathBuf> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        files
            .choose_multiple(&mut rng, count.min(files.len()))
            .cloned()
            .collect()
    }

    fn parse(path: &Path, content: &str) -> Result<Persona> {
        serde_yaml::from_str(content).map_err(|e| Error::PersonaParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn write_persona(dir: &Path, file: &str, name: &str) {
        let yaml = format!(
            "name: {}\npersona: A market participant.\nobjectives:\n  - Make money\nrole: trader\ntrader_type:\n  - momentum\n",
            name
        );
        fs::write(dir.join(file), yaml).unwrap();
    }

    #[test]
    fn test_resolve_dir_appends_namespace() {
        let resolved = resolve_personas_dir(Path::new("/data"), DEFAULT_NAMESPACE);
        assert_eq!(
            resolved,
            Path::new("/data/personas/market_agents_personas")
        );
    }

    #[test]
    fn test_resolve_dir_keeps_existing_namespace() {
        let base = Path::new("/data/personas/market_agents_personas");
        assert_eq!(resolve_personas_dir(base, DEFAULT_NAMESPACE), base);
    }

    #[test]
    fn test_load_samples_without_replacement() {
        let tmp = TempDir::new().unwrap();
        write_persona(tmp.path(), "a.yaml", "Alice");
        write_persona(tmp.path(), "b.yaml", "Bob");
        write_persona(tmp.path(), "c.yaml", "Carol");

        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        let personas = store.load(2).unwrap();

        assert_eq!(personas.len(), 2);
        let names: HashSet<&str> = personas.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 2, "sampled personas must be distinct");
    }

    #[test]
    fn test_load_caps_at_available() {
        let tmp = TempDir::new().unwrap();
        write_persona(tmp.path(), "a.yaml", "Alice");

        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        let personas = store.load(10).unwrap();
        assert_eq!(personas.len(), 1);
    }

    #[test]
    fn test_load_empty_dir_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        assert!(store.load(3).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let store = PersonaStore::new(PathBuf::from("/nonexistent/personas"), None);
        let err = store.load(1).unwrap_err();
        assert!(matches!(err, Error::PersonaDirNotFound { .. }));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        for (file, name) in [
            ("a.yaml", "Alice"),
            ("b.yaml", "Bob"),
            ("c.yaml", "Carol"),
            ("d.yaml", "Dave"),
        ] {
            write_persona(tmp.path(), file, name);
        }
        fs::write(tmp.path().join("e.yaml"), "name: [unclosed").unwrap();

        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        let personas = store.load(5).unwrap();
        assert_eq!(personas.len(), 4);
    }

    #[test]
    fn test_non_yaml_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_persona(tmp.path(), "a.yaml", "Alice");
        fs::write(tmp.path().join("notes.txt"), "not a persona").unwrap();

        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        assert_eq!(store.load(5).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_names_deduped() {
        let tmp = TempDir::new().unwrap();
        write_persona(tmp.path(), "a.yaml", "Alice");
        write_persona(tmp.path(), "b.yaml", "Alice");

        let store = PersonaStore::new(tmp.path().to_path_buf(), None);
        let personas = store.load(2).unwrap();
        assert_eq!(personas.len(), 1);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let tmp = TempDir::new().unwrap();
        for (file, name) in [
            ("a.yaml", "Alice"),
            ("b.yaml", "Bob"),
            ("c.yaml", "Carol"),
            ("d.yaml", "Dave"),
            ("e.yaml", "Erin"),
        ] {
            write_persona(tmp.path(), file, name);
        }

        let first: Vec<String> = PersonaStore::new(tmp.path().to_path_buf(), Some(42))
            .load(3)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        let second: Vec<String> = PersonaStore::new(tmp.path().to_path_buf(), Some(42))
            .load(3)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(first, second);
    }
}
