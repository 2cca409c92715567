use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info, trace, warn};
use mu_files::cfg::ConfigNode;
use walkdir::WalkDir;

use crate::util::has_extension;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEntry {
    pub model: PathBuf,
    /// Kept verbatim, only its presence matters for the assembly. An empty value counts as absent.
    pub rescale_factor: Option<String>,
}

/// Part name to model file, built once per assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartRegistry {
    parts: BTreeMap<String, PartEntry>,
}

impl PartRegistry {
    pub fn get(&self, name: &str) -> Option<&PartEntry> {
        self.parts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PartEntry)> {
        self.parts.iter()
    }

    pub fn insert(&mut self, name: String, entry: PartEntry) -> Option<PartEntry> {
        self.parts.insert(name, entry)
    }
}

/// KSP part names may contain dots, which the craft files and the scene can't use.
pub fn normalize_part_name(raw: &str) -> String {
    raw.trim().replace('.', "_")
}

pub struct PartLibrary {}

impl PartLibrary {
    /// Walks `directory` for part configs (`*.cfg`) and resolves the model of each part.
    ///
    /// Configs that can't be read or parsed are skipped with a warning.
    pub fn scan<P: AsRef<Path>>(directory: P) -> anyhow::Result<PartRegistry> {
        let directory = directory.as_ref();
        let mut registry = PartRegistry::default();

        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(err).with_context(|| format!("Scanning part library {}", directory.display()));
                }
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {}", directory.display(), err);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !has_extension(path, "cfg") {
                continue;
            }

            let cfg = match PartLibrary::read_cfg(path) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Skipping part config {}: {:#}", path.display(), err);
                    continue;
                }
            };

            if let Some((name, part)) = PartLibrary::parse_part_cfg(&cfg, path) {
                trace!("Found part {} -> {}", name, part.model.display());
                if let Some(previous) = registry.insert(name.clone(), part) {
                    warn!(
                        "Part {} is defined more than once, replacing {}",
                        name,
                        previous.model.display()
                    );
                }
            }
        }

        info!("Found {} parts in {}", registry.len(), directory.display());
        Ok(registry)
    }

    fn read_cfg(path: &Path) -> anyhow::Result<ConfigNode> {
        let bytes = fs::read(path)?;
        Ok(ConfigNode::parse_bytes(&bytes)?)
    }

    /// Extracts name, model and rescale factor from the first node of a part config.
    ///
    /// Returns `None` when the part has no name or no model file can be found for it.
    pub fn parse_part_cfg(cfg: &ConfigNode, cfg_path: &Path) -> Option<(String, PartEntry)> {
        let (_, part) = cfg.first_node()?;
        let cfg_dir = cfg_path.parent()?;

        let name = normalize_part_name(part.value("name").unwrap_or_default());
        if name.is_empty() {
            debug!("{} does not name its part", cfg_path.display());
            return None;
        }

        let model = PartLibrary::model_from_model_nodes(part, cfg_dir)
            .or_else(|| PartLibrary::model_from_mesh_field(part, cfg_dir, &name))
            .or_else(|| PartLibrary::substitute_model(cfg_dir, &name));

        let Some(model) = model else {
            debug!("No model found for part {} ({})", name, cfg_path.display());
            return None;
        };

        Some((
            name,
            PartEntry {
                model,
                rescale_factor: part
                    .value("rescaleFactor")
                    .filter(|factor| !factor.is_empty())
                    .map(str::to_owned),
            },
        ))
    }

    // MODEL { model = Squad/Parts/FuelTank/fuelTankT100/model } points at model.mu next to the cfg
    fn model_from_model_nodes(part: &ConfigNode, cfg_dir: &Path) -> Option<PathBuf> {
        part.nodes_named("MODEL")
            .filter_map(|node| node.value("model"))
            .find_map(|model| {
                let file_name = model.rsplit('/').next().unwrap_or(model);
                let candidate = cfg_dir.join(format!("{}.mu", file_name));
                if candidate.is_file() {
                    return Some(candidate);
                }

                debug!(
                    "The model {} is not found. Looking for the mesh field",
                    candidate.display()
                );
                None
            })
    }

    fn model_from_mesh_field(part: &ConfigNode, cfg_dir: &Path, name: &str) -> Option<PathBuf> {
        let mesh = part.value("mesh")?;
        let candidate = cfg_dir.join(mesh);
        if candidate.is_file() && has_extension(&candidate, "mu") {
            return Some(candidate);
        }

        warn!(
            "The model {} of part {} doesn't exist or is not a mu file",
            candidate.display(),
            name
        );
        None
    }

    fn substitute_model(cfg_dir: &Path, name: &str) -> Option<PathBuf> {
        let mut candidates = fs::read_dir(cfg_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_extension(path, "mu"))
            .collect::<Vec<_>>();
        candidates.sort();

        let substitute = candidates.into_iter().next()?;
        warn!(
            "Part {} uses the substitute model {}, the result may be altered",
            name,
            substitute.display()
        );
        Some(substitute)
    }
}
