use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use log::{debug, info, warn};

use crate::craft::craft_reader::{Craft, CraftReader};
use crate::craft::part_library::{PartLibrary, PartRegistry};
use crate::scene::{ObjectId, SceneHost};

/// Applied to every placed part whose config has no `rescaleFactor`.
pub const DEFAULT_PART_SCALE: f32 = 1.25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub ship_name: String,
    pub root: ObjectId,
    /// Parts the library offered.
    pub available_parts: usize,
    /// Distinct parts the craft loaded.
    pub used_parts: usize,
    pub placed_parts: usize,
    pub skipped_parts: usize,
    pub instances: Vec<ObjectId>,
}

pub struct CraftAssembler {}

impl CraftAssembler {
    /// Places every part of `craft` under a new root named after the ship.
    ///
    /// Every object that was at the top level before, the loaded prefabs included, is deleted
    /// afterwards. Any prefab that fails to load aborts the assembly before anything is placed,
    /// and the prefabs loaded until then are deleted again.
    pub fn assemble<H: SceneHost>(
        host: &mut H,
        craft: &Craft,
        registry: &PartRegistry,
    ) -> anyhow::Result<AssemblyReport> {
        let prefabs = CraftAssembler::load_prefabs(host, craft, registry)?;
        let originals = host.top_level_objects();
        let root = host.create_empty(&craft.ship_name);

        let mut instances = Vec::with_capacity(craft.parts.len());
        for part in &craft.parts {
            let prefab = prefabs
                .get(part.name.as_str())
                .with_context(|| format!("No prefab loaded for {}", part.name))?;
            let entry = registry
                .get(&part.name)
                .with_context(|| format!("Part {} is not in the library", part.name))?;

            let instance = host.duplicate(*prefab)?;
            let scale = match entry.rescale_factor {
                None => Some(Vec3::splat(DEFAULT_PART_SCALE)),
                Some(_) => None,
            };
            host.set_transform(instance, part.position, part.rotation, scale)?;
            host.rename(instance, &part.instance_name())?;
            host.set_parent(instance, Some(root))?;
            instances.push(instance);
        }

        for original in originals {
            host.delete(original)?;
        }

        let report = AssemblyReport {
            ship_name: craft.ship_name.clone(),
            root,
            available_parts: registry.len(),
            used_parts: prefabs.len(),
            placed_parts: instances.len(),
            skipped_parts: craft.skipped_parts,
            instances,
        };

        info!(
            "{} parts were found, {} were used, the final ship has {} parts",
            report.available_parts, report.used_parts, report.placed_parts
        );
        if report.skipped_parts > 0 {
            warn!("{} parts were skipped", report.skipped_parts);
        }
        Ok(report)
    }

    fn load_prefabs<'a, H: SceneHost>(
        host: &mut H,
        craft: &'a Craft,
        registry: &PartRegistry,
    ) -> anyhow::Result<HashMap<&'a str, ObjectId>> {
        let mut prefabs = HashMap::new();
        for name in craft.prefab_names() {
            match CraftAssembler::load_prefab(host, name, registry) {
                Ok(prefab) => {
                    prefabs.insert(name, prefab);
                }
                Err(err) => {
                    for (loaded, prefab) in prefabs {
                        if let Err(delete_err) = host.delete(prefab) {
                            warn!("Could not remove the prefab of part {}: {:#}", loaded, delete_err);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(prefabs)
    }

    fn load_prefab<H: SceneHost>(host: &mut H, name: &str, registry: &PartRegistry) -> anyhow::Result<ObjectId> {
        let entry = registry
            .get(name)
            .with_context(|| format!("Part {} is not in the library", name))?;
        debug!("Loading prefab {} from {}", name, entry.model.display());

        host.load_model(&entry.model)
            .with_context(|| format!("Loading the prefab of part {}", name))
    }
}

/// Scans the part library, reads the craft at `craft_path` and assembles it into `host`.
///
/// `parts_dir` defaults to the directory holding the craft.
pub fn import_craft<H: SceneHost>(
    host: &mut H,
    craft_path: &Path,
    parts_dir: Option<&Path>,
) -> anyhow::Result<AssemblyReport> {
    let parts_dir = parts_dir
        .or_else(|| craft_path.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let registry = PartLibrary::scan(parts_dir)?;
    let craft = CraftReader::read_file(craft_path, &registry)?;
    CraftAssembler::assemble(host, &craft, &registry)
        .with_context(|| format!("Assembling {}", craft_path.display()))
}
