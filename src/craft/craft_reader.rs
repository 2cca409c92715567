use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::{Quat, Vec3};
use itertools::Itertools;
use log::{debug, trace, warn};
use mu_files::cfg::ConfigNode;

use crate::craft::coordinate_systems::{read_quaternion, read_vector};
use crate::craft::part_library::{PartRegistry, normalize_part_name};

/// One placed part of a craft, already converted into scene conventions.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    /// The suffix after the last `_` of the part id.
    pub instance_key: Option<String>,
    pub position: Vec3,
    pub rotation: Quat,
    pub mirror: Option<Vec3>,
    pub attach_rotation: Option<Quat>,
    /// Every other field of the PART node, in file order.
    pub fields: Vec<(String, String)>,
}

impl Part {
    pub fn instance_name(&self) -> String {
        match &self.instance_key {
            Some(key) => format!("{}_{}", self.name, key),
            None => self.name.clone(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Craft {
    pub ship_name: String,
    pub parts: Vec<Part>,
    /// PART nodes seen, placed or not.
    pub total_parts: usize,
    /// Parts the registry has no model for.
    pub skipped_parts: usize,
}

impl Craft {
    /// Distinct part names in order of first appearance.
    pub fn prefab_names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.name.as_str()).unique().collect_vec()
    }
}

/// Splits `fuelTank_4294706510` into the normalized part name and its instance key.
pub fn split_part_id(raw: &str) -> (String, Option<String>) {
    match raw.trim().rsplit_once('_') {
        Some((name, key)) => (normalize_part_name(name), Some(key.to_owned())),
        None => (normalize_part_name(raw), None),
    }
}

pub struct CraftReader {}

impl CraftReader {
    pub fn read_file<P: AsRef<Path>>(path: P, registry: &PartRegistry) -> anyhow::Result<Craft> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading craft {}", path.display()))?;
        let root = ConfigNode::parse_bytes(&bytes).with_context(|| format!("Parsing craft {}", path.display()))?;
        CraftReader::from_config(&root, registry)
    }

    pub fn parse(text: &str, registry: &PartRegistry) -> anyhow::Result<Craft> {
        let root = ConfigNode::parse(text)?;
        CraftReader::from_config(&root, registry)
    }

    /// The ship name is the first value of the file, every child node with a `part` field is a
    /// placement.
    pub fn from_config(root: &ConfigNode, registry: &PartRegistry) -> anyhow::Result<Craft> {
        let mut craft = Craft {
            ship_name: root.first_value().map(|(_, value)| value.to_owned()).unwrap_or_default(),
            ..Default::default()
        };

        for (node_name, node) in &root.nodes {
            let Some(part_id) = node.value("part") else {
                debug!("Ignoring {} node without a part field", node_name);
                continue;
            };

            craft.total_parts += 1;
            let part = CraftReader::read_part(node, part_id, registry)
                .with_context(|| format!("Reading part {}", part_id))?;
            match part {
                Some(part) => craft.parts.push(part),
                None => craft.skipped_parts += 1,
            }
        }

        trace!(
            "Craft {}: {} parts, {} skipped",
            craft.ship_name,
            craft.total_parts,
            craft.skipped_parts
        );
        Ok(craft)
    }

    fn read_part(node: &ConfigNode, part_id: &str, registry: &PartRegistry) -> anyhow::Result<Option<Part>> {
        let (name, instance_key) = split_part_id(part_id);
        if !registry.contains(&name) {
            warn!("The part {} was skipped since its model is missing", part_id);
            return Ok(None);
        }

        let mut part = Part {
            name,
            instance_key,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            mirror: None,
            attach_rotation: None,
            fields: Vec::new(),
        };

        let mut seen_id = false;
        for (key, value) in &node.values {
            match key.as_str() {
                "part" if !seen_id => seen_id = true,
                "pos" => part.position = read_vector(value).context("Field pos")?,
                "rot" => part.rotation = read_quaternion(value).context("Field rot")?,
                "mir" => part.mirror = Some(read_vector(value).context("Field mir")?),
                "attRot" => part.attach_rotation = Some(read_quaternion(value).context("Field attRot")?),
                _ => part.fields.push((key.clone(), value.clone())),
            }
        }

        if !node.has_value("pos") || !node.has_value("rot") {
            debug!("Part {} misses its position or rotation, using the defaults", part_id);
        }

        Ok(Some(part))
    }
}
