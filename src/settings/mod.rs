use clap::Parser;
use std::path::{Path, PathBuf};

use crate::util::has_extension;

#[derive(Parser, Debug)]
#[command(name = "mucraft")]
#[command(version)]
#[command(about = "Imports KSP Mu models and assembles craft files")]
pub struct CliArgs {
    #[arg(short, long, value_name = "FILE", help = "The .mu or .craft file to import")]
    pub input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Where to save the scene (.json) or, for a .mu input, the re-encoded model (.mu)"
    )]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Import colliders")]
    pub colliders: bool,

    #[arg(
        long,
        value_name = "DIR",
        env = "MUCRAFT_PARTS_DIR",
        help = "Part library to scan for craft imports, defaults to the directory of the craft"
    )]
    pub parts_dir: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputKind {
    Model,
    Craft,
}

impl InputKind {
    /// Anything that isn't a `.craft` is treated as a Mu model.
    pub fn from_path(path: &Path) -> InputKind {
        if has_extension(path, "craft") {
            InputKind::Craft
        } else {
            InputKind::Model
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputKind {
    SceneJson,
    Model,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> OutputKind {
        if has_extension(path, "mu") {
            OutputKind::Model
        } else {
            OutputKind::SceneJson
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() -> Result<(), anyhow::Error> {
        let args = CliArgs::try_parse_from(["mucraft", "-i", "ship.craft", "-o", "ship.json", "-c"])?;

        assert_eq!(args.input.as_deref(), Some(Path::new("ship.craft")));
        assert_eq!(args.output.as_deref(), Some(Path::new("ship.json")));
        assert!(args.colliders);
        Ok(())
    }

    #[test]
    fn file_kinds_follow_the_extension() {
        assert_eq!(InputKind::from_path(Path::new("a/ship.CRAFT")), InputKind::Craft);
        assert_eq!(InputKind::from_path(Path::new("a/model.mu")), InputKind::Model);
        assert_eq!(OutputKind::from_path(Path::new("out.mu")), OutputKind::Model);
        assert_eq!(OutputKind::from_path(Path::new("out.json")), OutputKind::SceneJson);
        assert_eq!(OutputKind::from_path(Path::new("no_extension")), OutputKind::SceneJson);
    }
}
