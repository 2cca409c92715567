use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use mu_files::mu::reader::MuReader;
use mu_files::mu::types::MuModel;
use mu_files::mu::writer::MuWriter;
use mucraft::craft::import_craft;
use mucraft::scene::{MemoryScene, export};
use mucraft::settings::{CliArgs, InputKind, OutputKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let mut scene = MemoryScene::new(args.colliders);
    let model = match &args.input {
        Some(input) => import(&mut scene, input, &args)?,
        None => {
            warn!("No input given, the scene stays empty");
            None
        }
    };

    if let Some(output) = &args.output {
        match OutputKind::from_path(output) {
            OutputKind::SceneJson => export::write_json(&scene, output)?,
            OutputKind::Model => {
                let model = model.context("Writing a .mu file requires a .mu input")?;
                MuWriter::write_file(&model, output).with_context(|| format!("Writing {}", output.display()))?;
                info!("Saved {}", output.display());
            }
        }
    }

    Ok(())
}

/// Returns the decoded model for Mu inputs, so it can be written back unchanged.
fn import(scene: &mut MemoryScene, input: &Path, args: &CliArgs) -> anyhow::Result<Option<Arc<MuModel>>> {
    match InputKind::from_path(input) {
        InputKind::Craft => {
            let report = import_craft(scene, input, args.parts_dir.as_deref())?;
            info!("Imported {} with {} parts", report.ship_name, report.placed_parts);
            Ok(None)
        }
        InputKind::Model => {
            let model = Arc::new(MuReader::read_file(input).with_context(|| format!("Reading {}", input.display()))?);
            scene.add_model(Arc::clone(&model));
            info!("Imported {}", input.display());
            Ok(Some(model))
        }
    }
}
