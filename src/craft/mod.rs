pub mod assembler;
pub mod coordinate_systems;
pub mod craft_reader;
pub mod part_library;

pub use assembler::{AssemblyReport, CraftAssembler, import_craft};
pub use craft_reader::{Craft, CraftReader, Part};
pub use part_library::{PartEntry, PartLibrary, PartRegistry};
