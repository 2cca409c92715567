pub mod reader;
pub mod types;

pub use types::ConfigNode;
