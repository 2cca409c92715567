pub mod craft;
pub mod scene;
pub mod settings;
pub mod util;
