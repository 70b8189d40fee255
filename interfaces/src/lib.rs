pub mod defs;

pub use defs::{Category, PostExtras, Source, UnifiedPost};
