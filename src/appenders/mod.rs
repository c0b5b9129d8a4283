//! Adapter implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod json;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleAdapter;
#[cfg(feature = "file")]
pub use file::FileAdapter;
pub use json::JsonAdapter;
pub use memory::MemoryAdapter;

pub use crate::core::{Adapter, RawEvent};
