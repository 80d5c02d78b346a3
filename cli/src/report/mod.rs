pub mod aggregate;
pub mod error;
pub mod render;
pub mod resolve;
pub mod source_map;
