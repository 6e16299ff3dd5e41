//! Generated file artifacts.

pub mod file_twin;

pub use file_twin::FileTwin;
