//! Python toolchain adapters
//!
//! Guards and tests are validated by external Python tools running in a
//! virtual environment under the generation root.

pub mod environment;
pub mod process;
pub mod pyright;
pub mod pytest;

pub use environment::VenvProvisioner;
pub use process::{CommandOutput, ProcessSpec};
pub use pyright::PyrightChecker;
pub use pytest::PytestRunner;
