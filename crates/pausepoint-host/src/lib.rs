//! Pausepoint host: runs page contexts against HTML snapshots, an in-process
//! coordinator, and a console decision prompt.

pub mod config;
pub mod error;
pub mod profile;
pub mod session;
pub mod surface;

pub use error::{HostError, HostResult};
pub use profile::ProfileStore;
pub use session::HostSession;
pub use surface::{render_prompt, ConsoleSurface};
