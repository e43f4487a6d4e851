//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Register routes → Bind → Serve
//!
//! Shutdown:
//!     Ctrl+C or Shutdown::trigger → stop accepting → drain → exit
//!     GET /internal/shutdown (token-gated) → immediate exit(0)
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
