//! # Skillgate Workspace
//!
//! Root package of the workspace. It carries the cross-crate scenario tests
//! under `tests/` and the runnable demos under `demos/`; the library itself
//! lives in the [`skillgate`] facade crate and is re-exported here.
//!
//! ```bash
//! cargo run --example standalone_agent
//! cargo run --example manual_wiring
//! cargo run --example multi_agent
//! ```

pub use skillgate::*;
