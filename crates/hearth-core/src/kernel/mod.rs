//! # Hearth Core Kernel
//!
//! The `kernel` module forms the heart of the `hearth-core` host. It owns the
//! plugin registry, the event registry and the entity directory, and drives
//! plugins through their lifecycle in a deterministic order.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Host Bootstrapping**: the [`Host`](bootstrap::Host) struct loads plugin
//!   descriptors, runs the setup and start phases, and shuts everything down
//!   in reverse order.
//! - **Core Constants**: application name, plugin API version and default
//!   limits, in the `constants` submodule.
//! - **Error Handling**: kernel [`Error`](error::Error) aggregating every
//!   subsystem error, and a `Result` type alias, in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Host, HostPhase};
pub use error::{Error, KernelLifecyclePhase, Result};
