#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod configurator;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod instantiator;
pub(crate) mod registry;
pub(crate) mod resolution;

pub use any::TypeInfo;
pub use config::Config;
pub use configurator::Configurator;
pub use container::Container;
pub use dependency_resolver::{Capability, DependencyResolver};
pub use errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind};
pub use instantiator::{instance, Factory, Instantiator};

#[doc(hidden)]
pub mod __private {
    pub use alloc::sync::Arc;
}
