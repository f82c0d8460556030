//! Endpoint catalogue for the Jolpica (Ergast-compatible) Formula 1 API.
//!
//! The catalogue is a YAML document listing static, season-dependent and
//! race-dependent endpoints. [`Registry`] turns it into an immutable set of
//! validated descriptors and resolves URLs for a season and round;
//! [`consistency::check`] reports where the document contradicts itself.

#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod catalogue;
pub mod consistency;
pub mod endpoint;
pub mod errors;
pub mod registry;
pub mod settings;
pub mod template;

pub use crate::catalogue::Catalogue;
pub use crate::endpoint::{EndpointDescriptor, EndpointKind, ResolveRequest, ResolveRequestBuilder};
pub use crate::errors::CatalogueError;
pub use crate::registry::Registry;
pub use crate::settings::Settings;
