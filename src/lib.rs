//! Macro filters for node-based image hosts.
//!
//! A macro filter exposes a flat set of typed parameters and, when attached,
//! builds a fixed graph of primitive operations through a host-provided
//! [`node::NodeFactory`]. Each exposed parameter is redirected to one or more
//! parameters of the internal nodes.

pub mod blueprint;
pub mod catalog;
pub mod color;
pub mod error;
pub mod filter;
pub mod filters;
pub mod graph;
pub mod node;
pub mod preset;
pub mod redirect;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{FilterError, Result};
pub use filter::{FilterDefinition, FilterInfo, FilterInstance};
pub use value::{ParamType, ParamValue};
