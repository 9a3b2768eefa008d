//! Boundary with the host engine: node creation and parameter access.
//!
//! The composition layer never looks up operations globally. Whoever attaches
//! a filter hands it a [`NodeFactory`], and every internal node is created
//! through it.

use crate::{error::Result, value::ParamValue};

/// Main image input of every operation.
pub const INPUT_PORT: &str = "input";
/// Auxiliary input of compositing operations (`over`, `xor`, `dst-atop`, ...).
pub const AUX_PORT: &str = "aux";
pub const OUTPUT_PORT: &str = "output";

/// Opaque handle to one instantiated operation.
pub trait OperationNode: Send {
    /// Operation kind this node was created from, e.g. `gegl:median-blur`.
    fn kind(&self) -> &str;

    fn has_param(&self, name: &str) -> bool;

    fn get(&self, name: &str) -> Option<ParamValue>;

    /// Writes a parameter. Implementations may reject unknown names or
    /// mistyped values; they must leave the previous value in place when
    /// they do.
    fn set(&mut self, name: &str, value: ParamValue) -> Result<()>;

    fn accepts_input(&self, port: &str) -> bool {
        port == INPUT_PORT
    }
}

pub trait NodeFactory {
    /// Creates a node of `kind`, seeded with `initial` parameter values.
    ///
    /// Fails with [`crate::error::FilterError::MissingOperation`] when the
    /// kind is not available.
    fn create(&self, kind: &str, initial: &[(String, ParamValue)]) -> Result<Box<dyn OperationNode>>;
}
