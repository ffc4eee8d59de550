//! Decoded script commands.

use serde::{Deserialize, Serialize};

use crate::catalog::Operation;
use crate::param::Param;

/// One decoded instruction: category path, function index and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub category: u32,
    pub subcategory: u32,
    pub function: u32,
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Command {
    pub fn new(category: u32, subcategory: u32, function: u32, params: Vec<Param>) -> Self {
        Self {
            category,
            subcategory,
            function,
            params,
        }
    }

    /// Build a command addressing a catalog entry.
    pub fn for_operation(op: Operation, params: Vec<Param>) -> Self {
        let (category, subcategory, function) = op.path();
        Self::new(category, subcategory, function, params)
    }

    pub fn path(&self) -> (u32, u32, u32) {
        (self.category, self.subcategory, self.function)
    }

    /// Catalog entry for this command's path, if any.
    pub fn operation(&self) -> Option<Operation> {
        Operation::lookup(self.category, self.subcategory, self.function)
    }
}
