//! Section blocks.
//!
//! Every section tag consists of one or more blocks. The main block is always present
//! and has the id [`MAIN_BLOCK_ID`]. Additional blocks start with a label definition:
//! `{:else}`, `{:else if ready}`.
//!
//! A [`BlockBuilder`] collects a block while the parser is still scanning its body,
//! [`BlockBuilder::build`] turns it into an immutable [`BlockModel`].
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use self::builder::{BlockBuilder, BlockInfo};
use crate::expressions::{CompileExpression, Expression};
use crate::nodes::{Node, TemplateNode};

mod builder;

/// Id (and default label) of the block that opens a section.
pub const MAIN_BLOCK_ID: &str = "main";

/// One finished block of a section.
///
/// The parameter and expression maps are moved in from the builder,
/// nothing holds on to them mutably once the model exists.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockModel {
    id: String,
    label: String,
    parameters: HashMap<String, String>,
    expressions: HashMap<String, Expression>,
    nodes: Arc<[Node]>,
}

impl BlockModel {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        parameters: HashMap<String, String>,
        expressions: HashMap<String, Expression>,
        nodes: impl Into<Arc<[Node]>>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parameters,
            expressions,
            nodes: nodes.into(),
        }
    }

    /// Start a new block. The label defaults to the id.
    pub fn builder(id: impl Into<String>, compiler: &dyn CompileExpression) -> BlockBuilder<'_> {
        BlockBuilder::new(id, compiler)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_main(&self) -> bool {
        self.id == MAIN_BLOCK_ID
    }

    /// Raw parameter values
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Compiled parameter values
    pub fn expressions(&self) -> &HashMap<String, Expression> {
        &self.expressions
    }

    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(name)
    }

    /// Block content, in rendering order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All expressions reachable from this block: the block's own expressions
    /// and everything the child nodes collect.
    ///
    /// This is computed on every call.
    pub fn collect_expressions(&self) -> HashSet<Expression> {
        let mut expressions = self.expressions.values().cloned().collect::<HashSet<_>>();
        for node in self.nodes.iter() {
            expressions.extend(node.collect_expressions());
        }
        expressions
    }
}
