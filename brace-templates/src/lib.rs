pub use crate::blocks::{BlockBuilder, BlockInfo, BlockModel, MAIN_BLOCK_ID};
pub use crate::config::ParserConfig;
pub use crate::document::{Document, Template};
pub use crate::expressions::{CompileExpression, Expression, ExpressionCompiler};
pub use crate::nodes::{Node, TemplateNode};
pub use crate::primitives::Primitive;
pub use crate::sections::{SectionFactory, Sections};

pub mod blocks;
mod config;
mod document;
pub mod error;
pub mod expressions;
mod lexer;
pub mod nodes;
mod primitives;
pub mod sections;
mod token;
