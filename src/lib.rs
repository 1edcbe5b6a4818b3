pub use brace_templates as templates;

pub mod prelude {
    pub use crate::templates::blocks::{BlockBuilder, BlockInfo, BlockModel, MAIN_BLOCK_ID};
    pub use crate::templates::nodes::{Node, TemplateNode};
    pub use crate::templates::{CompileExpression, Document, ParserConfig, SectionFactory, Template};
}
