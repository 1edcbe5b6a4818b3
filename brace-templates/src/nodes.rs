use std::collections::HashSet;
use std::sync::Arc;

use crate::blocks::BlockModel;
use crate::expressions::Expression;

/// Anything that can be embedded in a block body.
pub trait TemplateNode {
    fn collect_expressions(&self) -> HashSet<Expression>;
}

/// Static text
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode(Arc<str>);

impl TextNode {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TemplateNode for TextNode {
    fn collect_expressions(&self) -> HashSet<Expression> {
        HashSet::new()
    }
}

/// Value output, e.g. `{item.name}`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    expression: Expression,
}

impl ExpressionNode {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl TemplateNode for ExpressionNode {
    fn collect_expressions(&self) -> HashSet<Expression> {
        HashSet::from([self.expression.clone()])
    }
}

/// A section tag and all of its blocks, main block first.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    name: String,
    blocks: Arc<[BlockModel]>,
}

impl SectionNode {
    pub fn new(name: impl Into<String>, blocks: impl Into<Arc<[BlockModel]>>) -> Self {
        Self {
            name: name.into(),
            blocks: blocks.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[BlockModel] {
        &self.blocks
    }

    pub fn block(&self, label: &str) -> Option<&BlockModel> {
        self.blocks.iter().find(|block| block.label() == label)
    }
}

impl TemplateNode for SectionNode {
    fn collect_expressions(&self) -> HashSet<Expression> {
        self.blocks.iter().flat_map(BlockModel::collect_expressions).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextNode),
    Expression(ExpressionNode),
    Section(SectionNode),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&SectionNode> {
        match self {
            Self::Section(section) => Some(section),
            _ => None,
        }
    }
}

impl TemplateNode for Node {
    fn collect_expressions(&self) -> HashSet<Expression> {
        match self {
            Self::Text(node) => node.collect_expressions(),
            Self::Expression(node) => node.collect_expressions(),
            Self::Section(node) => node.collect_expressions(),
        }
    }
}

impl From<TextNode> for Node {
    fn from(value: TextNode) -> Self {
        Self::Text(value)
    }
}

impl From<ExpressionNode> for Node {
    fn from(value: ExpressionNode) -> Self {
        Self::Expression(value)
    }
}

impl From<SectionNode> for Node {
    fn from(value: SectionNode) -> Self {
        Self::Section(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blocks::MAIN_BLOCK_ID;
    use crate::expressions::{CompileExpression, ExpressionCompiler};

    #[test]
    fn text_has_no_expressions() {
        let node = Node::from(TextNode::new("hello"));
        assert!(node.collect_expressions().is_empty());
        assert_eq!(node.as_text(), Some("hello"));
    }

    #[test]
    fn section_unions_blocks() {
        let compiler = ExpressionCompiler::new();

        let mut main = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        let cond = main.add_expression("x", "x").unwrap();
        let mut other = BlockModel::builder("1", &compiler);
        other.set_label("else");
        let value = compiler.compile("y").unwrap();
        other.add_node(ExpressionNode::new(value.clone()));

        let node = Node::from(SectionNode::new("if", vec![main.build(), other.build()]));
        assert_eq!(node.collect_expressions(), HashSet::from([cond, value]));

        let section = node.as_section().unwrap();
        assert_eq!(section.name(), "if");
        assert_eq!(section.block("else").map(BlockModel::id), Some("1"));
        assert!(section.block("case").is_none());
    }
}
