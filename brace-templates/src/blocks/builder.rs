use std::collections::HashMap;
use std::fmt;

use super::BlockModel;
use crate::error::ExpressionError;
use crate::expressions::{CompileExpression, Expression};
use crate::nodes::Node;

/// What a section factory gets to see of a block that is still being parsed.
pub trait BlockInfo {
    fn label(&self) -> &str;

    fn parameters(&self) -> &HashMap<String, String>;

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters().get(name).map(String::as_str)
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters().contains_key(name)
    }

    fn parameter_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.parameter(name).unwrap_or(default)
    }

    /// Compile `value` and store the result under `param`.
    fn add_expression(&mut self, param: &str, value: &str) -> Result<Expression, ExpressionError>;
}

/// Accumulates a block while the parser walks its body.
///
/// Parameters, expressions and nodes can be added in any order.
/// [`build`](Self::build) consumes the builder, so a block can only be finalized once.
///
/// ```
/// # use brace_templates::blocks::{BlockModel, MAIN_BLOCK_ID};
/// # use brace_templates::expressions::ExpressionCompiler;
/// # use brace_templates::nodes::TextNode;
/// let compiler = ExpressionCompiler::new();
/// let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
/// builder.add_parameter("x", "x");
/// builder.add_expression("x", "x").unwrap();
/// builder.add_node(TextNode::new("A"));
///
/// let block = builder.build();
/// assert_eq!(block.label(), "main");
/// assert_eq!(block.parameter("x"), Some("x"));
/// ```
pub struct BlockBuilder<'c> {
    id: String,
    label: String,
    parameters: HashMap<String, String>,
    expressions: HashMap<String, Expression>,
    nodes: Vec<Node>,
    compiler: &'c dyn CompileExpression,
}

impl<'c> BlockBuilder<'c> {
    pub fn new(id: impl Into<String>, compiler: &'c dyn CompileExpression) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            parameters: HashMap::new(),
            expressions: HashMap::new(),
            nodes: Vec::new(),
            compiler,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = label.into();
        self
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Record a raw parameter.
    /// An existing parameter with the same name is replaced.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Compile `value` and store it under `param`, replacing any previous expression.
    ///
    /// Compilation errors are returned untouched and leave the builder as it was.
    pub fn add_expression(&mut self, param: impl Into<String>, value: &str) -> Result<Expression, ExpressionError> {
        let expression = self.compiler.compile(value)?;
        self.expressions.insert(param.into(), expression.clone());
        Ok(expression)
    }

    pub fn add_node(&mut self, node: impl Into<Node>) -> &mut Self {
        self.nodes.push(node.into());
        self
    }

    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> &mut Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn build(self) -> BlockModel {
        log::trace!(
            "block `{}` ({}): {} parameters, {} expressions, {} nodes",
            self.id,
            self.label,
            self.parameters.len(),
            self.expressions.len(),
            self.nodes.len()
        );
        BlockModel::new(self.id, self.label, self.parameters, self.expressions, self.nodes)
    }
}

impl BlockInfo for BlockBuilder<'_> {
    fn label(&self) -> &str {
        &self.label
    }

    fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    fn add_expression(&mut self, param: &str, value: &str) -> Result<Expression, ExpressionError> {
        BlockBuilder::add_expression(self, param, value)
    }
}

impl fmt::Debug for BlockBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBuilder")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("parameters", &self.parameters)
            .field("expressions", &self.expressions)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::blocks::MAIN_BLOCK_ID;
    use crate::error::ParseErrorKind;
    use crate::expressions::{ExpressionCompiler, add, ident, num};
    use crate::nodes::TextNode;

    fn text(s: &str) -> Node {
        TextNode::new(s).into()
    }

    #[test]
    fn default_label_is_id() {
        let compiler = ExpressionCompiler::new();
        let block = BlockModel::builder(MAIN_BLOCK_ID, &compiler).build();
        assert_eq!(block.id(), "main");
        assert_eq!(block.label(), "main");
        assert!(block.is_main());
    }

    #[test]
    fn set_label() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        builder.set_label("else");
        let block = builder.build();
        assert_eq!(block.id(), "main");
        assert_eq!(block.label(), "else");
    }

    #[test]
    fn last_label_wins() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder("3", &compiler);
        builder.add_parameter("a", "1").set_label("else").add_node(text("x")).set_label("case");
        assert_eq!(builder.build().label(), "case");
    }

    #[test]
    fn parameters_last_write_wins() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        builder
            .add_parameter("name", "first")
            .add_parameter("other", "value")
            .add_parameter("name", "second");

        let block = builder.build();
        let expected = HashMap::from([
            ("name".to_string(), "second".to_string()),
            ("other".to_string(), "value".to_string()),
        ]);
        assert_eq!(*block.parameters(), expected);
        assert!(block.expressions().is_empty());
    }

    #[test]
    fn add_expression_compiles_and_stores() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        let expression = builder.add_expression("x", "1 + 1").unwrap();
        assert_eq!(*add(num(1), num(1)), *expression.kind());

        let block = builder.build();
        assert_eq!(block.expression("x"), Some(&expression));
        assert!(block.parameters().is_empty());
    }

    #[test]
    fn expressions_last_write_wins() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        let first = builder.add_expression("x", "a").unwrap();
        let second = builder.add_expression("x", "b").unwrap();

        let block = builder.build();
        assert_eq!(block.expressions().len(), 1);
        assert_eq!(block.expression("x"), Some(&second));
        assert_ne!(block.expression("x"), Some(&first));
        assert_eq!(block.collect_expressions(), HashSet::from([second]));
    }

    #[test]
    fn failed_expression_leaves_builder_untouched() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        let ok = builder.add_expression("x", "a").unwrap();

        let err = builder.add_expression("x", "1 +").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
        let err = builder.add_expression("y", "1 +").unwrap_err();
        assert_eq!(err.expr, "1 +");

        let block = builder.build();
        assert_eq!(block.expressions().len(), 1);
        assert_eq!(block.expression("x"), Some(&ok));
        assert_eq!(block.expression("y"), None);
    }

    #[test]
    fn node_order() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        builder.add_node(text("N1"));
        builder.add_nodes([text("N2"), text("N3")]);
        builder.add_nodes(Vec::new());

        let block = builder.build();
        assert_eq!(block.nodes(), &[text("N1"), text("N2"), text("N3")]);
    }

    #[test]
    fn interleaved_calls() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder("1", &compiler);
        builder.add_node(text("a"));
        builder.add_parameter("item", "item");
        let item = builder.add_expression("item", "item").unwrap();
        builder.set_label("else");
        builder.add_node(text("b"));

        let block = builder.build();
        assert_eq!(block.id(), "1");
        assert_eq!(block.label(), "else");
        assert_eq!(block.parameter("item"), Some("item"));
        assert_eq!(*ident("item"), *block.expression("item").unwrap().kind());
        assert_eq!(block.expression("item"), Some(&item));
        assert_eq!(block.nodes(), &[text("a"), text("b")]);
    }

    #[test]
    fn injected_compiler() {
        let compiler = |src: &str| -> Result<Expression, ExpressionError> {
            match src {
                "ok" => Ok(Expression::new(42usize, src, num(42))),
                _ => Err(ExpressionError {
                    expr: src.to_string(),
                    offset: 0,
                    kind: ParseErrorKind::UnexpectedToken(src.to_string()),
                }),
            }
        };

        let mut builder = BlockBuilder::new(MAIN_BLOCK_ID, &compiler);
        let expression = builder.add_expression("value", "ok").unwrap();
        assert_eq!(expression.id(), 42usize.into());
        assert!(builder.add_expression("other", "nope").is_err());

        let block = builder.build();
        assert_eq!(block.expressions().keys().collect::<Vec<_>>(), vec!["value"]);
    }

    #[test]
    fn block_info_view() {
        let compiler = ExpressionCompiler::new();
        let mut builder = BlockModel::builder(MAIN_BLOCK_ID, &compiler);
        builder.add_parameter("iterable", "items");

        let info: &mut dyn BlockInfo = &mut builder;
        assert_eq!(info.label(), MAIN_BLOCK_ID);
        assert!(info.has_parameter("iterable"));
        assert!(!info.has_parameter("missing"));
        assert_eq!(info.parameter("iterable"), Some("items"));
        assert_eq!(info.parameter_or("missing", "fallback"), "fallback");

        let value = info.parameter_or("iterable", "").to_string();
        info.add_expression("iterable", &value).unwrap();

        let block = builder.build();
        assert_eq!(*ident("items"), *block.expression("iterable").unwrap().kind());
    }
}
