use std::collections::HashMap;

use crate::blocks::{BlockInfo, MAIN_BLOCK_ID};
use crate::error::ParseErrorKind;

mod params;
pub(crate) mod parser;

/// Interprets the blocks of one kind of section.
///
/// The parser hands every block to the factory after its label and
/// parameters are known and before any of its content is parsed.
pub trait SectionFactory {
    /// Names given to the positional parameters of the main block, in order.
    fn parameters(&self) -> &[&'static str] {
        &[]
    }

    /// Labels that may start a new block inside this section.
    fn block_labels(&self) -> &[&'static str] {
        &[]
    }

    fn initialize_block(&self, block: &mut dyn BlockInfo) -> Result<(), ParseErrorKind>;
}

/// Section factories by name.
pub struct Sections {
    factories: HashMap<String, Box<dyn SectionFactory>>,
}

impl Sections {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// `if`, `each` and `let`
    pub fn with_defaults() -> Self {
        let mut sections = Self::empty();
        sections.register("if", IfSection);
        sections.register("each", EachSection);
        sections.register("let", LetSection);
        sections
    }

    /// Register a factory, replacing any factory with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: impl SectionFactory + 'static) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<&dyn SectionFactory> {
        self.factories.get(name).map(|factory| factory.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// -----------------------------------------------------------------------------
//   - If -
// -----------------------------------------------------------------------------
const OPERATORS: &[&str] = &[
    "&&", "||", "!", "==", "!=", ">", ">=", "<", "<=", "+", "-", "*", "/", "%", "and", "or", "eq", "ne", "gt", "ge",
    "lt", "le", "is",
];

/// `{#if a && b}..{:else if c}..{:else}..{/if}`
///
/// Every operand is compiled on its own, operators stay raw parameters.
/// The main block and `else if` blocks need at least one operand.
pub struct IfSection;

impl SectionFactory for IfSection {
    fn block_labels(&self) -> &[&'static str] {
        &["else"]
    }

    fn initialize_block(&self, block: &mut dyn BlockInfo) -> Result<(), ParseErrorKind> {
        let mut operands = block
            .parameters()
            .iter()
            .filter(|(_, value)| !OPERATORS.contains(&value.as_str()))
            .filter(|(name, _)| !(block.label() != MAIN_BLOCK_ID && name.as_str() == "if"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Vec<_>>();
        operands.sort();

        let conditional = block.label() == MAIN_BLOCK_ID || block.has_parameter("if");
        if conditional && operands.is_empty() {
            return Err(ParseErrorKind::MissingParameter("if"));
        }

        for (name, value) in operands {
            block.add_expression(&name, &value)?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
//   - Each -
// -----------------------------------------------------------------------------
/// `{#each items}..{:else}..{/each}`
pub struct EachSection;

impl EachSection {
    const ITERABLE: &'static str = "iterable";
}

impl SectionFactory for EachSection {
    fn parameters(&self) -> &[&'static str] {
        &["iterable"]
    }

    fn block_labels(&self) -> &[&'static str] {
        &["else"]
    }

    fn initialize_block(&self, block: &mut dyn BlockInfo) -> Result<(), ParseErrorKind> {
        if block.label() != MAIN_BLOCK_ID {
            return Ok(());
        }

        let iterable = match block.parameter(Self::ITERABLE) {
            Some(iterable) => iterable.to_string(),
            None => return Err(ParseErrorKind::MissingParameter(Self::ITERABLE)),
        };
        block.add_expression(Self::ITERABLE, &iterable)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
//   - Let -
// -----------------------------------------------------------------------------
/// `{#let name=item.name total=a+b}..{/let}`
pub struct LetSection;

impl SectionFactory for LetSection {
    fn initialize_block(&self, block: &mut dyn BlockInfo) -> Result<(), ParseErrorKind> {
        let mut bindings = block
            .parameters()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Vec<_>>();
        bindings.sort();

        for (name, value) in bindings {
            block.add_expression(&name, &value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::blocks::{BlockBuilder, BlockModel};
    use crate::expressions::ExpressionCompiler;

    fn builder<'c>(compiler: &'c ExpressionCompiler, label: &str, params: &[(&str, &str)]) -> BlockBuilder<'c> {
        let id = match label {
            MAIN_BLOCK_ID => MAIN_BLOCK_ID,
            _ => "1",
        };
        let mut builder = BlockModel::builder(id, compiler);
        builder.set_label(label);
        for (name, value) in params {
            builder.add_parameter(*name, *value);
        }
        builder
    }

    fn expression_keys(block: &BlockModel) -> HashSet<&str> {
        block.expressions().keys().map(String::as_str).collect()
    }

    #[test]
    fn defaults() {
        let sections = Sections::with_defaults();
        assert!(sections.contains("if"));
        assert!(sections.contains("each"));
        assert!(sections.contains("let"));
        assert!(sections.get("when").is_none());
    }

    #[test]
    fn register_replaces() {
        struct Noop;
        impl SectionFactory for Noop {
            fn block_labels(&self) -> &[&'static str] {
                &["case"]
            }

            fn initialize_block(&self, _: &mut dyn BlockInfo) -> Result<(), ParseErrorKind> {
                Ok(())
            }
        }

        let mut sections = Sections::with_defaults();
        sections.register("if", Noop);
        assert_eq!(sections.get("if").unwrap().block_labels(), &["case"]);
    }

    #[test]
    fn if_compiles_operands() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[("a", "a"), ("&&", "&&"), ("b.c", "b.c")]);
        IfSection.initialize_block(&mut block).unwrap();

        let block = block.build();
        assert_eq!(expression_keys(&block), HashSet::from(["a", "b.c"]));
        assert_eq!(block.parameters().len(), 3);
    }

    #[test]
    fn else_if_skips_keyword() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, "else", &[("if", "if"), ("ready", "ready")]);
        IfSection.initialize_block(&mut block).unwrap();
        assert_eq!(expression_keys(&block.build()), HashSet::from(["ready"]));
    }

    #[test]
    fn plain_else() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, "else", &[]);
        IfSection.initialize_block(&mut block).unwrap();
        assert!(block.build().expressions().is_empty());
    }

    #[test]
    fn arithmetic_operators_are_not_operands() {
        let compiler = ExpressionCompiler::new();
        let params = [("count", "count"), ("+", "+"), ("1", "1"), (">", ">"), ("2", "2")];
        let mut block = builder(&compiler, MAIN_BLOCK_ID, &params);
        IfSection.initialize_block(&mut block).unwrap();
        assert_eq!(expression_keys(&block.build()), HashSet::from(["count", "1", "2"]));
    }

    #[test]
    fn condition_required() {
        let compiler = ExpressionCompiler::new();

        let mut block = builder(&compiler, "else", &[("if", "if")]);
        let err = IfSection.initialize_block(&mut block).unwrap_err();
        assert_eq!(err, ParseErrorKind::MissingParameter("if"));

        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[("&&", "&&")]);
        let err = IfSection.initialize_block(&mut block).unwrap_err();
        assert_eq!(err, ParseErrorKind::MissingParameter("if"));
    }

    #[test]
    fn if_operand_error() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[("a[", "a[")]);
        let err = IfSection.initialize_block(&mut block).unwrap_err();
        assert!(matches!(err, ParseErrorKind::Expression(_)));
    }

    #[test]
    fn each_requires_iterable() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[]);
        let err = EachSection.initialize_block(&mut block).unwrap_err();
        assert_eq!(err, ParseErrorKind::MissingParameter("iterable"));

        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[("iterable", "items")]);
        EachSection.initialize_block(&mut block).unwrap();
        assert_eq!(expression_keys(&block.build()), HashSet::from(["iterable"]));

        let mut block = builder(&compiler, "else", &[]);
        EachSection.initialize_block(&mut block).unwrap();
    }

    #[test]
    fn let_compiles_every_binding() {
        let compiler = ExpressionCompiler::new();
        let mut block = builder(&compiler, MAIN_BLOCK_ID, &[("name", "item.name"), ("total", "a + b")]);
        LetSection.initialize_block(&mut block).unwrap();
        assert_eq!(expression_keys(&block.build()), HashSet::from(["name", "total"]));
    }
}
