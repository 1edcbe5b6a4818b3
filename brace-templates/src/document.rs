use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::expressions::{Expression, ExpressionCompiler};
use crate::nodes::{Node, TemplateNode};
use crate::sections::parser::Parser;
use crate::sections::{SectionFactory, Sections};

/// A template source together with the sections it may use.
/// ```
/// # use brace_templates::Document;
/// let doc = Document::new("{#if ready}go{:else}wait{/if}");
/// let template = doc.compile().unwrap();
/// assert_eq!(template.nodes().len(), 1);
/// ```
pub struct Document {
    template: String,
    compiler: ExpressionCompiler,
    sections: Sections,
    config: ParserConfig,
}

impl Document {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            compiler: ExpressionCompiler::new(),
            sections: Sections::with_defaults(),
            config: ParserConfig::default(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let template = read_to_string(path)?;
        Ok(Self::new(template))
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Make a section available to the template.
    /// Registering an existing name replaces the built-in.
    pub fn register_section(&mut self, name: impl Into<String>, factory: impl SectionFactory + 'static) {
        self.sections.register(name, factory);
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn compile(&self) -> Result<Template> {
        let parser = Parser::new(&self.template, &self.compiler, &self.sections, &self.config);
        let nodes = parser.parse()?;
        log::debug!("compiled template: {} root node(s)", nodes.len());
        Ok(Template { nodes: nodes.into() })
    }
}

/// A compiled document
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Arc<[Node]>,
}

impl Template {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every expression used anywhere in the template
    pub fn collect_expressions(&self) -> HashSet<Expression> {
        self.nodes.iter().flat_map(|node| node.collect_expressions()).collect()
    }
}
