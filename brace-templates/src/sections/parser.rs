use std::mem;

use super::params::{named_param, split_params};
use super::{SectionFactory, Sections};
use crate::blocks::{BlockBuilder, BlockModel, MAIN_BLOCK_ID};
use crate::config::ParserConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::expressions::CompileExpression;
use crate::nodes::{ExpressionNode, Node, SectionNode, TextNode};

// -----------------------------------------------------------------------------
//     - Open section -
// -----------------------------------------------------------------------------
struct OpenSection<'src, 'c> {
    name: &'src str,
    factory: &'c dyn SectionFactory,
    start: usize,
    blocks: Vec<BlockModel>,
    current: BlockBuilder<'c>,
}

// -----------------------------------------------------------------------------
//     - Parser -
// -----------------------------------------------------------------------------
pub(crate) struct Parser<'src, 'c> {
    src: &'src str,
    pos: usize,
    text_start: usize,
    text: String,
    compiler: &'c dyn CompileExpression,
    sections: &'c Sections,
    config: &'c ParserConfig,
    root: Vec<Node>,
    open: Vec<OpenSection<'src, 'c>>,
    next_block_id: usize,
    // End of a line being removed whose remaining tags are not consumed yet
    standalone_line_end: Option<usize>,
}

impl<'src, 'c> Parser<'src, 'c> {
    pub(crate) fn new(
        src: &'src str,
        compiler: &'c dyn CompileExpression,
        sections: &'c Sections,
        config: &'c ParserConfig,
    ) -> Self {
        Self {
            src,
            pos: 0,
            text_start: 0,
            text: String::new(),
            compiler,
            sections,
            config,
            root: Vec::new(),
            open: Vec::new(),
            next_block_id: 1,
            standalone_line_end: None,
        }
    }

    fn error(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(offset, self.src, kind)
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Node>, ParseError> {
        let src = self.src;

        while let Some(index) = src[self.pos..].find('{') {
            let start = self.pos + index;

            // A brace followed by whitespace (or nothing) is plain text
            match src[start + 1..].chars().next() {
                None => break,
                Some(c) if c.is_whitespace() || c == '}' => {
                    self.pos = start + 1;
                    continue;
                }
                Some('!') => {
                    let end = match src[start + 2..].find("!}") {
                        Some(i) => start + 2 + i + 2,
                        None => return Err(self.error(start, ParseErrorKind::UnterminatedComment)),
                    };
                    self.consume_tag(start, end);
                    continue;
                }
                Some(_) => {}
            }

            let close = self
                .tag_end(start)
                .ok_or_else(|| self.error(start, ParseErrorKind::UnterminatedTag))?;
            let content = &src[start + 1..close];
            let end = close + 1;

            match content.as_bytes()[0] {
                b'#' => {
                    self.consume_tag(start, end);
                    self.flush_text();
                    self.open_section(start, &content[1..])?;
                }
                b':' => {
                    self.consume_tag(start, end);
                    self.flush_text();
                    self.start_block(start, &content[1..])?;
                }
                b'/' => {
                    self.consume_tag(start, end);
                    self.flush_text();
                    self.close_section(start, content[1..].trim())?;
                }
                _ => {
                    self.push_text(&src[self.text_start..start]);
                    self.flush_text();
                    self.pos = end;
                    self.text_start = end;
                    self.expression(start, content)?;
                }
            }
        }

        self.push_text(&src[self.text_start..]);
        self.flush_text();

        if let Some(open) = self.open.last() {
            return Err(self.error(open.start, ParseErrorKind::UnterminatedSection(open.name.to_string())));
        }

        Ok(self.root)
    }

    // Index of the `}` closing the tag opened at `start`.
    fn tag_end(&self, start: usize) -> Option<usize> {
        tag_close(&self.src[start + 1..]).map(|index| start + 1 + index)
    }

    // Move past a non-output tag, collecting the text in front of it.
    // A line holding nothing but non-output tags and whitespace is dropped,
    // line break included.
    fn consume_tag(&mut self, start: usize, end: usize) {
        let src = self.src;
        let line_start = src[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = src[end..].find('\n').map(|i| end + i + 1).unwrap_or(src.len());

        let continued = self.standalone_line_end == Some(line_end);
        let standalone = continued
            || (self.config.remove_standalone_lines
                && line_start >= self.text_start
                && src[line_start..start].trim().is_empty()
                && only_tags(&src[end..line_end]));

        if !standalone {
            self.push_text(&src[self.text_start..start]);
            self.pos = end;
            self.text_start = end;
            return;
        }

        if !continued {
            self.push_text(&src[self.text_start..line_start]);
        }

        let next = match src[end..line_end].trim().is_empty() {
            true => {
                self.standalone_line_end = None;
                line_end
            }
            false => {
                self.standalone_line_end = Some(line_end);
                end
            }
        };
        self.pos = next;
        self.text_start = next;
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = mem::take(&mut self.text);
        self.push_node(TextNode::new(text).into());
    }

    fn push_node(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(open) => {
                open.current.add_node(node);
            }
            None => self.root.push(node),
        }
    }

    fn expression(&mut self, start: usize, content: &str) -> Result<(), ParseError> {
        let lead = content.len() - content.trim_start().len();
        let expression = self
            .compiler
            .compile(content)
            .map_err(|err| self.error(start + 1 + lead + err.offset, err.into()))?;
        self.push_node(ExpressionNode::new(expression).into());
        Ok(())
    }

    fn open_section(&mut self, start: usize, content: &'src str) -> Result<(), ParseError> {
        let (content, self_closing) = match content.trim_end().strip_suffix('/') {
            Some(content) => (content, true),
            None => (content, false),
        };

        let params = split_params(content);
        let Some((&name, params)) = params.split_first() else {
            return Err(self.error(start, ParseErrorKind::MissingSectionName));
        };

        let sections = self.sections;
        let factory = sections
            .get(name)
            .ok_or_else(|| self.error(start, ParseErrorKind::UnknownSection(name.to_string())))?;

        let mut block = BlockBuilder::new(MAIN_BLOCK_ID, self.compiler);
        add_parameters(&mut block, factory.parameters(), params);
        factory
            .initialize_block(&mut block)
            .map_err(|kind| self.error(start, kind))?;

        log::debug!("open section `{name}` at {start}");

        if self_closing {
            self.push_node(SectionNode::new(name, vec![block.build()]).into());
            return Ok(());
        }

        self.open.push(OpenSection {
            name,
            factory,
            start,
            blocks: Vec::new(),
            current: block,
        });

        Ok(())
    }

    fn start_block(&mut self, start: usize, content: &str) -> Result<(), ParseError> {
        let params = split_params(content);
        let (label, params) = match params.split_first() {
            Some((&label, params)) => (label, params),
            None => ("", &[][..]),
        };

        let Some(mut open) = self.open.pop() else {
            return Err(self.error(start, ParseErrorKind::UnexpectedLabel(label.to_string())));
        };

        if !open.factory.block_labels().contains(&label) {
            let kind = ParseErrorKind::InvalidLabel {
                section: open.name.to_string(),
                label: label.to_string(),
            };
            return Err(self.error(start, kind));
        }

        let id = self.next_block_id.to_string();
        self.next_block_id += 1;

        let mut block = BlockBuilder::new(id, self.compiler);
        block.set_label(label);
        add_parameters(&mut block, &[], params);
        open.factory
            .initialize_block(&mut block)
            .map_err(|kind| self.error(start, kind))?;

        let previous = mem::replace(&mut open.current, block);
        open.blocks.push(previous.build());
        self.open.push(open);

        Ok(())
    }

    fn close_section(&mut self, start: usize, name: &str) -> Result<(), ParseError> {
        let Some(mut open) = self.open.pop() else {
            return Err(self.error(start, ParseErrorKind::UnexpectedEndTag(name.to_string())));
        };

        if name.is_empty() && self.config.strict_end_tags {
            return Err(self.error(start, ParseErrorKind::MissingSectionName));
        }

        if !name.is_empty() && name != open.name {
            let kind = ParseErrorKind::MismatchedEndTag {
                expected: open.name.to_string(),
                found: name.to_string(),
            };
            return Err(self.error(start, kind));
        }

        open.blocks.push(open.current.build());
        log::debug!("close section `{}` with {} block(s)", open.name, open.blocks.len());
        self.push_node(SectionNode::new(open.name, open.blocks).into());

        Ok(())
    }
}

// Index of the `}` closing a tag, `src` starts right after the opening brace.
// Quoted strings and nested braces (map literals) are skipped.
fn tag_close(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut chars = src.char_indices();

    while let Some((index, c)) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                let _ = chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') if depth == 0 => return Some(index),
            (None, '}') => depth -= 1,
            _ => {}
        }
    }

    None
}

// True if `rest` holds only whitespace and section, label, end or comment tags.
fn only_tags(mut rest: &str) -> bool {
    loop {
        rest = rest.trim_start();
        let Some(tag) = rest.strip_prefix('{') else {
            return rest.is_empty();
        };

        let end = match tag.chars().next() {
            Some('!') => tag[1..].find("!}").map(|i| 1 + i + 2),
            Some('#' | ':' | '/') => tag_close(tag).map(|i| i + 1),
            _ => None,
        };

        match end {
            Some(end) => rest = &tag[end..],
            None => return false,
        }
    }
}

// Named parameters keep their key. Positional parameters take the declared
// names in order, anything beyond that is keyed by its own text.
fn add_parameters(block: &mut BlockBuilder<'_>, declared: &[&'static str], params: &[&str]) {
    let mut declared = declared.iter();
    for param in params {
        match named_param(param) {
            Some((name, value)) => block.add_parameter(name, value),
            None => match declared.next() {
                Some(name) => block.add_parameter(*name, *param),
                None => block.add_parameter(*param, *param),
            },
        };
    }
}
