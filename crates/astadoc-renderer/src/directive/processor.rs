//! Directive processor.
//!
//! Runs before pulldown-cmark (directive lines to placeholders) and after
//! rendering (placeholders to final HTML).

use std::path::{Path, PathBuf};

use super::fence::FenceTracker;
use super::parser::{ParsedDirective, parse_line};
use super::{
    ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput, LeafDirective,
    Replacements,
};

/// Where a document lives, for resolving directive references.
#[derive(Debug, Clone)]
pub struct DirectiveProcessorConfig {
    /// Directory relative references are resolved against.
    pub base_dir: PathBuf,
    /// The document itself, if it came from a file.
    pub source_path: Option<PathBuf>,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
        }
    }
}

impl DirectiveProcessorConfig {
    /// Config for the document at `source_path`, resolving against its directory.
    #[must_use]
    pub fn for_document(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let base_dir = source_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            base_dir,
            source_path: Some(source_path),
        }
    }

    fn context(&self, line: usize) -> DirectiveContext<'_> {
        DirectiveContext {
            source_path: self.source_path.as_deref(),
            base_dir: &self.base_dir,
            line,
        }
    }
}

/// How an open container will be closed.
enum OpenContainer {
    /// Handled; call `end` on this handler.
    Handler(usize),
    /// Unknown or declined; keep the closing line as written.
    Verbatim,
    /// Failed to open; the closing line produces nothing.
    Dropped,
}

/// Dispatches directive lines of one document to registered handlers.
///
/// Lines inside fenced code blocks are never treated as directives.
/// Unknown directives are left as written.
pub struct DirectiveProcessor {
    config: DirectiveProcessorConfig,
    leaf_handlers: Vec<Box<dyn LeafDirective>>,
    container_handlers: Vec<Box<dyn ContainerDirective>>,
    open: Vec<OpenContainer>,
    warnings: Vec<String>,
}

impl DirectiveProcessor {
    #[must_use]
    pub fn new(config: DirectiveProcessorConfig) -> Self {
        Self {
            config,
            leaf_handlers: Vec::new(),
            container_handlers: Vec::new(),
            open: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Register a leaf directive handler.
    #[must_use]
    pub fn with_leaf<D: LeafDirective + 'static>(mut self, handler: D) -> Self {
        self.leaf_handlers.push(Box::new(handler));
        self
    }

    /// Register a container directive handler.
    #[must_use]
    pub fn with_container<D: ContainerDirective + 'static>(mut self, handler: D) -> Self {
        self.container_handlers.push(Box::new(handler));
        self
    }

    /// Rewrite directive lines of `input`; everything else is copied as is.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let mut fence = FenceTracker::new();
        let mut output = String::with_capacity(input.len());

        for (idx, raw) in input.split_inclusive('\n').enumerate() {
            let (line, newline) = match raw.strip_suffix('\n') {
                Some(line) => (line.strip_suffix('\r').unwrap_or(line), "\n"),
                None => (raw, ""),
            };

            if fence.feed(line) {
                output.push_str(line);
            } else {
                match parse_line(line) {
                    Some(directive) => {
                        let replaced = self.dispatch(directive, line, idx + 1);
                        output.push_str(&replaced);
                    }
                    None => output.push_str(line),
                }
            }
            output.push_str(newline);
        }

        for _ in self.open.drain(..) {
            self.warnings
                .push("unclosed container directive (missing closing :::)".to_owned());
        }

        output
    }

    fn dispatch(&mut self, directive: ParsedDirective, line: &str, line_num: usize) -> String {
        match directive {
            ParsedDirective::Leaf { name, args } => self.dispatch_leaf(&name, args, line, line_num),
            ParsedDirective::ContainerStart { name, args } => {
                self.dispatch_start(&name, args, line, line_num)
            }
            ParsedDirective::ContainerEnd => self.dispatch_end(line, line_num),
        }
    }

    fn dispatch_leaf(
        &mut self,
        name: &str,
        args: DirectiveArgs,
        line: &str,
        line_num: usize,
    ) -> String {
        let Some(handler) = self.leaf_handlers.iter_mut().find(|h| h.name() == name) else {
            return line.to_owned();
        };

        match handler.process(args, &self.config.context(line_num)) {
            DirectiveOutput::Html(html) => html,
            DirectiveOutput::Error(message) => {
                self.warnings.push(format!("line {line_num}: {message}"));
                String::new()
            }
            DirectiveOutput::Skip => line.to_owned(),
        }
    }

    fn dispatch_start(
        &mut self,
        name: &str,
        args: DirectiveArgs,
        line: &str,
        line_num: usize,
    ) -> String {
        let Some(idx) = self.container_handlers.iter().position(|h| h.name() == name) else {
            self.open.push(OpenContainer::Verbatim);
            return line.to_owned();
        };

        match self.container_handlers[idx].start(args, &self.config.context(line_num)) {
            DirectiveOutput::Html(html) => {
                self.open.push(OpenContainer::Handler(idx));
                html
            }
            DirectiveOutput::Error(message) => {
                self.warnings.push(format!("line {line_num}: {message}"));
                self.open.push(OpenContainer::Dropped);
                String::new()
            }
            DirectiveOutput::Skip => {
                self.open.push(OpenContainer::Verbatim);
                line.to_owned()
            }
        }
    }

    fn dispatch_end(&mut self, line: &str, line_num: usize) -> String {
        match self.open.pop() {
            Some(OpenContainer::Handler(idx)) => self.container_handlers[idx]
                .end(line_num)
                .unwrap_or_default(),
            Some(OpenContainer::Verbatim) => line.to_owned(),
            Some(OpenContainer::Dropped) => String::new(),
            None => {
                self.warnings.push(format!(
                    "line {line_num}: stray ::: with no opening directive"
                ));
                line.to_owned()
            }
        }
    }

    /// Substitute every placeholder emitted during [`process`](Self::process).
    pub fn post_process(&mut self, html: &mut String) {
        let mut replacements = Replacements::new();
        for handler in &mut self.leaf_handlers {
            handler.post_process(&mut replacements);
        }
        for handler in &mut self.container_handlers {
            handler.post_process(&mut replacements);
        }
        replacements.apply(html);
    }

    /// Warnings from the processor and all handlers.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let handler_warnings = self
            .leaf_handlers
            .iter()
            .flat_map(|h| h.warnings())
            .chain(self.container_handlers.iter().flat_map(|h| h.warnings()));
        self.warnings
            .iter()
            .chain(handler_warnings)
            .cloned()
            .collect()
    }

    /// Files referenced by handled directives, deduplicated, in first-seen order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<PathBuf> {
        dedup(
            self.leaf_handlers
                .iter()
                .flat_map(|h| h.dependencies())
                .chain(self.container_handlers.iter().flat_map(|h| h.dependencies())),
        )
    }

    /// Files generated by handled directives, deduplicated, in first-seen order.
    #[must_use]
    pub fn outputs(&self) -> Vec<PathBuf> {
        dedup(
            self.leaf_handlers
                .iter()
                .flat_map(|h| h.outputs())
                .chain(self.container_handlers.iter().flat_map(|h| h.outputs())),
        )
    }
}

fn dedup<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for path in paths {
        if !out.contains(path) {
            out.push(path.clone());
        }
    }
    out
}
