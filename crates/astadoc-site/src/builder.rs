//! Incremental static site builder.
//!
//! Every `.md` file under the source directory becomes
//! `<output_dir>/<docname>.html`. Documents whose source, dependencies and
//! output are unchanged since the previous build are skipped; the rest are
//! rendered in parallel.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use astadoc_astah::{AstahConfig, AstahContext, AstahConverter};
use astadoc_cache::{FileStore, NullStore, Store};
use rayon::prelude::*;

use crate::env::{BuildEnv, mtime_stamp};
use crate::page::render_document;
use crate::scanner::{SourceDoc, scan};
use crate::template::{PageData, render_page};

/// Configuration for a site build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory containing the Markdown sources.
    pub source_dir: PathBuf,
    /// Directory the HTML pages are written to.
    pub output_dir: PathBuf,
    /// Build environment directory (`None` makes every build a full build).
    pub cache_dir: Option<PathBuf>,
    /// Converted diagram directory, relative to `output_dir`.
    pub image_dir: String,
    pub astah: AstahConfig,
    /// Cached state from a different version is ignored.
    pub version: String,
}

/// Error returned by the site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a build did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents not present in the previous build.
    pub added: Vec<String>,
    /// Documents rebuilt because their source, a dependency, the output or
    /// one of its images changed.
    pub changed: Vec<String>,
    /// Documents whose source disappeared; their output was deleted.
    pub removed: Vec<String>,
    pub unchanged: usize,
    /// Problems found while rendering, prefixed with the document name.
    pub warnings: Vec<String>,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} changed, {} removed",
            self.added.len(),
            self.changed.len(),
            self.removed.len()
        )
    }
}

/// A document that needs rendering in this build.
struct Outdated<'a> {
    doc: &'a SourceDoc,
    stamp: Option<String>,
}

/// Builds a static documentation site from a source directory.
pub struct SiteBuilder {
    config: BuildConfig,
    store: Box<dyn Store>,
    context: Arc<AstahContext>,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        let store: Box<dyn Store> = match &config.cache_dir {
            Some(dir) => Box::new(FileStore::new(dir.clone(), &config.version)),
            None => Box::new(NullStore),
        };
        let converter = AstahConverter::new(config.astah.clone());
        let context = Arc::new(AstahContext::new(
            converter,
            config.source_dir.clone(),
            config.output_dir.clone(),
            config.image_dir.clone(),
        ));
        Self {
            config,
            store,
            context,
        }
    }

    /// Build the site, rendering only outdated documents.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        if !self.config.source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(self.config.source_dir.clone()));
        }

        let env = BuildEnv::new(self.store.as_ref());
        let docs = scan(&self.config.source_dir);
        let previous: HashSet<String> = env.previous_docs().into_iter().collect();

        let mut report = BuildReport::default();
        let mut outdated = Vec::new();
        for doc in &docs {
            let stamp = mtime_stamp(&doc.path);
            if !previous.contains(&doc.docname) {
                report.added.push(doc.docname.clone());
            } else if stamp
                .as_deref()
                .is_some_and(|s| env.is_current(&doc.docname, s))
                && self.output_path(doc).exists()
            {
                tracing::debug!(doc = %doc.docname, "Page is up to date");
                report.unchanged += 1;
                continue;
            } else {
                report.changed.push(doc.docname.clone());
            }
            outdated.push(Outdated { doc, stamp });
        }

        let warnings = outdated
            .par_iter()
            .map(|page| self.build_page(page, &env))
            .collect::<Result<Vec<_>, _>>()?;
        report.warnings = warnings.into_iter().flatten().collect();

        let current: HashSet<&str> = docs.iter().map(|d| d.docname.as_str()).collect();
        let mut removed: Vec<String> = previous
            .into_iter()
            .filter(|name| !current.contains(name.as_str()))
            .collect();
        removed.sort();
        for docname in &removed {
            self.remove_page(docname)?;
            env.forget(docname);
        }
        report.removed = removed;

        let docnames: Vec<String> = docs.into_iter().map(|d| d.docname).collect();
        env.save_docs(&docnames);

        tracing::info!(
            output = %self.config.output_dir.display(),
            unchanged = report.unchanged,
            "Built site: {report}"
        );
        Ok(report)
    }

    fn output_path(&self, doc: &SourceDoc) -> PathBuf {
        self.config.output_dir.join(doc.page_url())
    }

    /// Render and write one page, returning its warnings.
    fn build_page(&self, page: &Outdated<'_>, env: &BuildEnv) -> Result<Vec<String>, BuildError> {
        let doc = page.doc;
        let rendered = render_document(doc, &self.context)?;

        let html = render_page(&PageData {
            title: rendered.title.as_deref().unwrap_or(&doc.docname),
            html_content: &rendered.html,
            toc: &rendered.toc,
        });
        let output = self.output_path(doc);
        write_file(&output, &html)?;
        tracing::debug!(doc = %doc.docname, path = %output.display(), "Wrote page");

        if let Some(stamp) = &page.stamp {
            env.record(
                &doc.docname,
                stamp,
                &rendered.dependencies,
                &rendered.outputs,
            );
        }

        Ok(rendered
            .warnings
            .into_iter()
            .map(|w| format!("{}: {w}", doc.docname))
            .collect())
    }

    fn remove_page(&self, docname: &str) -> Result<(), BuildError> {
        let path = self.config.output_dir.join(format!("{docname}.html"));
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(doc = docname, "Removed page");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BuildError::Io { path, source }),
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}
