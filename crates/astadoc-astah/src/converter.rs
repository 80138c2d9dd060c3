//! Conversion of `.asta` sheets to PNG through `astah-command`.
//!
//! The tool exports every sheet of a diagram file into
//! `<out>/<file stem>/<sheet title>.png`. [`AstahConverter`] runs it in a
//! scratch directory, picks the requested sheet and copies it to the cache
//! path. The copy gets the source's modification time, so it stays valid
//! until the diagram changes.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

/// Install locations probed when no command path is configured.
#[cfg(target_os = "macos")]
const PLATFORM_PATTERNS: &[&str] = &["/Applications/astah*/astah-command.sh"];
#[cfg(target_os = "windows")]
const PLATFORM_PATTERNS: &[&str] = &["C:/Program Files/astah-*/astah-commandw.exe"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_PATTERNS: &[&str] = &[
    "/usr/lib/astah*/astah-command.sh",
    "/opt/astah*/astah-command.sh",
];

/// Converter settings.
#[derive(Debug, Clone)]
pub struct AstahConfig {
    /// Tool to run. When unset, `search_patterns` are probed.
    pub command_path: Option<PathBuf>,
    /// Glob patterns of install locations, tried in order.
    pub search_patterns: Vec<String>,
}

impl Default for AstahConfig {
    fn default() -> Self {
        Self {
            command_path: None,
            search_patterns: PLATFORM_PATTERNS.iter().map(|&p| p.to_owned()).collect(),
        }
    }
}

impl AstahConfig {
    /// Settings with an explicit tool path (or platform discovery for `None`).
    #[must_use]
    pub fn with_command_path(command_path: Option<PathBuf>) -> Self {
        Self {
            command_path,
            ..Self::default()
        }
    }
}

/// What a successful conversion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// The cached image was current; nothing ran.
    UpToDate,
    /// The tool ran and the cached image was replaced.
    Regenerated,
}

/// Conversion failure.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("astah-command not found; set astah.command_path in astadoc.toml")]
    CommandNotFound,

    #[error("astah-command failed ({})", describe_exit(.code))]
    ExitStatus { code: Option<i32> },

    #[error("cannot run {}: {source}", .command.display())]
    Spawn {
        command: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown sheet [{0}]")]
    UnknownSheet(String),

    #[error("no images exported to {}", .0.display())]
    NoImages(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_owned(),
        |code| format!("exit code: {code}"),
    )
}

/// Whether the image at `target` must be regenerated from `source`.
///
/// A missing source is never outdated, so a stale image is left alone
/// rather than removed. A missing target, or one older than the source, is
/// outdated.
#[must_use]
pub fn is_outdated(source: &Path, target: &Path) -> bool {
    let Ok(source_modified) = fs::metadata(source).and_then(|m| m.modified()) else {
        return false;
    };
    match fs::metadata(target).and_then(|m| m.modified()) {
        Ok(target_modified) => target_modified < source_modified,
        Err(_) => true,
    }
}

/// Runs `astah-command` and maintains converted images.
///
/// Holds no mutable state; share it between threads behind an `Arc`.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use astadoc_astah::{AstahConfig, AstahConverter};
///
/// let converter = AstahConverter::new(AstahConfig::default());
/// let ok = converter.convert(
///     Path::new("docs/model.asta"),
///     Path::new("_build/html/_images/astah-0b1c.png"),
///     Some("Class Diagram"),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct AstahConverter {
    config: AstahConfig,
}

impl AstahConverter {
    #[must_use]
    pub fn new(config: AstahConfig) -> Self {
        Self { config }
    }

    /// The tool to run: the configured path, else the first existing
    /// match of the search patterns.
    #[must_use]
    pub fn command_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.command_path {
            return Some(path.clone());
        }

        for pattern in &self.config.search_patterns {
            let paths = match glob::glob(pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::debug!(pattern = %pattern, error = %e, "Invalid search pattern");
                    continue;
                }
            };
            if let Some(path) = paths.flatten().find(|p| p.exists()) {
                return Some(path);
            }
        }
        None
    }

    /// Export every sheet of `source` into `out_dir`.
    pub fn extract(&self, source: &Path, out_dir: &Path) -> Result<(), ConvertError> {
        let command = self.command_path().ok_or(ConvertError::CommandNotFound)?;

        let output = Command::new(&command)
            .args(["-image", "all", "-f"])
            .arg(source)
            .arg("-o")
            .arg(out_dir)
            .output()
            .map_err(|source| ConvertError::Spawn {
                command: command.clone(),
                source,
            })?;

        tracing::debug!(
            command = %command.display(),
            stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
            "astah-command finished"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(ConvertError::ExitStatus {
                code: output.status.code(),
            })
        }
    }

    /// Bring `target` up to date with one sheet of `source`.
    ///
    /// Returns `true` when the image is current afterwards. Failures are
    /// logged as warnings and return `false`; `target` is then left as it was.
    pub fn convert(&self, source: &Path, target: &Path, sheet: Option<&str>) -> bool {
        match self.try_convert(source, target, sheet) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    source = %source.display(),
                    sheet = sheet.unwrap_or_default(),
                    error = %e,
                    "Failed to convert Astah diagram"
                );
                false
            }
        }
    }

    /// [`convert`](Self::convert) with the outcome and error exposed.
    ///
    /// Without a sheet the first image exported for the file is used, taking
    /// directory entries in lexicographic order, depth first.
    pub fn try_convert(
        &self,
        source: &Path,
        target: &Path,
        sheet: Option<&str>,
    ) -> Result<Conversion, ConvertError> {
        if !is_outdated(source, target) {
            tracing::debug!(target = %target.display(), "Astah image up to date");
            return Ok(Conversion::UpToDate);
        }

        // Removed on drop, whatever happens below.
        let scratch = tempfile::Builder::new().prefix("astadoc-astah-").tempdir()?;
        self.extract(source, scratch.path())?;

        let stem = source.file_stem().unwrap_or(source.as_os_str());
        let image_dir = scratch.path().join(stem);
        let images = list_pngs(&image_dir)?;

        let image = match sheet.filter(|s| !s.is_empty()) {
            Some(sheet) => images
                .into_iter()
                .find(|p| p.file_stem().is_some_and(|s| s == sheet))
                .ok_or_else(|| ConvertError::UnknownSheet(sheet.to_owned()))?,
            None => images
                .into_iter()
                .next()
                .ok_or_else(|| ConvertError::NoImages(image_dir.clone()))?,
        };

        let modified = fs::metadata(source)?.modified()?;
        install_image(&image, target, modified)?;

        tracing::info!(
            source = %source.display(),
            target = %target.display(),
            "Regenerated Astah image"
        );
        Ok(Conversion::Regenerated)
    }
}

/// Copy `image` to `target` with modification time `modified`.
///
/// The copy is written next to the target and renamed over it once
/// complete, so a failed copy never leaves a partial image that looks fresh.
fn install_image(image: &Path, target: &Path, modified: SystemTime) -> io::Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    io::copy(&mut File::open(image)?, tmp.as_file_mut())?;
    fs::set_permissions(tmp.path(), fs::metadata(image)?.permissions())?;
    tmp.as_file().set_modified(modified)?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// PNG files under `dir`, entries sorted by name at each level, depth first.
/// A missing directory has none.
fn list_pngs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    match collect_pngs(dir, &mut found) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(found),
        result => result.map(|()| found),
    }
}

fn collect_pngs(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_pngs(&path, found)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        {
            found.push(path);
        }
    }
    Ok(())
}
