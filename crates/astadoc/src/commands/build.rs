//! `astadoc build` command implementation.

use std::path::PathBuf;

use astadoc_astah::AstahConfig;
use astadoc_config::{CliSettings, Config};
use astadoc_site::{BuildConfig, SiteBuilder};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover astadoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to the astah-command executable (overrides config).
    #[arg(long, env = "ASTAH_COMMAND")]
    astah_command: Option<PathBuf>,

    /// Disable the build cache; every page is rebuilt.
    #[arg(long)]
    pub no_cache: bool,

    /// Enable verbose output (conversion and build logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            command_path: self.astah_command.clone(),
            cache_enabled: self.no_cache.then_some(false),
        }
    }

    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let build_config = build_config(&config, version);
        output.info(&format!("Source: {}", build_config.source_dir.display()));
        output.info(&format!("Output: {}", build_config.output_dir.display()));

        let report = SiteBuilder::new(build_config).build()?;

        for warning in &report.warnings {
            output.warning(warning);
        }
        output.success(&format!("Build finished: {report}"));
        Ok(())
    }
}

fn build_config(config: &Config, version: &str) -> BuildConfig {
    let docs = &config.docs_resolved;
    BuildConfig {
        source_dir: docs.source_dir.clone(),
        output_dir: docs.output_dir.clone(),
        cache_dir: docs.cache_enabled.then(|| docs.cache_dir()),
        image_dir: config.astah_resolved.image_dir.clone(),
        astah: AstahConfig::with_command_path(config.astah_resolved.command_path.clone()),
        version: version.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> BuildArgs {
        BuildArgs {
            config: None,
            source_dir: Some(PathBuf::from("/project/docs")),
            output_dir: Some(PathBuf::from("/project/site")),
            astah_command: None,
            no_cache: false,
            verbose: false,
        }
    }

    #[test]
    fn no_cache_overrides_config() {
        let mut args = args();
        assert_eq!(args.cli_settings().cache_enabled, None);
        args.no_cache = true;
        assert_eq!(args.cli_settings().cache_enabled, Some(false));
    }

    #[test]
    fn astah_command_is_passed_through() {
        let mut args = args();
        args.astah_command = Some(PathBuf::from("/opt/astah/astah-command.sh"));
        let settings = args.cli_settings();
        assert_eq!(
            settings.command_path.as_deref(),
            Some(std::path::Path::new("/opt/astah/astah-command.sh"))
        );
        assert_eq!(settings.source_dir, Some(PathBuf::from("/project/docs")));
    }
}
