//! Command line and environment configuration
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `JIMAGE_PATH` | Module image to open, overrides `JAVA_HOME` |
//! | `JAVA_HOME` | Runtime home; the image is `$JAVA_HOME/lib/modules` |
//! | `RUST_LOG` | Log filter, overrides `-v`/`-q` |

use anyhow::{bail, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use jimage::{CatalogBuilder, DuplicatePolicy, ExtensionFilter, KeyStyle};
use std::env;
use std::path::PathBuf;

/// Environment variable naming the image path
pub const ENV_IMAGE_PATH: &str = "JIMAGE_PATH";

/// Environment variable naming the runtime home
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";

#[derive(Debug, Parser)]
#[command(name = "jimage-extract")]
#[command(version, about = "Catalog and extract resources from a Java runtime module image")]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the image header
    Info(ImageArgs),
    /// List catalog keys with their sizes
    List(ExtractArgs),
    /// Write every catalog entry below a directory
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Module image path [default: $JAVA_HOME/lib/modules]
    #[arg(short, long, env = ENV_IMAGE_PATH)]
    pub image: Option<PathBuf>,
}

impl ImageArgs {
    /// Explicit path, else the runtime home's image
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.image {
            return Ok(path.clone());
        }
        match env::var_os(ENV_JAVA_HOME) {
            Some(home) => Ok(PathBuf::from(home).join("lib").join("modules")),
            None => bail!("no image given: pass --image, or set {ENV_IMAGE_PATH} or {ENV_JAVA_HOME}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyStyleArg {
    /// package/name.extension
    Resource,
    /// /module/package/name.extension
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateArg {
    /// Keep the first entry for a key
    Reject,
    /// Keep the last entry for a key
    Overwrite,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Resource extension to select
    #[arg(short, long, default_value = "class", value_parser = parse_filter)]
    pub extension: ExtensionFilter,

    /// Only consider one module
    #[arg(short, long)]
    pub module: Option<String>,

    /// Catalog key format
    #[arg(long, value_enum, default_value_t = KeyStyleArg::Resource)]
    pub keys: KeyStyleArg,

    /// What to do when two entries share a key
    #[arg(long, value_enum, default_value_t = DuplicateArg::Reject)]
    pub duplicates: DuplicateArg,

    /// Stop after this many catalog entries
    #[arg(long)]
    pub limit: Option<usize>,
}

fn parse_filter(s: &str) -> Result<ExtensionFilter, String> {
    s.parse().map_err(|err: jimage::JImageError| err.to_string())
}

/// Fully resolved settings for one catalog build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub image_path: PathBuf,
    pub filter: ExtensionFilter,
    pub module: Option<String>,
    pub key_style: KeyStyle,
    pub duplicates: DuplicatePolicy,
    pub limit: Option<usize>,
}

impl ExtractArgs {
    pub fn resolve(self) -> Result<ExtractConfig> {
        Ok(ExtractConfig {
            image_path: self.image.resolve_path()?,
            filter: self.extension,
            module: self.module,
            key_style: match self.keys {
                KeyStyleArg::Resource => KeyStyle::Resource,
                KeyStyleArg::Module => KeyStyle::ModuleQualified,
            },
            duplicates: match self.duplicates {
                DuplicateArg::Reject => DuplicatePolicy::Reject,
                DuplicateArg::Overwrite => DuplicatePolicy::Overwrite,
            },
            limit: self.limit,
        })
    }
}

impl ExtractConfig {
    /// Catalog builder carrying these settings
    pub fn catalog_builder(&self) -> CatalogBuilder {
        let mut builder = CatalogBuilder::new(self.filter.clone())
            .with_key_style(self.key_style)
            .with_duplicate_policy(self.duplicates);
        if let Some(module) = &self.module {
            builder = builder.with_module(module.clone());
        }
        if let Some(limit) = self.limit {
            builder = builder.with_limit(limit);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults() {
        let cli = Cli::try_parse_from(["jimage-extract", "list", "--image", "/tmp/modules"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.image_path, PathBuf::from("/tmp/modules"));
        assert_eq!(config.filter, ExtensionFilter::Class);
        assert_eq!(config.key_style, KeyStyle::Resource);
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.module, None);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn extract_with_options() {
        let cli = Cli::try_parse_from([
            "jimage-extract",
            "-vv",
            "extract",
            "--image",
            "/opt/jdk/lib/modules",
            "--extension",
            ".Properties",
            "--module",
            "java.base",
            "--keys",
            "module",
            "--duplicates",
            "overwrite",
            "--limit",
            "10",
            "--out",
            "/tmp/out",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let Command::Extract { args, out } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(out, PathBuf::from("/tmp/out"));

        let config = args.resolve().unwrap();
        assert_eq!(config.filter, ExtensionFilter::Properties);
        assert_eq!(config.module.as_deref(), Some("java.base"));
        assert_eq!(config.key_style, KeyStyle::ModuleQualified);
        assert_eq!(config.duplicates, DuplicatePolicy::Overwrite);
        assert_eq!(config.limit, Some(10));
    }

    #[test]
    fn rejects_empty_extension() {
        let result = Cli::try_parse_from(["jimage-extract", "list", "--image", "m", "--extension", ""]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["jimage-extract", "-q", "-v", "info", "--image", "m"]);
        assert!(result.is_err());
    }
}
