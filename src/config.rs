//! Command-line configuration for the `exif-codec` binary.
//!
//! Every subcommand reads one input file, locates the metadata blob inside it
//! and decodes it. Options can also be supplied through environment variables
//! with the `EXIF_` prefix:
//!
//! - `EXIF_NTH` - Which metadata block in the file to use (default: 0)
//! - `EXIF_UNIVERSAL_SEARCH` - Resolve misplaced tags against every directory kind
//! - `EXIF_JSON` - Emit JSON instead of text (dump and gps)
//! - `EXIF_KEEP_TAGS` - Comma-separated IFD0 tag names kept by `strip`
//!   (default: Orientation)
//! - `EXIF_VERBOSE` - Enable debug logging
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use exif_codec::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! if let Command::Dump(config) = &cli.command {
//!     println!("Dumping {}", config.input.file.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::format::exif::ScanOptions;

// =============================================================================
// Default Values
// =============================================================================

/// Default metadata block index.
pub const DEFAULT_NTH: usize = 0;

/// Default IFD0 tags kept by `strip`.
pub const DEFAULT_KEEP_TAGS: &str = "Orientation";

/// Upper bound on `--nth`; files with more blocks than this are not real.
pub const MAX_NTH: usize = 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// exif-codec - Inspect and rewrite EXIF metadata.
///
/// Reads the EXIF/TIFF metadata blob embedded in an image file, prints its
/// tags, directory tree, GPS position or thumbnail, and can write back a
/// reduced copy of the blob.
#[derive(Parser, Debug, Clone)]
#[command(name = "exif-codec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false, env = "EXIF_VERBOSE")]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every tag in the blob.
    Dump(DumpConfig),

    /// Print the directory tree.
    Tree(TreeConfig),

    /// Print the GPS position.
    Gps(GpsConfig),

    /// Write the embedded thumbnail to a file.
    Thumbnail(ThumbnailConfig),

    /// Rebuild the blob keeping only selected IFD0 tags.
    Strip(StripConfig),
}

impl Command {
    /// Input options shared by every subcommand.
    pub fn input(&self) -> &InputArgs {
        match self {
            Command::Dump(c) => &c.input,
            Command::Tree(c) => &c.input,
            Command::Gps(c) => &c.input,
            Command::Thumbnail(c) => &c.input,
            Command::Strip(c) => &c.input,
        }
    }

    /// Validate the selected subcommand.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Dump(c) => c.input.validate(),
            Command::Tree(c) => c.input.validate(),
            Command::Gps(c) => c.input.validate(),
            Command::Thumbnail(c) => c.validate(),
            Command::Strip(c) => c.validate(),
        }
    }
}

// =============================================================================
// Shared Input Options
// =============================================================================

/// Where the blob comes from and how to scan it.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Image or raw metadata file to read.
    pub file: PathBuf,

    /// Use the N-th metadata block found in the file (0 = first).
    #[arg(long, default_value_t = DEFAULT_NTH, env = "EXIF_NTH")]
    pub nth: usize,

    /// Resolve tags found in the wrong directory against every directory kind.
    ///
    /// Some writers put tags in the wrong IFD. With this flag those tags are
    /// kept and reported instead of skipped, at the risk of misnaming a tag
    /// whose id is reused across kinds.
    #[arg(long, default_value_t = false, env = "EXIF_UNIVERSAL_SEARCH")]
    pub universal_search: bool,
}

impl InputArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.file.as_os_str().is_empty() {
            return Err("Input file is required".to_string());
        }
        if self.nth > MAX_NTH {
            return Err(format!("nth must be at most {}", MAX_NTH));
        }
        Ok(())
    }

    /// Scanner options selected on the command line.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            universal_search: self.universal_search,
        }
    }
}

// =============================================================================
// Subcommand Options
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct DumpConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print tags as a JSON array.
    #[arg(long, default_value_t = false, env = "EXIF_JSON")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeConfig {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GpsConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print GPS information as JSON.
    #[arg(long, default_value_t = false, env = "EXIF_JSON")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ThumbnailConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the thumbnail bytes.
    #[arg(short, long)]
    pub output: PathBuf,
}

impl ThumbnailConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        validate_output(&self.input, &self.output)
    }
}

#[derive(Args, Debug, Clone)]
pub struct StripConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the rebuilt blob.
    #[arg(short, long)]
    pub output: PathBuf,

    /// IFD0 tag names to keep (comma-separated).
    #[arg(
        long,
        default_value = DEFAULT_KEEP_TAGS,
        env = "EXIF_KEEP_TAGS",
        value_delimiter = ','
    )]
    pub keep: Vec<String>,
}

impl StripConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        validate_output(&self.input, &self.output)?;

        if self.keep.iter().all(|name| name.trim().is_empty()) {
            return Err("At least one tag name must be given to --keep".to_string());
        }

        Ok(())
    }

    /// Tag names with surrounding whitespace and empty items removed.
    pub fn keep_names(&self) -> Vec<&str> {
        self.keep
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn validate_output(input: &InputArgs, output: &Path) -> Result<(), String> {
    if output.as_os_str().is_empty() {
        return Err("Output path is required".to_string());
    }
    if output == input.file.as_path() {
        return Err("Output path must differ from the input file".to_string());
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
