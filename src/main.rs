//! exif-codec - Inspect and rewrite EXIF metadata from the command line.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exif_codec::{
    collect,
    config::{Cli, Command, DumpConfig, GpsConfig, InputArgs, StripConfig, ThumbnailConfig},
    encode_to_blob, search_file_and_extract_nth, Builder, DirectoryIndex, DirectoryKind,
    DirectoryNode, ExifError, TagRegistry,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Dump(config) => run_dump(config),
        Command::Tree(config) => run_tree(&config.input),
        Command::Gps(config) => run_gps(config),
        Command::Thumbnail(config) => run_thumbnail(config),
        Command::Strip(config) => run_strip(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "exif_codec=debug"
    } else {
        "exif_codec=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Loading
// =============================================================================

/// Locate and decode the selected metadata block of the input file.
fn load(input: &InputArgs) -> Result<DirectoryIndex, ExifError> {
    let blob = search_file_and_extract_nth(&input.file, input.nth)?;
    debug!(
        file = %input.file.display(),
        nth = input.nth,
        size = blob.len(),
        "Extracted metadata blob"
    );

    let (header, index) = collect(blob, TagRegistry::standard(), input.scan_options())?;
    debug!(
        byte_order = header.byte_order.name(),
        first_ifd_offset = header.first_ifd_offset,
        directories = index.len(),
        furthest_offset = index.furthest_offset(),
        "Decoded metadata"
    );

    for unknown in index.unknown_tags() {
        match &unknown.matched_path {
            Some(matched) => warn!(
                "Tag 0x{:04x} in {} is registered under {}",
                unknown.tag_id, unknown.path, matched
            ),
            None => warn!("Tag 0x{:04x} in {} is not registered", unknown.tag_id, unknown.path),
        }
    }

    Ok(index)
}

fn root_node(index: &DirectoryIndex) -> Result<DirectoryNode<'_>, ExifError> {
    index
        .root()
        .ok_or_else(|| ExifError::DirectoryNotFound(DirectoryKind::Primary.path()))
}

// =============================================================================
// Commands
// =============================================================================

fn run_dump(config: &DumpConfig) -> Result<(), Box<dyn Error>> {
    let index = load(&config.input)?;
    let records = root_node(&index)?.tag_records()?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for record in &records {
        println!(
            "{:<16} 0x{:04x} {:<32} [{}] ({}) {}",
            record.path,
            record.tag_id,
            record.tag_name,
            record.tag_type,
            record.unit_count,
            record.value
        );
    }
    info!("{} tag(s) in {} directories", records.len(), index.len());
    Ok(())
}

fn run_tree(input: &InputArgs) -> Result<(), Box<dyn Error>> {
    let index = load(input)?;
    for line in root_node(&index)?.dump_tree()? {
        println!("{}", line);
    }
    Ok(())
}

fn run_gps(config: &GpsConfig) -> Result<(), Box<dyn Error>> {
    let index = load(&config.input)?;
    let gps = index.gps_info()?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&gps)?);
    } else {
        println!("{}", gps);
        println!("Latitude:  {}", gps.latitude);
        println!("Longitude: {}", gps.longitude);
    }
    Ok(())
}

fn run_thumbnail(config: &ThumbnailConfig) -> Result<(), Box<dyn Error>> {
    let index = load(&config.input)?;
    let thumbnail = index.thumbnail()?;

    std::fs::write(&config.output, thumbnail)?;
    info!(
        "Wrote {} byte thumbnail to {}",
        thumbnail.len(),
        config.output.display()
    );
    Ok(())
}

fn run_strip(config: &StripConfig) -> Result<(), Box<dyn Error>> {
    let index = load(&config.input)?;
    let root = root_node(&index)?;
    let registry = index.registry();

    let mut keep = Vec::new();
    for name in config.keep_names() {
        keep.push(registry.get_by_name(DirectoryKind::Primary, name)?.id);
    }

    let mut builder = Builder::new_with_existing(root, Arc::clone(registry));
    builder.add_tags_from_existing(root, Some(keep.as_slice()), None)?;
    let blob = encode_to_blob(&builder)?;

    std::fs::write(&config.output, &blob)?;
    info!(
        "Kept {} of {} IFD0 tag(s); wrote {} bytes to {}",
        builder.tags().len(),
        root.entries().len(),
        blob.len(),
        config.output.display()
    );
    Ok(())
}
