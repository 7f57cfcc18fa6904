//! Scene pack analyzer tool.
//!
//! Displays information about .opl scene packs:
//! - Header fields
//! - Every resource record and its share of the file
//! - Model and texture statistics
//!
//! Usage: cargo run -p scene-info -- <file.opl> [--verbose|-v]

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use opal_scene::codec;
use opal_scene::format::{FormatError, PackHeader, ResourceKind, ResourceRecord, MAGIC};
use opal_scene::scene::{ModelSummary, TextureSummary};

#[derive(Parser)]
#[command(name = "scene-info")]
#[command(about = "Display the contents of an OPL scene pack")]
#[command(version)]
struct Cli {
    /// Scene pack to analyze
    file: PathBuf,

    /// Print per-mesh and per-texture details
    #[arg(short, long)]
    verbose: bool,
}

/// A record and the number of bytes it occupies in the pack.
struct RecordEntry {
    record: ResourceRecord,
    size: u64,
}

struct PackContents {
    header: PackHeader,
    header_size: u64,
    records: Vec<RecordEntry>,
    trailing: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bytes = fs::read(&cli.file).with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let contents = read_pack(&bytes).with_context(|| format!("{} is not a valid scene pack", cli.file.display()))?;
    let file_size = bytes.len() as u64;

    let file_name = cli.file.file_name().unwrap_or_default().to_string_lossy();
    println!("Scene File: {}", file_name);
    println!("File Size: {}", format_bytes(file_size));
    println!();

    println!("Header:");
    println!("  Tag: {}", String::from_utf8_lossy(&MAGIC));
    println!("  Version: {}", contents.header.version);
    println!("  Scene: {}", contents.header.scene_name);
    println!();

    print_record_breakdown(&contents, file_size);
    print_scene_summary(&contents);

    if cli.verbose {
        println!();
        print_verbose_details(&contents);
    }

    Ok(())
}

/// Walks the pack record by record, keeping the encoded size of each.
fn read_pack(bytes: &[u8]) -> Result<PackContents, FormatError> {
    let mut cursor = Cursor::new(bytes);
    let header = PackHeader::read(&mut cursor)?;
    let header_size = cursor.position();

    let mut records = Vec::new();
    for table in [ResourceKind::Model3D, ResourceKind::Texture] {
        let count = codec::read_count(&mut cursor, "record count")?;
        for _ in 0..count {
            let start = cursor.position();
            let record = ResourceRecord::read(&mut cursor, table)?;
            records.push(RecordEntry {
                record,
                size: cursor.position() - start,
            });
        }
    }

    let trailing = bytes.len() as u64 - cursor.position();
    Ok(PackContents {
        header,
        header_size,
        records,
        trailing,
    })
}

fn print_record_breakdown(contents: &PackContents, file_size: u64) {
    println!("Records:");
    println!("  {:<8} {:<24} {:>12} {:>10}", "Type", "Name", "Size", "% of File");
    println!("  {}", "-".repeat(57));

    let percent = |size: u64| (size as f64 / file_size as f64) * 100.0;
    println!(
        "  {:<8} {:<24} {:>12} {:>9.1}%",
        "Header",
        "",
        format_bytes(contents.header_size),
        percent(contents.header_size)
    );
    for entry in &contents.records {
        println!(
            "  {:<8} {:<24} {:>12} {:>9.1}%",
            entry.record.kind().to_string(),
            entry.record.name(),
            format_bytes(entry.size),
            percent(entry.size)
        );
    }
    if contents.trailing > 0 {
        println!("  Trailing bytes after last record: {}", contents.trailing);
    }
    println!();
}

fn print_scene_summary(contents: &PackContents) {
    let mut models = 0;
    let mut meshes = 0;
    let mut vertices = 0;
    let mut indices = 0;
    let mut textures = 0;
    let mut pixel_bytes = 0;

    for entry in &contents.records {
        match &entry.record {
            ResourceRecord::Model { model, .. } => {
                models += 1;
                meshes += model.meshes.len();
                vertices += model.vertex_count();
                indices += model.index_count();
            }
            ResourceRecord::Texture { texture, .. } => {
                textures += 1;
                pixel_bytes += texture.size() as u64;
            }
        }
    }

    println!("Scene Contents:");
    println!(
        "  Models: {} ({} meshes, {} vertices, {} triangles)",
        models,
        meshes,
        format_number(vertices),
        format_number(indices / 3)
    );
    println!("  Textures: {} ({})", textures, format_bytes(pixel_bytes));
}

fn print_verbose_details(contents: &PackContents) {
    let models: Vec<_> = contents
        .records
        .iter()
        .filter_map(|entry| match &entry.record {
            ResourceRecord::Model { name, model } => Some(ModelSummary::new(name, model)),
            ResourceRecord::Texture { .. } => None,
        })
        .collect();
    if !models.is_empty() {
        println!("Model Details:");
        for model in &models {
            print!("{}", model);
        }
    }

    let textures: Vec<_> = contents
        .records
        .iter()
        .filter_map(|entry| match &entry.record {
            ResourceRecord::Texture { name, texture } => Some(TextureSummary::new(name, texture)),
            ResourceRecord::Model { .. } => None,
        })
        .collect();
    if !textures.is_empty() {
        println!("Texture Details:");
        for texture in &textures {
            print!("{}", texture);
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn format_number(n: usize) -> String {
    if n < 1000 {
        n.to_string()
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1000.0)
    } else {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    }
}
