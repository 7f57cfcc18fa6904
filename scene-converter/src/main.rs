use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use opal_scene::loader::{load_scene, DetectedFormat};
use opal_scene::{ImportConfig, Importer, Scene, DEFAULT_OUTPUT};

#[derive(Parser)]
#[command(name = "scene-converter")]
#[command(about = "Compile an OPL manifest (or re-emit a scene pack) to a .opl scene pack")]
#[command(version)]
struct Cli {
    /// Input manifest (.json) or scene pack (.opl)
    input: PathBuf,

    /// Output path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Directory holding model sources
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Directory holding texture sources
    #[arg(long)]
    texture_dir: Option<PathBuf>,

    /// Extension of model sources
    #[arg(long)]
    model_ext: Option<String>,

    /// Extension of texture sources
    #[arg(long)]
    texture_ext: Option<String>,
}

impl Cli {
    /// The default import configuration with any directory or extension flags applied.
    fn import_config(&self) -> ImportConfig {
        let mut config = ImportConfig::default();
        if let Some(dir) = &self.model_dir {
            config = config.with_model_dir(dir);
        }
        if let Some(dir) = &self.texture_dir {
            config = config.with_texture_dir(dir);
        }
        if let Some(ext) = &self.model_ext {
            config = config.with_model_extension(ext);
        }
        if let Some(ext) = &self.texture_ext {
            config = config.with_texture_extension(ext);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.input.exists() {
        bail!("Input file not found: {}", cli.input.display());
    }
    if cli.input == cli.output {
        bail!("Output would overwrite the input: {}", cli.output.display());
    }

    let importer = Importer::new(cli.import_config());

    eprintln!("Loading {}...", cli.input.display());
    let loaded = load_scene(&cli.input, &importer)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    if loaded.format == DetectedFormat::Pack {
        eprintln!("  (input is already a scene pack, re-emitting)");
    }

    print_stats(&loaded.scene);

    eprintln!("Saving to {}...", cli.output.display());
    loaded
        .scene
        .save_to_file(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    let file_size = std::fs::metadata(&cli.output)?.len();
    eprintln!("Done. Output: {} ({})", cli.output.display(), format_bytes(file_size));

    Ok(())
}

fn print_stats(scene: &Scene) {
    let (vertices, indices) = scene
        .models()
        .fold((0, 0), |(v, i), (_, model)| (v + model.vertex_count(), i + model.index_count()));
    let pixel_bytes: usize = scene.textures().map(|(_, texture)| texture.size()).sum();

    eprintln!("  Scene:     {}", scene.name());
    eprintln!("  Models:    {}", scene.model_count());
    eprintln!("  Vertices:  {}", vertices);
    eprintln!("  Indices:   {}", indices);
    eprintln!("  Textures:  {} ({})", scene.texture_count(), format_bytes(pixel_bytes as u64));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_config_defaults() {
        let cli = Cli::parse_from(["scene-converter", "scene.json"]);
        assert_eq!(cli.import_config(), ImportConfig::default());
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_import_config_flags() {
        let cli = Cli::parse_from([
            "scene-converter",
            "scene.json",
            "--model-dir",
            "assets/models",
            "--texture-ext",
            "png",
        ]);
        let config = cli.import_config();

        assert_eq!(config.model_dir, PathBuf::from("assets/models"));
        assert_eq!(config.texture_extension, "png");
        assert_eq!(config.texture_dir, ImportConfig::default().texture_dir);
        assert_eq!(config.model_extension, ImportConfig::default().model_extension);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
