//! Interactive editor for OPL scene packs.
//!
//! Opens a scene pack or manifest and reads commands from stdin until `quit`.
//! Command errors are reported and the session continues.
//!
//! Usage: oplc [input.opl|input.json]

mod command;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use opal_scene::loader::load_scene;
use opal_scene::{ImportConfig, Importer, ResourceKind, Scene, DEFAULT_OUTPUT};

use command::{Command, HELP};

#[derive(Parser)]
#[command(name = "oplc")]
#[command(about = "Interactively edit and compile OPL scene packs")]
#[command(version)]
struct Cli {
    /// Scene pack (.opl) or manifest (.json) to open; starts empty if omitted
    input: Option<PathBuf>,

    /// Path `compile` writes to
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

/// Whether the command loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// An open scene and where it came from.
struct Session {
    input: Option<PathBuf>,
    output: PathBuf,
    importer: Importer,
    scene: Scene,
}

impl Session {
    fn open(input: Option<PathBuf>, output: PathBuf, importer: Importer) -> Result<Self> {
        let mut session = Self {
            input,
            output,
            importer,
            scene: Scene::default(),
        };
        session.reload()?;
        Ok(session)
    }

    /// Replaces the scene with a fresh read of the input, discarding edits.
    fn reload(&mut self) -> Result<()> {
        self.scene = match &self.input {
            Some(path) => {
                load_scene(path, &self.importer)
                    .with_context(|| format!("couldn't open file \"{}\"", path.display()))?
                    .scene
            }
            None => Scene::default(),
        };
        info!("Opened scene {}", self.scene.name());
        Ok(())
    }

    fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Help => write!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Reload => {
                writeln!(out, "Reloading...")?;
                self.reload()?;
            }
            Command::Compile => {
                self.scene.save_to_file(&self.output)?;
                writeln!(out, "Wrote {}", self.output.display())?;
            }
            Command::Info(None) => write!(out, "{}", self.scene.info())?,
            Command::Info(Some(ResourceKind::Model3D)) => {
                for model in self.scene.list_models() {
                    write!(out, "{}", model)?;
                }
            }
            Command::Info(Some(ResourceKind::Texture)) => {
                for texture in self.scene.list_textures() {
                    write!(out, "{}", texture)?;
                }
            }
            Command::Remove { kind, name } => self.scene.remove(kind, &name)?,
            Command::Add { kind, source, name } => self.importer.add(&mut self.scene, kind, &source, &name)?,
        }
        Ok(Flow::Continue)
    }

    /// Reads commands until `quit` or end of input.
    fn run(&mut self, input: impl BufRead, out: &mut impl Write, err: &mut impl Write) -> Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;

            let result = Command::parse(&line).and_then(|command| match command {
                Some(command) => self.execute(command, out),
                None => Ok(Flow::Continue),
            });
            match result {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(err, "{:#}", e)?,
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let importer = Importer::new(cli.import_config());
    let mut session = Session::open(cli.input, cli.output, importer)?;

    let stdin = io::stdin();
    session.run(stdin.lock(), &mut io::stdout(), &mut io::stderr())
}
