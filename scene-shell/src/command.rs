//! Shell command parsing.

use anyhow::{bail, Result};
use opal_scene::ResourceKind;

pub const HELP: &str = "\
OVERVIEW: Opal opl creation tool

USAGE: oplc [options] [input]

COMMANDS:
  info [model3d|texture]\t\t\tPrints scene contents
  add <model3d|texture> <source> <name>\tImports a resource
  rm <model3d|texture> <name>\t\t\tRemoves a resource
  compile\t\t\t\t\tWrites the scene pack
  reload\t\t\t\t\tDiscards changes and re-reads the input
  help\t\t\t\t\t\tDisplays this screen
  quit\t\t\t\t\t\tEnds the session
";

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Reload,
    Compile,
    Info(Option<ResourceKind>),
    Remove { kind: ResourceKind, name: String },
    Add { kind: ResourceKind, source: String, name: String },
}

impl Command {
    /// Parses a line of input. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            ("reload", []) => Command::Reload,
            ("compile", []) => Command::Compile,
            ("info", []) => Command::Info(None),
            ("info", [kind]) => Command::Info(Some(kind.parse()?)),
            ("info", _) => bail!("info command invalid\ninfo usage: info <(optional) resource type>"),
            ("rm", [kind, name]) => Command::Remove {
                kind: kind.parse()?,
                name: name.to_string(),
            },
            ("rm", _) => bail!("rm command invalid\nrm usage: rm <resource type> <resource name>"),
            ("add", [kind, source, name]) => Command::Add {
                kind: kind.parse()?,
                source: source.to_string(),
                name: name.to_string(),
            },
            ("add", _) => bail!("add command invalid\nadd usage: add <resource type> <source name> <resource name>"),
            ("help" | "quit" | "exit" | "reload" | "compile", _) => bail!("{} takes no arguments", name),
            _ => bail!("unknown command \"{}\"", line.trim()),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("quit"), Command::Quit);
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse("reload"), Command::Reload);
        assert_eq!(parse("  compile  "), Command::Compile);
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \t").unwrap(), None);
    }

    #[test]
    fn test_info() {
        assert_eq!(parse("info"), Command::Info(None));
        assert_eq!(parse("info model3d"), Command::Info(Some(ResourceKind::Model3D)));
        assert_eq!(parse("info texture"), Command::Info(Some(ResourceKind::Texture)));

        let err = Command::parse("info shader").unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource type shader");
        assert!(Command::parse("info model3d texture").is_err());
    }

    #[test]
    fn test_rm() {
        assert_eq!(
            parse("rm texture brick"),
            Command::Remove {
                kind: ResourceKind::Texture,
                name: "brick".to_string(),
            }
        );
        let err = Command::parse("rm texture").unwrap_err();
        assert!(err.to_string().starts_with("rm command invalid"));
    }

    #[test]
    fn test_add() {
        assert_eq!(
            parse("add model3d crate box"),
            Command::Add {
                kind: ResourceKind::Model3D,
                source: "crate".to_string(),
                name: "box".to_string(),
            }
        );
        assert!(Command::parse("add model3d crate").is_err());
        assert!(Command::parse("add light sun sun").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("decompile out.json").unwrap_err();
        assert_eq!(err.to_string(), "unknown command \"decompile out.json\"");
        assert!(Command::parse("compile now").is_err());
    }
}
