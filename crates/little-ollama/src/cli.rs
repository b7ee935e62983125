use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat with local models, ask questions about images and manage models.
#[derive(Debug, Parser)]
#[command(name = "little-ollama", version)]
pub struct Cli {
    /// Address of the Ollama server.
    #[arg(
        long,
        global = true,
        env = "OLLAMA_HOST",
        default_value = "http://localhost:11434"
    )]
    pub host: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with a model (default).
    Chat {
        /// Model to use, defaults to the first installed chat model.
        #[arg(short, long)]
        model: Option<String>,
        /// System prompt sent with every message.
        #[arg(short, long)]
        system: Option<String>,
    },
    /// Ask questions about an image.
    Vision {
        /// Image to analyze (png or jpeg).
        #[arg(short, long)]
        image: PathBuf,
        /// Model to use, defaults to the first installed vision model.
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage installed models.
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ModelsAction {
    /// List installed models.
    List,
    /// Download a model, e.g. `mistral`.
    Pull { name: String },
    /// Create a model from a modelfile.
    Create {
        name: String,
        /// Path to the modelfile.
        #[arg(short = 'f', long)]
        modelfile: PathBuf,
    },
    /// Delete one or more models.
    Delete {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Chat {
            model: None,
            system: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_models_delete() {
        let cli = Cli::try_parse_from([
            "little-ollama",
            "--host",
            "gpu-box:11434",
            "models",
            "delete",
            "mario",
            "mistral",
        ])
        .unwrap();
        assert_eq!(cli.host, "gpu-box:11434");
        let Some(Command::Models {
            action: ModelsAction::Delete { names },
        }) = &cli.command
        else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(names, &["mario", "mistral"]);

        assert!(
            Cli::try_parse_from(["little-ollama", "models", "delete"]).is_err()
        );
    }
}
