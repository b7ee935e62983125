//! A command line playground for models served by a local Ollama server.

#[macro_use]
extern crate tracing;

mod cli;

use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use little_ollama::client::{
    OllamaConfigBuilder, OllamaDirectory, OllamaProvider,
};
use little_ollama::core::encode_image_bytes;
use little_ollama::core::models::{
    ModelPurpose, missing_vision_models, resolve_model,
};
use little_ollama::{Session, SessionBuilder};
use little_ollama_model::{AggregationResult, ModelDirectory};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::cli::{Cli, Command, ModelsAction};

const BAR_CHAR: &str = "▎";
const LIBRARY_URL: &str = "https://ollama.com/library";

type Input = io::Lines<io::BufReader<io::Stdin>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = OllamaConfigBuilder::new().with_base_url(cli.host).build();
    debug!("using server at {}", config.base_url());
    let provider = OllamaProvider::new(config);
    let directory = provider.directory();
    let mut input = io::BufReader::new(io::stdin()).lines();

    let succeeded = match cli.command.unwrap_or_default() {
        Command::Chat { model, system } => {
            run_chat(provider, &directory, &mut input, model, system).await
        }
        Command::Vision { image, model } => {
            run_vision(provider, &directory, &mut input, &image, model).await
        }
        Command::Models { action } => run_models(&directory, action).await,
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_chat(
    provider: OllamaProvider,
    directory: &OllamaDirectory,
    input: &mut Input,
    model: Option<String>,
    system: Option<String>,
) -> bool {
    let resolved =
        resolve_model(directory, model.as_deref(), ModelPurpose::Chat).await;
    let model = match resolved {
        Ok(Some(model)) => model,
        Ok(None) => {
            print_warning("You have not pulled any model from Ollama yet!");
            println!("🤖 Find models here: {}", LIBRARY_URL.underline());
            return false;
        }
        Err(err) => {
            print_error(format!("Failed to list models: {err}"));
            return false;
        }
    };

    let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
    let mut builder = SessionBuilder::with_model_provider(provider, &model)
        .on_fragment(move |text| {
            fragment_tx.send(text.to_owned()).ok();
        });
    if let Some(system) = system {
        builder = builder.with_system_prompt(system);
    }

    println!(
        "{}🚀 Ollama Playground: {}",
        BAR_CHAR.bright_cyan(),
        model.bold()
    );
    println!("{}", "Enter a prompt here...".dimmed());
    repl(builder.build(), fragment_rx, input).await;
    true
}

async fn run_vision(
    provider: OllamaProvider,
    directory: &OllamaDirectory,
    input: &mut Input,
    image: &Path,
    model: Option<String>,
) -> bool {
    let encoded = match tokio::fs::read(image).await {
        Ok(bytes) => encode_image_bytes(&bytes),
        Err(err) => {
            print_error(format!("Failed to read {}: {err}", image.display()));
            return false;
        }
    };
    let encoded = match encoded {
        Ok(encoded) => encoded,
        Err(err) => {
            print_error(err);
            return false;
        }
    };

    let model =
        match resolve_model(directory, model.as_deref(), ModelPurpose::Vision)
            .await
        {
            Ok(Some(model)) => model,
            Ok(None) => match offer_vision_models(directory, input).await {
                Some(model) => model,
                None => return false,
            },
            Err(err) => {
                print_error(format!("Failed to list models: {err}"));
                return false;
            }
        };

    let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
    let mut session = SessionBuilder::with_model_provider(provider, &model)
        .on_fragment(move |text| {
            fragment_tx.send(text.to_owned()).ok();
        })
        .build();
    session.attach_image(encoded);

    println!(
        "{}🌋 {} Playground: {}",
        BAR_CHAR.bright_red(),
        model.bold(),
        image.display()
    );
    println!("{}", "Question about the image...".dimmed());
    repl(session, fragment_rx, input).await;
    true
}

/// Offers to download the vision models that are not installed yet and
/// returns the first one that was pulled.
async fn offer_vision_models(
    directory: &OllamaDirectory,
    input: &mut Input,
) -> Option<String> {
    print_error("No allowed models are available.");
    let models = match directory.list().await {
        Ok(models) => models,
        Err(err) => {
            print_error(format!("Failed to list models: {err}"));
            return None;
        }
    };

    for name in missing_vision_models(&models) {
        print!("📥 Download {}? [y/N] ", name.bold());
        std::io::stdout().flush().ok();
        let answer = read_line(input).await?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            continue;
        }

        let message = format!("📥 Downloading {name}...");
        match with_spinner(message, directory.pull(name)).await {
            Ok(()) => {
                print_success(format!("🎉 Downloaded model: {name}"));
                return Some(name.to_owned());
            }
            Err(err) => {
                print_error(format!(
                    "Failed to download model: {name}. Error: {err}"
                ));
            }
        }
    }
    None
}

async fn repl(
    mut session: Session,
    mut fragment_rx: mpsc::UnboundedReceiver<String>,
    input: &mut Input,
) {
    let mut printer = Printer::new();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(input).await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        printer.start();
        let result = {
            let submit = session.send_message(line);
            tokio::pin!(submit);
            loop {
                printer.tick();

                let sleep = sleep(Duration::from_millis(100));
                select! {
                    result = &mut submit => break result,
                    Some(text) = fragment_rx.recv() => {
                        printer.print_fragment(&text);
                    },
                    _ = sleep => {
                        continue;
                    }
                }
            }
        };

        // Fragments sent during the last poll of `submit`.
        while let Ok(text) = fragment_rx.try_recv() {
            printer.print_fragment(&text);
        }
        printer.finish(session.model(), &result);
    }
}

/// Prints a streamed answer, with a spinner until the first piece arrives.
struct Printer {
    style: ProgressStyle,
    progress_bar: Option<ProgressBar>,
    printed: bool,
}

impl Printer {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        Self {
            style,
            progress_bar: None,
            printed: false,
        }
    }

    fn start(&mut self) {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(self.style.clone());
        progress_bar.set_message("wait for it...");
        self.progress_bar = Some(progress_bar);
        self.printed = false;
    }

    fn tick(&self) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.inc(1);
        }
    }

    fn print_fragment(&mut self, text: &str) {
        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        if !self.printed {
            print!("{}🤖 ", BAR_CHAR.bright_cyan());
            self.printed = true;
        }
        print!("{}", text.bright_white());
        std::io::stdout().flush().ok();
    }

    fn finish(&mut self, model: &str, result: &AggregationResult) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        if self.printed {
            println!();
        }

        if let Some(failure) = result.failure() {
            print_error(format!(
                "Failed to get a response from {model}. Error: {failure}"
            ));
        } else if result.full_text().is_empty() {
            print_warning(format!("No response received from {model}."));
        }
        println!();
    }
}

async fn run_models(directory: &OllamaDirectory, action: ModelsAction) -> bool {
    match action {
        ModelsAction::List => match directory.list().await {
            Ok(models) if models.is_empty() => {
                println!("🦗 No models available.");
                true
            }
            Ok(models) => {
                for model in models {
                    println!(
                        "{} {:>9}  {}",
                        format!("{:<32}", model.name).bold(),
                        format_size(model.size),
                        model.modified_at.dimmed()
                    );
                }
                true
            }
            Err(err) => {
                print_error(format!("Failed to list models: {err}"));
                false
            }
        },
        ModelsAction::Pull { name } => {
            let message = format!("📥 Downloading {name}...");
            match with_spinner(message, directory.pull(&name)).await {
                Ok(()) => {
                    print_success(format!("🎉 Downloaded model: {name}"));
                    true
                }
                Err(err) => {
                    print_error(format!(
                        "Failed to download model: {name}. Error: {err}"
                    ));
                    false
                }
            }
        }
        ModelsAction::Create { name, modelfile } => {
            let modelfile = match tokio::fs::read_to_string(&modelfile).await {
                Ok(modelfile) => modelfile,
                Err(err) => {
                    print_error(format!(
                        "Failed to read {}: {err}",
                        modelfile.display()
                    ));
                    return false;
                }
            };
            let message = format!("🆕 Creating {name}...");
            match with_spinner(message, directory.create(&name, &modelfile))
                .await
            {
                Ok(()) => {
                    print_success(format!("✅ Created model: {name}"));
                    true
                }
                Err(err) => {
                    print_error(format!(
                        "Failed to create model: {name}. Error: {err}"
                    ));
                    false
                }
            }
        }
        ModelsAction::Delete { names } => {
            let mut succeeded = true;
            for name in names {
                match directory.delete(&name).await {
                    Ok(()) => {
                        print_success(format!("🗑️  Deleted model: {name}"));
                    }
                    Err(err) => {
                        print_error(format!(
                            "Failed to delete model: {name}. Error: {err}"
                        ));
                        succeeded = false;
                    }
                }
            }
            succeeded
        }
    }
}

async fn with_spinner<T>(message: String, fut: impl Future<Output = T>) -> T {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_message(message);
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    progress_bar.finish_and_clear();
    output
}

fn format_size(bytes: u64) -> String {
    const GB: f64 = 1_000_000_000.0;
    const MB: f64 = 1_000_000.0;
    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else {
        format!("{:.0} MB", bytes / MB)
    }
}

fn print_success(message: impl std::fmt::Display) {
    println!("{}", message.bright_green());
}

fn print_warning(message: impl std::fmt::Display) {
    println!("{}⚠️  {}", BAR_CHAR.bright_yellow(), message.bright_yellow());
}

fn print_error(message: impl std::fmt::Display) {
    eprintln!("{}😳 {}", BAR_CHAR.bright_red(), message.bright_red());
}

async fn read_line<R>(input: &mut io::Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match input.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
