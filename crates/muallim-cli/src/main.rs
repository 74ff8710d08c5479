mod config;
mod generate_cmd;
mod render_cmd;
mod serve_cmd;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};

use muallim_core::client::GeminiClient;
use muallim_core::controller::Controller;
use muallim_core::form::{LessonForm, Level, Period, Week};

use config::MuallimConfig;

#[derive(Parser)]
#[command(name = "muallim", about = "Lesson-plan card generator", version)]
struct Cli {
    /// API key (overrides the API_KEY env var and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name (overrides MUALLIM_MODEL and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a muallim config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a lesson card from a subject and/or attached files
    Generate {
        /// School level, 1-6 or "Niveau N"
        #[arg(long, default_value = "4")]
        level: Level,
        /// Period, 1-4 or "Période N"
        #[arg(long, default_value = "3")]
        period: Period,
        /// Week, 1-5 or "Semaine N"
        #[arg(long, default_value = "2")]
        week: Week,
        /// Lesson subject (required when no file is attached)
        #[arg(long)]
        subject: Option<String>,
        /// Image or PDF to send with the request (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Output path for the HTML card
        #[arg(long, short, default_value = "lesson-card.html")]
        output: PathBuf,
        /// Also write the plan as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Render a saved plan JSON file as an HTML card
    Render {
        /// Path to the plan JSON file
        plan: PathBuf,
        /// Output path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Omit the print/back buttons
        #[arg(long)]
        no_chrome: bool,
    },
    /// Print the response schema sent to the model
    Schema,
    /// Start the web interface
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Execute the `muallim init` command: write config file.
fn cmd_init(api_key: Option<&str>, model: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.map(str::to_string),
            model: model.map(str::to_string),
            endpoint: None,
        },
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => {
            let prefix: String = key.chars().take(4).collect();
            println!("  gemini.api_key = {prefix}...");
        }
        None => println!("  gemini.api_key = (unset, {} will be used)", config::API_KEY_ENV),
    }
    if let Some(model) = model {
        println!("  gemini.model = {model}");
    }
    println!();
    println!("Next: run `muallim serve` or `muallim generate --subject ...`.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.api_key.as_deref(), cli.model.as_deref(), force)?;
        }
        Commands::Generate {
            level,
            period,
            week,
            subject,
            files,
            output,
            json,
        } => {
            let resolved = MuallimConfig::resolve(cli.api_key.as_deref(), cli.model.as_deref());
            let options = generate_cmd::GenerateOptions {
                form: LessonForm {
                    level,
                    period,
                    week,
                    subject: subject.unwrap_or_default(),
                },
                files,
                output,
                json,
            };
            generate_cmd::run_generate(&resolved, options).await?;
        }
        Commands::Render {
            plan,
            output,
            no_chrome,
        } => {
            render_cmd::run_render(&plan, output.as_ref(), !no_chrome)?;
        }
        Commands::Schema => {
            render_cmd::run_schema()?;
        }
        Commands::Serve { bind, port } => {
            let resolved = MuallimConfig::resolve(cli.api_key.as_deref(), cli.model.as_deref());
            if resolved.credential.is_none() {
                tracing::warn!(
                    "no API key configured; generation will fail until {} is set",
                    config::API_KEY_ENV
                );
            }
            let client = Arc::new(GeminiClient::new(resolved.endpoint.clone()));
            let controller = Controller::new(client, resolved.credential, resolved.model);
            serve_cmd::run_serve(controller, &bind, port).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "muallim", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_defaults_match_initial_form() {
        let cli = Cli::try_parse_from(["muallim", "generate", "--subject", "La forêt"]).unwrap();
        let Commands::Generate {
            level,
            period,
            week,
            output,
            ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(level, Level::default());
        assert_eq!(period, Period::default());
        assert_eq!(week, Week::default());
        assert_eq!(output, PathBuf::from("lesson-card.html"));
    }

    #[test]
    fn generate_accepts_labels_and_repeated_files() {
        let cli = Cli::try_parse_from([
            "muallim", "generate", "--level", "Niveau 6", "--week", "5", "--file", "a.png",
            "--file", "b.pdf",
        ])
        .unwrap();
        let Commands::Generate { level, files, .. } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(level.number(), 6);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn generate_rejects_out_of_range_level() {
        assert!(Cli::try_parse_from(["muallim", "generate", "--level", "7"]).is_err());
    }

    #[test]
    fn global_api_key_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["muallim", "serve", "--api-key", "k", "--port", "9000"])
            .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert!(matches!(cli.command, Commands::Serve { port: 9000, .. }));
    }
}
