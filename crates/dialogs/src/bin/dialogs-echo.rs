//! Dialogs echo skill.
//!
//! Repeats the user's utterance and reads back any numbers and dates it
//! recognised. Useful for checking a deployment end to end.

use std::path::PathBuf;

use dialogs::prelude::*;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("dialogs-echo {}", env!("CARGO_PKG_VERSION"));
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Dialogs echo skill

USAGE:
    dialogs-echo [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    DIALOGS__SERVER__HTTP_ADDR         Bind address (default: 0.0.0.0:8080)
    DIALOGS__SERVER__WEBHOOK_PATH      Webhook path (default: /)
    DIALOGS__SERVER__MAX_BODY_SIZE     Request body limit in bytes (default: 1048576)
    DIALOGS__SKILL__AUTO_PING          Answer pings automatically (default: true)
    DIALOGS__LOGGING__LEVEL            Log filter (default: info)
    DIALOGS__LOGGING__FORMAT           json or pretty (default: json)
"
    );
}

fn describe(input: &InputData) -> String {
    let mut parts = vec![input.request.original_utterance.clone()];

    for entity in &input.request.nlu.entities {
        if let Ok(number) = entity.int_value() {
            parts.push(format!("number {number}"));
        } else if let Ok(number) = entity.float_value() {
            parts.push(format!("number {number}"));
        } else if let Ok(value) = entity.datetime_value() {
            match value.resolve(&input.meta.timezone) {
                Ok(at) => parts.push(format!("date {}", at.format("%Y-%m-%d %H:%M"))),
                Err(e) => tracing::debug!(error = %e, "Could not resolve date entity"),
            }
        }
    }

    parts.join(", ")
}

async fn echo(input: InputData) -> OutputData {
    let response = if input.session.new {
        Response::new("Say something and I will repeat it.", "", false)
            .with_button(Button::new("Stop").hide(true))
    } else if input.request.command == "stop" {
        Response::new("Bye!", "", true)
    } else {
        Response::new(describe(&input), "", false)
    };

    OutputData::new(&input, response)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_production().with_dotenv()?;
    if let Some(path) = &args.config {
        loader = loader.with_file(path)?;
    }
    let config = loader.with_env_prefix("DIALOGS").load()?;

    let dispatcher = Dispatcher::new(echo).error_sink(|error| {
        tracing::warn!(class = ?error.class(), "Echo skill reported: {error}");
    });

    dialogs::run(&config, dispatcher).await
}
