use clap::Parser;
use mailpeek::cli::{Cli, Command};
use mailpeek::commands;
use mailpeek::config::Config;
use mailpeek::gmail_api::{clear_keyring, try_authenticate, GmailClient};
use std::io::Write;
use std::process::ExitCode;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so stdout only carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &Config) -> mailpeek::Result<GmailClient> {
    let auth = try_authenticate(config).await?;
    if auth.client_secret_loaded_from_file {
        tracing::info!(
            "Client secret loaded from {} and stored in keyring",
            config.credentials_path.display()
        );
    }
    Ok(GmailClient::new(reqwest::Client::new(), auth.token, config))
}

async fn run(command: Command, config: &Config) -> mailpeek::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::ClearKeyring => {
            if clear_keyring()? {
                writeln!(out, "Credentials removed from keyring.")?;
            } else {
                writeln!(out, "No credentials stored in keyring.")?;
            }
        }
        Command::Labels => {
            let api = connect(config).await?;
            commands::list_labels(&api, &mut out).await?;
        }
        Command::Inbox { limit } => {
            let api = connect(config).await?;
            commands::show_inbox(&api, &mut out, limit).await?;
        }
        Command::Read {
            limit,
            preview_chars,
        } => {
            let api = connect(config).await?;
            commands::read_inbox(&api, &mut out, limit, preview_chars).await?;
        }
        Command::Search(args) => {
            let api = connect(config).await?;
            commands::search(&api, &mut out, args.to_query(), args.limit).await?;
        }
        Command::Attachments { message_id, dir } => {
            let api = connect(config).await?;
            commands::download_attachments(&api, &mut out, &message_id, &dir).await?;
        }
        Command::MimeStats { limit } => {
            let api = connect(config).await?;
            commands::mime_stats(&api, &mut out, limit).await?;
        }
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = cli.config();
    tracing::debug!("Using {:?}", config);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("An error occurred: {}", e);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
