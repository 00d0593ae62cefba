mod cli;

use alkaline::{
    config, messages,
    selection::{Selection, SelectionError},
    tasks::{self, TaskEvent},
};
use alkaline_cloudconvert::CloudConvertClient;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turn a client error into the message shown to the user.
fn client_error(err: alkaline_cloudconvert::Error) -> anyhow::Error {
    anyhow::anyhow!(messages::user_message(&err))
}

fn selection_error(err: SelectionError) -> anyhow::Error {
    anyhow::anyhow!(messages::selection_message(&err))
}

fn require_credential(client: &CloudConvertClient) -> Result<()> {
    if client.has_credential() {
        Ok(())
    } else {
        Err(client_error(alkaline_cloudconvert::Error::MissingCredential))
    }
}

async fn list_formats(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = config::build_client(&config)?;
    require_credential(&client)?;

    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let formats = client
        .list_supported_formats(file)
        .await
        .map_err(client_error)?;

    for format in formats {
        println!("{}", format);
    }

    Ok(())
}

async fn convert_files(
    files: Vec<PathBuf>,
    to: &str,
    output_dir: Option<PathBuf>,
    overwrite: bool,
    no_download: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags win over the config file
    if output_dir.is_some() {
        config.output.directory = output_dir;
    }
    if overwrite {
        config.output.overwrite = true;
    }

    let client = Arc::new(config::build_client(&config)?);
    require_credential(&client)?;

    let selection = Selection::new(files)
        .and_then(|s| s.with_format(to))
        .map_err(selection_error)?;
    let formats = client
        .list_supported_formats(selection.primary())
        .await
        .map_err(client_error)?;
    selection
        .ensure_supported(&formats)
        .map_err(selection_error)?;

    let requests = selection.requests().map_err(selection_error)?;
    let target_format = selection.target_format().unwrap_or(to).to_string();
    let total = requests.len();

    tracing::info!("Converting {} file(s) to {}", total, target_format);

    let (handle, mut events) =
        tasks::spawn_conversion(client, requests, target_format, !no_download);

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling remaining files");
            cancel.cancel();
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            TaskEvent::Converted { input, url } => {
                if no_download {
                    println!("{} -> {}", input.display(), url);
                } else {
                    println!("Converted {}", input.display());
                }
            }
            TaskEvent::Downloaded { path, bytes, .. } => {
                println!("Saved {} ({} bytes)", path.display(), bytes);
            }
            TaskEvent::Failed {
                input,
                stage,
                message,
                ..
            } => {
                eprintln!("Failed to {} {}: {}", stage, input.display(), message);
            }
        }
    }

    let report = handle.join().await?;

    if let Some(summary) = report.failure_summary() {
        anyhow::bail!("Some files were not converted:\n{}", summary);
    }

    println!("\nDone: {} file(s)", total);
    Ok(())
}

fn set_key(key: &str, config_path: Option<&Path>) -> Result<()> {
    let path = config::writable_config_path(config_path);
    config::persist::save_api_key(&path, key)?;
    println!("API key saved to {}", path.display());
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).or_else(config::find_config);

    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(&p)?;
            println!("✓ Configuration is valid");
            println!("  API: {}", config.api.base_url);
            println!("  API key set: {}", config.credential().is_some());
            println!(
                "  Polling: every {} ms, at most {} checks, {} s timeout",
                config.polling.interval_ms, config.polling.max_attempts, config.polling.timeout_secs
            );
            match config.output.directory {
                Some(ref dir) => println!("  Output directory: {}", dir.display()),
                None => println!("  Output directory: next to input"),
            }
            println!("  Overwrite: {}", config.output.overwrite);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  API: {}", config.api.base_url);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "alkaline=debug,alkaline_cloudconvert=debug,reqwest=debug".to_string()
        } else {
            "alkaline=info,alkaline_cloudconvert=info".to_string()
        }
    });

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Formats { file } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_formats(&file, cli.config.as_deref()))
        }
        Commands::Convert {
            files,
            to,
            output_dir,
            overwrite,
            no_download,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_files(
                files,
                &to,
                output_dir,
                overwrite,
                no_download,
                cli.config.as_deref(),
            ))
        }
        Commands::SetKey { key } => set_key(&key, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("alkaline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
