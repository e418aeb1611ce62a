//! pgo-status - namespace status reports for a PostgreSQL operator.
//!
//! `serve` exposes the status API from inside the cluster. `status` and
//! `show` query a running API server and print its answers.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use pgo_status::client::{self, ALL_CLUSTERS, ApiClient, ClientSettings};
use pgo_status::config::{
    Args, BUILD_DATE, COMMIT, Command, OutputFormat, ServeArgs, ShowCommand, VERSION,
};
use pgo_status::{logging, output, server};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if matches!(args.command, Command::Version) {
        println!("pgo-status {}", VERSION);
        println!("  commit:     {}", COMMIT);
        println!("  build date: {}", BUILD_DATE);
        return;
    }

    if let Err(e) = logging::init(&args.log_format, &args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Serve(serve) => run_server(serve.clone()).await,
        Command::Status => run_status(args).await,
        Command::Show(ShowCommand::Workflow { id }) => run_show_workflow(args, id).await,
        Command::Show(ShowCommand::Backup { clusters, selector }) => {
            run_show_backup(args, clusters, selector.as_deref()).await
        }
        Command::Version => Ok(()),
    }
}

/// Serve the status API until Ctrl-C.
async fn run_server(serve: ServeArgs) -> Result<()> {
    let cancel = CancellationToken::new();

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        signal_token.cancel();
    });

    server::run(serve, cancel).await?;
    info!("Status server stopped");
    Ok(())
}

async fn run_status(args: &Args) -> Result<()> {
    let api = ApiClient::new(ClientSettings::from_args(args))?;
    let response = api.show_status(args.namespace()).await?;
    client::ensure_ok(&response.status)?;

    let rendered = match args.output {
        OutputFormat::Json => output::render_json(&response.result)?,
        OutputFormat::Text => output::status::render_status(args.namespace(), &response.result),
    };
    println!("{}", rendered);
    Ok(())
}

async fn run_show_workflow(args: &Args, id: &str) -> Result<()> {
    let api = ApiClient::new(ClientSettings::from_args(args))?;
    let response = api.show_workflow(id, args.namespace()).await?;
    client::ensure_ok(&response.status)?;

    let rendered = match args.output {
        OutputFormat::Json => output::render_json(&response.results)?,
        OutputFormat::Text => output::workflow::render_workflow(&response.results),
    };
    println!("{}", rendered);
    Ok(())
}

async fn run_show_backup(args: &Args, clusters: &[String], selector: Option<&str>) -> Result<()> {
    let api = ApiClient::new(ClientSettings::from_args(args))?;

    let targets: Vec<&str> = if clusters.is_empty() {
        vec![ALL_CLUSTERS]
    } else {
        clusters.iter().map(String::as_str).collect()
    };

    for name in targets {
        debug!(cluster = %name, selector = ?selector, "Fetching pgBackRest info");
        let response = api.show_backrest(name, args.namespace(), selector).await?;
        client::ensure_ok(&response.status)?;

        let rendered = match args.output {
            OutputFormat::Json => output::render_json(&response.items)?,
            OutputFormat::Text => output::backrest::render_backrest(&response.items),
        };
        println!("{}", rendered);
    }

    Ok(())
}
