use anyhow::Context;
use bacrpm::cli::Cli;
use bacrpm::{output, rows};
use bacrpm_application::{CrossReferenceTable, RequestBatch, RequestSetBuilder};
use bacrpm_client::{BipStack, SessionController, SessionState};
use bacrpm_transport::BipDatalink;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are printed to stdout
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let device_id = cli.device_instance()?;
    let csv_path = cli.csv_path()?;
    let mut table = rows::load_table(csv_path)?;

    let mut builder = RequestSetBuilder::new(&mut table, csv_path.display().to_string());
    builder.request_all(&cli.names);
    let batch = builder.build()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(read_objects(cli, device_id, table, batch))
}

async fn read_objects(
    cli: &Cli,
    device_id: u32,
    table: CrossReferenceTable,
    batch: RequestBatch,
) -> anyhow::Result<ExitCode> {
    let config = cli.session_config();
    let mut stack = BipStack::new(BipDatalink::new(cli.bip_settings()), &config);
    stack.open().await.context("Failed to open BACnet/IP datalink")?;

    let mut session = SessionController::new(stack, config, device_id, table, batch);
    let binding = cli.static_binding();
    if binding.is_specified() {
        session = session.with_static_binding(binding.to_address());
    }

    let state = session.run().await.clone();
    if let Err(e) = session.stack_mut().close().await {
        log::debug!("Closing datalink: {}", e);
    }

    match state {
        SessionState::Succeeded => {
            if let Some(document) = session.into_document() {
                output::write_document(std::io::stdout().lock(), &document)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        SessionState::Failed(reason) => {
            eprintln!("{}", reason);
            Ok(ExitCode::FAILURE)
        }
        other => {
            eprintln!("Session stopped in state {}", other);
            Ok(ExitCode::FAILURE)
        }
    }
}
