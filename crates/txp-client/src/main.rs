//! txp client binary entry point.

use clap::Parser;
use tokio::net::TcpStream;
use tracing::{error, info};

use txp_client::progress::{format_bytes, format_duration};
use txp_client::{send_file, Cli};
use txp_core::error::Result;
use txp_core::handshake;
use txp_core::transport::FrameStream;

fn main() {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = txp_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "txp client starting");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(&cli)) {
        error!(error = %e, "transfer failed");
        eprintln!("txp: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let addr = format!("{}:{}", cli.host, cli.port);
    info!(addr = addr.as_str(), file = %cli.file.display(), "connecting");

    let socket = TcpStream::connect(&addr).await?;
    let mut stream = FrameStream::new(socket);

    let approved = handshake::connect(&mut stream, &cli.client_params()).await?;
    info!(
        max_chunk = approved.max_chunk,
        max_window = approved.max_window,
        features = approved.features,
        "session negotiated"
    );

    let report = send_file(&mut stream, &approved, &cli.file, !cli.no_progress).await?;
    info!(bytes = report.bytes, chunks = report.chunks, "file sent");
    println!(
        "Sent {} in {} ({} frames)",
        format_bytes(report.bytes),
        format_duration(report.elapsed.as_secs_f64()),
        report.chunks
    );

    Ok(())
}
