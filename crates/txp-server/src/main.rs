//! txp server binary entry point.

use clap::Parser;
use tracing::{error, info};

use txp_server::{Cli, FileServer, ServerConfig};

fn main() {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = txp_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "txp-server starting");

    let config = ServerConfig {
        output_dir: cli.output_dir.clone(),
        handshake: cli.server_params(),
    };
    let bind_addr = cli.socket_addr();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async {
        let server = FileServer::bind(bind_addr, config).await?;
        server.run().await
    });

    if let Err(e) = result {
        error!(error = %e, "server failed");
        eprintln!("txp-server: {e}");
        std::process::exit(1);
    }
}
