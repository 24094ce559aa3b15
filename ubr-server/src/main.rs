use anyhow::{Context, Result};
use log::{error, info};
use tokio::net::TcpListener;
use ubr::{Config, Resolver};

#[tokio::main]
async fn main() {
    // The log level comes from the config, so config errors can only go to stderr.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading configuration: {e}");
            std::process::exit(127);
        }
    };

    if let Err(e) = ubr::init_logger(config.log_level) {
        eprintln!("Error creating logger: {e}");
        std::process::exit(126);
    }

    let status = match run(&config).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:#}");
            1
        }
    };
    std::process::exit(status);
}

async fn run(config: &Config) -> Result<()> {
    let resolver = Resolver::new(config.api_base_url.clone())?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not listen on {addr}"))?;

    ubr::serve(listener, resolver, shutdown_signal())
        .await
        .context("server failed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler we just run until killed.
        error!("could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("got Ctrl-C, shutting down");
}
