//! # HTTP Pool Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa logging, instala los handlers de
//! señales y corre el servidor hasta que llegue SIGINT/SIGTERM.

use http_pool_server::config::Config;
use http_pool_server::server::{Server, ShutdownHandle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    config.print_summary();

    if let Err(e) = std::fs::create_dir_all(&config.directory) {
        error!(directory = %config.directory, error = %e, "cannot create serving directory");
        std::process::exit(1);
    }

    let mut server = Server::new(config);

    if let Err(e) = install_signal_handlers(server.shutdown_handle()) {
        error!(error = %e, "cannot install signal handlers");
        std::process::exit(1);
    }

    // Esto bloquea hasta el apagado
    if let Err(e) = server.run() {
        error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn install_signal_handlers(handle: ShutdownHandle) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(signal, "stop signal received");
                handle.shutdown();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers(_handle: ShutdownHandle) -> std::io::Result<()> {
    Ok(())
}
