#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use std::io::Write;
use std::net::SocketAddr;
use vtb_auth::config::{Command, Config};
use vtb_auth::{App, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry)?;

    let app = App::new(&config);

    match config.command() {
        Command::Init => {
            app.user_repo.init().await?;
        }
        Command::Show => {
            let users = app.user_repo.show().await?;
            let mut stdout = std::io::stdout().lock();
            for user in users {
                serde_json::to_writer(&mut stdout, &user)?;
                writeln!(stdout)?;
            }
        }
        Command::Serve => {
            let router = vtb_auth::api::app_router(app.state);
            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

            tracing::info!(address = %addr, "listening");
            let listener = tokio::net::TcpListener::bind(addr).await?;

            axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
            tracing::info!("Server stopped");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
