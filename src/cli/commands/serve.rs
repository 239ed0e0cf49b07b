//! Serve command - Run the WebSocket server

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{app::{App, AppConfig}, server::Server};

#[derive(Parser, Debug)]
#[command(about = "Serve live games and background training over WebSocket")]
pub struct ServeArgs {
    /// Listen address, overriding `server.bind`
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Directory holding saved agents, overriding `agents.directory`
    #[arg(long)]
    pub agents_dir: Option<PathBuf>,
}

pub fn execute(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = args.agents_dir {
        config.agents.directory = dir;
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(async move {
        let app = App::new(config);
        let server = Server::bind(&app).await?;
        println!("Listening on ws://{}/socket", server.local_addr()?);
        server.run_until(shutdown_signal()).await?;
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
