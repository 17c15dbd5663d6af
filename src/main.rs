use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use comanda::config::Config;
use comanda::logging::init_tracing;
use comanda::notify::LogNotifier;
use comanda::view::RenderOutcome;
use comanda::Shell;

#[derive(Parser, Debug)]
#[command(name = "comanda")]
#[command(about = "Headless restaurant admin panel shell")]
struct Cli {
    /// Config file (default: ~/.config/comanda/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Server base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// View to mount first
    #[arg(long, value_name = "NAME")]
    view: Option<String>,

    /// Table identifier for the push channel
    #[arg(long, value_name = "ID")]
    mesa_id: Option<String>,

    /// Do not open the push channel
    #[arg(long)]
    no_realtime: bool,

    /// Exit after the first render
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::load().context("loading config")?,
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(view) = &self.view {
            config.views.initial = view.clone();
        }
        if let Some(mesa_id) = &self.mesa_id {
            config.realtime.mesa_id = Some(mesa_id.clone());
        }
        if self.no_realtime || self.once {
            config.realtime.enabled = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.load_config()?;
    tracing::info!(base_url = %config.server.base_url, view = %config.views.initial, "Starting panel shell");

    let mut shell = Shell::with_builtin_views(config, Arc::new(LogNotifier))?;
    let outcome = shell.start().await;
    if let RenderOutcome::Failed(reason) = &outcome {
        tracing::warn!(reason = %reason, "Initial view failed to render");
    }
    println!("{}", shell.mount().markup());

    if cli.once {
        shell.shutdown().await;
        return Ok(());
    }

    shell.connect_realtime()?;
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    println!("{}", shell.mount().markup());
    shell.shutdown().await;
    Ok(())
}
