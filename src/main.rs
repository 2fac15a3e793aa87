use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tsoft_devtools::cdp::{self, CdpEvaluator};
use tsoft_devtools::config::{Settings, Theme};
use tsoft_devtools::inspector::{Command, Inspector, InspectorOptions};
use tsoft_devtools::{GuiOptions, run_gui, statics};

/// T-Soft Devtools: inspect debug variables of a T-Soft page open in Chrome.
#[derive(Parser, Debug)]
#[command(name = "tsoft-devtools", version, about)]
struct Cli {
    /// DevTools host of a browser started with --remote-debugging-port
    #[arg(long)]
    host: Option<String>,

    /// DevTools port
    #[arg(long)]
    port: Option<u16>,

    /// Connect to this page WebSocket directly instead of discovering one
    #[arg(long)]
    ws_url: Option<String>,

    /// Pick the first page whose URL contains this text
    #[arg(long)]
    target: Option<String>,

    /// Inspect the page even without the T-Soft copyright meta tag
    #[arg(long)]
    skip_meta_check: bool,

    /// Start with this theme instead of the saved one
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let settings_path = Settings::default_path();
    let mut settings = Settings::load_or_default(settings_path.as_deref());
    let host = cli
        .host
        .or_else(|| settings.host.clone())
        .unwrap_or_else(|| statics::DEFAULT_DEVTOOLS_HOST.to_string());
    let port = cli.port.or(settings.port).unwrap_or(statics::DEFAULT_DEVTOOLS_PORT);
    let theme = cli
        .theme
        .map(Theme::from)
        .unwrap_or_else(|| settings.effective_theme());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let ws_url = match cli.ws_url {
        Some(url) => url,
        None => runtime
            .block_on(cdp::discover_target(&host, port, cli.target.as_deref()))
            .context("finding a page to inspect")?,
    };
    let (evaluator, events) = runtime
        .block_on(CdpEvaluator::connect(&ws_url))
        .context("connecting to the inspected page")?;

    settings.host = Some(host);
    settings.port = Some(port);
    if let Some(path) = &settings_path
        && let Err(e) = settings.save(path)
    {
        tracing::warn!(error = %format!("{e:#}"), "could not save settings");
    }

    let options = InspectorOptions {
        require_meta_tag: settings.require_meta_tag && !cli.skip_meta_check,
        ..InspectorOptions::default()
    };
    let (inspector, handle) = Inspector::new(evaluator, options);
    let inspector_task = runtime.spawn(inspector.run());
    runtime.spawn(cdp::forward_navigations(events, handle.clone()));

    let result = run_gui(GuiOptions {
        inspector: handle.clone(),
        runtime: runtime.handle().clone(),
        settings,
        settings_path,
        theme,
    });

    handle.send(Command::Shutdown);
    if let Err(e) = runtime.block_on(inspector_task) {
        tracing::warn!(error = %e, "inspector task ended abnormally");
    }
    result.map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
