use clap::Parser;

use logpane_tui::{
    app::App,
    cli::Cli,
    config::Config,
    page::{LogsPage, PageOptions},
    tail::Source,
    theme,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    cli.apply(&mut config);

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; otherwise the config's directive.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("logpane log: {}", log_path.display());
    tracing::info!("logpane starting…");

    let sources = cli.sources();
    if sources.iter().filter(|s| **s == Source::Stdin).count() > 1 {
        anyhow::bail!("stdin can only be read once");
    }
    tracing::info!("sources: {:?}", sources);

    // ── Build page ───────────────────────────────────────────────────────────
    let mut page = LogsPage::new(PageOptions {
        descending: config.view.descending,
        context: config.view.context,
        wrap: config.view.wrap,
        timestamps: config.view.timestamps,
        sources: config.view.sources,
        ..PageOptions::default()
    });
    if let Some((text, regex)) = cli.initial_filter() {
        page.apply_filter(text, regex);
    }

    let theme = if config.view.color {
        theme::Theme::default()
    } else {
        theme::monochrome()
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    App::new(page, theme).run(sources, config.tail.clone()).await?;

    tracing::info!("logpane exiting");
    Ok(())
}
