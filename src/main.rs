use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mri_lense_lib::cli::{AnalyzeArgs, Cli, Commands};
use mri_lense_lib::commands::export::export_activation_maps;
use mri_lense_lib::commands::session::AnalysisSession;
use mri_lense_lib::report::json::render_screen_json;
use mri_lense_lib::report::text::render_screen_text;
use mri_lense_lib::services::analysis::client::{ClassifyTransport, HttpTransport};
use mri_lense_lib::services::analysis::controller::AnalysisState;
use mri_lense_lib::services::content::ContentTables;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze(args) => analyze(&cli, args).await,
        Commands::Health => {
            let config = cli.client_config(false);
            let transport = HttpTransport::new(&config)?;
            let value = transport
                .health()
                .await
                .with_context(|| format!("health probe against {} failed", transport.base_url()))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

async fn analyze(cli: &Cli, args: &AnalyzeArgs) -> Result<()> {
    let content = ContentTables::builtin()?;
    let config = cli.client_config(args.gradcam);
    tracing::info!(base_url = %config.base_url, gradcam = config.gradcam, "client configured");

    let transport = HttpTransport::new(&config)?;
    let mut session = AnalysisSession::new(transport, config.analysis_options(), content);

    session
        .select_path(&args.file)
        .with_context(|| format!("cannot stage {}", args.file.display()))?;
    session.analyze()?;
    let settled = session.wait_for_completion().await;

    session.select_tab(args.tab);
    let screen = session.screen();
    if args.json {
        println!("{}", render_screen_json(&screen)?);
    } else {
        print!("{}", render_screen_text(&screen));
    }

    if let (Some(dir), Some(views)) = (&args.maps_dir, session.views()) {
        let written = export_activation_maps(&views, dir).await?;
        tracing::info!(count = written.len(), dir = %dir.display(), "result images written");
    }

    if let AnalysisState::Failed { reason, .. } = settled {
        anyhow::bail!("analysis failed: {}", reason);
    }
    Ok(())
}
