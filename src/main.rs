use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use barangay_verify::api::HttpVerificationClient;
use barangay_verify::config::VerifyConfig;
use barangay_verify::verification::{
    dispatch, poll_once, Notice, NoticeKind, Notifier, ReadingSource, SessionSeed, StatusReading,
    StatusStore, VerificationSession, View, ViewContext,
};
use barangay_verify::{init_config, init_telemetry, ShutdownCoordinator, VerificationApi};

#[derive(Parser)]
#[command(name = "barangay-verify")]
#[command(about = "Residency verification client for the barangay e-governance portal")]
#[command(long_about = "Check, follow and submit your barangay residency verification. \
                       Upload a proof-of-residency document, then use 'barangay-verify watch' \
                       to wait for the administrators' decision.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current verification status once
    Status,
    /// Follow the verification status until it is approved
    Watch,
    /// Upload a proof-of-residency document (JPG, PNG, WEBP or PDF)
    Upload {
        /// Document to upload
        file: PathBuf,
    },
    /// Query the status and profile endpoints immediately
    Refresh,
}

/// Prints notices as terminal banners
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, notice: &Notice) {
        let icon = match notice.kind {
            NoticeKind::Success => "🎉",
            NoticeKind::Error => "❌",
        };
        println!();
        println!("{icon} {}", notice.title);
        println!("{}", "─".repeat(notice.title.chars().count() + 3));
        println!("{}", notice.message);
        if notice.show_profile_button {
            println!("→ Complete your profile: /user/profile");
        }
        println!();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        show_getting_started();
        return Ok(());
    };

    let config = init_config()?;
    init_telemetry(&config.observability)?;

    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Status => runtime.block_on(status_command(config)),
        Commands::Watch => runtime.block_on(watch_command(config)),
        Commands::Upload { file } => runtime.block_on(upload_command(config, file)),
        Commands::Refresh => runtime.block_on(refresh_command(config)),
    }
}

fn show_getting_started() {
    println!("🏠 BARANGAY RESIDENCY VERIFICATION");
    println!();
    println!("📊 Quick start:");
    println!("   barangay-verify status          Show your verification status");
    println!("   barangay-verify upload <FILE>   Submit a proof-of-residency document");
    println!("   barangay-verify watch           Wait for the administrators' decision");
    println!("   barangay-verify refresh         Check again right now");
    println!();
    println!("🔑 Authenticate with: export BARANGAY_API_TOKEN=<your token>");
}

fn client(config: &VerifyConfig) -> Result<Arc<HttpVerificationClient>> {
    let client = HttpVerificationClient::new(&config.api)
        .context("Failed to create API client")?;
    Ok(Arc::new(client))
}

async fn status_command(config: &VerifyConfig) -> Result<()> {
    let api = client(config)?;
    let profile = api.fetch_profile().await?;

    let store = StatusStore::new(Arc::new(ConsoleNotifier));
    store.merge(StatusReading::from(&profile), ReadingSource::Profile);
    store.finish_loading();

    println!("{}", dispatch(&store.snapshot(), &ViewContext::new(&config.api.storage_url)));
    Ok(())
}

async fn refresh_command(config: &VerifyConfig) -> Result<()> {
    let api = client(config)?;
    let store = StatusStore::new(Arc::new(ConsoleNotifier));

    let outcome = poll_once(api.as_ref(), &store).await?;
    tracing::debug!(?outcome, "Refresh merged");
    store.finish_loading();

    println!("{}", dispatch(&store.snapshot(), &ViewContext::new(&config.api.storage_url)));
    Ok(())
}

async fn upload_command(config: &VerifyConfig, file: PathBuf) -> Result<()> {
    let api = client(config)?;
    let seed = SessionSeed {
        cached_profile: Some(api.fetch_profile().await?),
        ..SessionSeed::default()
    };

    let mut session = VerificationSession::new(api, Arc::new(ConsoleNotifier), config.polling.clone());
    session.mount(seed);

    let result = session.upload_file(&file).await;
    session.store().finish_loading();
    println!("{}", session.view(&config.api.storage_url));
    ShutdownCoordinator::shutdown_session(&mut session)?;

    result
        .map(|_| ())
        .with_context(|| format!("Upload of {} failed", file.display()))
}

async fn watch_command(config: &VerifyConfig) -> Result<()> {
    let api = client(config)?;
    let mut session = VerificationSession::new(api, Arc::new(ConsoleNotifier), config.polling.clone());

    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();

    session.mount(SessionSeed::default());
    let mut updates = session.subscribe();
    let mut last_seen = None;

    loop {
        let snapshot = session.store().snapshot();
        if last_seen.as_ref() != Some(&snapshot) {
            let view = session.view(&config.api.storage_url);
            println!("{view}\n");
            if matches!(view, View::Approved(_)) {
                session.acknowledge_approval();
                break;
            }
            last_seen = Some(snapshot);
        }

        tokio::select! {
            _ = shutdown.wait_for_shutdown() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    ShutdownCoordinator::shutdown_session(&mut session)
}
