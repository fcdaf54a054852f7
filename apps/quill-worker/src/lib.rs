pub mod dispatcher;

mod error;

pub use error::{Error, Result};

use clap::Parser;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use crate::dispatcher::WorkerState;
use quill_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = quill_cli::VERSION,
	rename_all = "kebab",
	styles = quill_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: quill_cli::ConfigArgs,
	/// Run a single dispatch cycle and exit.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = quill_config::load(&args.config.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let notifier = dispatcher::notifier_from_config(&config)?;
	let state = WorkerState { db, reminders: config.reminders, notifier };

	if args.once {
		let report = dispatcher::dispatch_due_reminders(&state, OffsetDateTime::now_utc()).await?;

		tracing::info!(?report, "Reminder dispatch finished.");

		return Ok(());
	}

	dispatcher::run_dispatcher(&state).await;

	Ok(())
}
