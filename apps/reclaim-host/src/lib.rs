pub mod protocol;

use std::{future, path::PathBuf};

use clap::Parser;
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
	time::{self, Instant},
};
use tracing_subscriber::EnvFilter;

use crate::protocol::HostAction;
use reclaim_config::Config;
use reclaim_service::{DocumentStore, Tracker, TrackerConfig, WorldMirror};
use reclaim_storage::{FileStore, documents, retention};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", default_value = "reclaim.toml")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = reclaim_config::load_or_init(&args.config)?;
	init_tracing(&config);

	let documents = FileStore::open(config.storage.recoveries_dir())?;
	let cutoff = retention::cutoff_millis(documents::now_millis(), config.retention.days);
	match retention::sweep(&documents, cutoff) {
		Ok(swept) => tracing::info!(
			scanned = swept.scanned,
			deleted = swept.deleted.len(),
			unreadable = swept.unreadable,
			failed = swept.failed,
			"Retention sweep finished."
		),
		Err(err) => tracing::error!(error = %err, "Retention sweep failed."),
	}

	let mut tracker = Tracker::new(TrackerConfig::from(&config), WorldMirror::new(), documents);
	let loaded = tracker.load_persisted()?;
	tracing::info!(
		participants = loaded.participants,
		records = loaded.records,
		migrated = loaded.migrated,
		failed = loaded.failed,
		"Loaded tracked items."
	);

	serve(&mut tracker, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Feeds host events into `tracker` until `input` closes or the process is interrupted, firing
/// due tasks in between, then flushes everything.
///
/// Lines that are not UTF-8 are skipped like any other malformed line. A read or write failure
/// ends the loop, but tracked items are still flushed before the error is returned.
pub async fn serve<D, R, W>(
	tracker: &mut Tracker<WorldMirror, D>,
	input: R,
	mut output: W,
) -> color_eyre::Result<()>
where
	D: DocumentStore,
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let started = Instant::now();
	let mut segments = BufReader::new(input).split(b'\n');
	let interrupt = tokio::signal::ctrl_c();
	tokio::pin!(interrupt);

	let outcome: color_eyre::Result<()> = loop {
		let deadline = tracker.next_deadline().map(|deadline| started + deadline);

		tokio::select! {
			segment = segments.next_segment() => {
				let segment = match segment {
					Ok(Some(segment)) => segment,
					Ok(None) => {
						tracing::info!("Host input closed.");
						break Ok(());
					},
					Err(err) => break Err(err.into()),
				};

				tracker.advance_to(started.elapsed());

				let Ok(line) = String::from_utf8(segment) else {
					tracing::warn!("Skipping host line that is not valid UTF-8.");
					continue;
				};
				let actions = protocol::handle_line(tracker, &line);

				if let Err(err) = write_actions(&mut output, &actions).await {
					break Err(err);
				}
			},
			_ = wait_until(deadline) => tracker.advance_to(started.elapsed()),
			_ = &mut interrupt => {
				tracing::info!("Interrupted.");
				break Ok(());
			},
		}
	};

	tracker.shutdown();

	let flushed = output.flush().await;

	outcome?;
	flushed?;

	Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => time::sleep_until(deadline).await,
		None => future::pending().await,
	}
}

async fn write_actions<W>(output: &mut W, actions: &[HostAction]) -> color_eyre::Result<()>
where
	W: AsyncWrite + Unpin,
{
	for action in actions {
		let mut line = match serde_json::to_string(action) {
			Ok(line) => line,
			Err(err) => {
				tracing::error!(error = %err, "Dropping host action that cannot be encoded.");

				continue;
			},
		};
		line.push('\n');

		output.write_all(line.as_bytes()).await?;
	}

	if !actions.is_empty() {
		output.flush().await?;
	}

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
