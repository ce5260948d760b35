//! Deployment log commands and the live tail loop

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::CommandContext;
use crate::client::{KubernsApi, LogEntry};
use crate::error::Result;
use crate::output::print_list;
use crate::wizard::poller::{DeployState, LogWatcher};
use crate::wizard::POLL_INTERVAL;

/// Display format for log entries in table view
#[derive(Tabled, Serialize)]
struct LogDisplay {
    #[tabled(rename = "TIME")]
    time: String,

    #[tabled(rename = "MESSAGE")]
    message: String,
}

impl From<LogEntry> for LogDisplay {
    fn from(entry: LogEntry) -> Self {
        Self {
            time: entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            message: entry.message,
        }
    }
}

/// Run the logs command
pub async fn run(ctx: &CommandContext, instance_id: i64, follow: bool) -> Result<()> {
    if follow {
        let state = tail(Arc::clone(&ctx.client), instance_id).await?;
        if state == DeployState::Deployed {
            println!("\n{}", "Deployment completed successfully.".green());
        }
        return Ok(());
    }

    let entries = ctx.client.fetch_logs(instance_id).await?;
    let display: Vec<LogDisplay> = entries.into_iter().map(Into::into).collect();
    print_list(&display, ctx.format)
}

/// Clamp the printed prefix to the snapshot length and return the unseen
/// suffix. Snapshots replace each other wholesale; a restated shorter tail
/// resets the prefix so the restated lines still print.
fn unseen<'a>(printed: &mut usize, entries: &'a [LogEntry]) -> &'a [LogEntry] {
    *printed = (*printed).min(entries.len());
    let fresh = &entries[*printed..];
    *printed = entries.len();
    fresh
}

/// Tail deployment logs until a terminal state or until the watcher ends.
///
/// Entries are printed incrementally; only lines beyond the already-printed
/// prefix appear.
pub async fn tail<C>(client: Arc<C>, instance_id: i64) -> Result<DeployState>
where
    C: KubernsApi + 'static,
{
    let watcher = LogWatcher::spawn(client, instance_id, POLL_INTERVAL);
    let mut updates = watcher.subscribe();

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Waiting for deployment logs...");

    let mut printed = 0;
    let state = loop {
        if updates.changed().await.is_err() {
            // Watcher ended without a further update
            break watcher.snapshot().state;
        }
        let snapshot = updates.borrow_and_update().clone();

        for entry in unseen(&mut printed, &snapshot.entries) {
            spinner.println(format!(
                "{}  {}",
                entry
                    .created_at
                    .format("%H:%M:%S")
                    .to_string()
                    .dimmed(),
                entry.message
            ));
        }

        if snapshot.state != DeployState::Deploying {
            break snapshot.state;
        }
    };

    spinner.finish_and_clear();
    watcher.cancel();
    Ok(state)
}
