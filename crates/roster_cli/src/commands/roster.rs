use std::path::Path;
use std::sync::Arc;

use miette::Result;
use roster_core::config::RosterConfig;
use roster_core::snapshot::{self, RosterSnapshot};
use roster_core::{StateUpdateHub, User, UserId, UserList};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::output::Output;

/// Build a user list from a snapshot and replay any recorded updates into it.
///
/// The hub is returned alongside the list so the subscription stays live for
/// as long as the caller holds both.
async fn replay(
    snapshot_path: &Path,
    updates_path: Option<&Path>,
    config: &RosterConfig,
) -> Result<(Arc<StateUpdateHub>, UserList)> {
    let snapshot = RosterSnapshot::load(snapshot_path).await?;
    let hub = Arc::new(StateUpdateHub::new());
    let list = snapshot.build(hub.as_ref());

    if let Some(path) = updates_path {
        let updates = snapshot::load_updates(path).await?;
        let (tx, rx) = mpsc::channel(config.feed.channel_capacity);

        let producer = tokio::spawn(async move {
            for update in updates {
                if tx.send(update).await.is_err() {
                    break;
                }
            }
        });

        let delivered = hub.pump(ReceiverStream::new(rx)).await;
        if let Err(e) = producer.await {
            tracing::warn!("Update producer ended abnormally: {}", e);
        }
        tracing::info!("Replayed {} state update(s) from {}", delivered, path.display());
    }

    Ok((hub, list))
}

/// Self first, then alphabetical by display name
fn sorted_users(list: &UserList) -> Vec<User> {
    let mut users = list.all();
    users.sort_by(|a, b| {
        b.is_self
            .cmp(&a.is_self)
            .then_with(|| a.full_name.cmp(&b.full_name))
            .then_with(|| a.id().cmp(b.id()))
    });
    users
}

pub async fn list(
    snapshot_path: &Path,
    updates_path: Option<&Path>,
    config: &RosterConfig,
) -> Result<()> {
    let output = Output::new();
    let (_hub, list) = replay(snapshot_path, updates_path, config).await?;

    output.section(&format!("Users ({})", list.len()));
    for user in sorted_users(&list) {
        output.user_row(&user);
    }

    Ok(())
}

pub async fn get(
    id: &str,
    snapshot_path: &Path,
    updates_path: Option<&Path>,
    config: &RosterConfig,
) -> Result<()> {
    let output = Output::new();
    let user_id: UserId = id.parse()?;
    let (_hub, list) = replay(snapshot_path, updates_path, config).await?;

    let handle = list.get(&user_id);
    let user = handle.read();
    output.section(&user.full_name);
    if !handle.is_registered() {
        output.warning(&format!("{} is not in the roster", user_id));
    }
    output.user_details(&user);

    Ok(())
}
