//! Group fan-out.

use std::sync::Arc;

use {
    futures::future,
    tokio::sync::Semaphore,
    tracing::{debug, info, warn},
};

use {teamline_store::MembershipStore, teamline_twilio::MessageSender};

/// Result of one fan-out: how many recipients were contacted, and how many
/// deliveries completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub attempted: usize,
    pub delivered: usize,
}

/// Send `message` to every member of `group` except `exclude_phone`.
///
/// Deliveries run concurrently under a permit bound so a large group cannot
/// storm the provider. Each send is independent and at-most-once: one
/// failure never aborts the rest, and failures are not retried here. The
/// member listing itself fails closed; callers report that to the sender.
pub async fn broadcast(
    store: &dyn MembershipStore,
    sender: &dyn MessageSender,
    group: &str,
    message: &str,
    exclude_phone: &str,
    concurrency: usize,
) -> anyhow::Result<BroadcastOutcome> {
    let recipients = store.list_group_members(group, exclude_phone).await?;
    if recipients.is_empty() {
        debug!(group, "no recipients for broadcast");
        return Ok(BroadcastOutcome { attempted: 0, delivered: 0 });
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let sends = recipients.iter().map(|user| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.ok();
            match sender.send(&user.phone_number, message).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(group, to = %user.phone_number, error = %e, "broadcast delivery failed");
                    false
                },
            }
        }
    });

    let results = future::join_all(sends).await;
    let delivered = results.into_iter().filter(|ok| *ok).count();
    info!(group, attempted = recipients.len(), delivered, "broadcast complete");

    Ok(BroadcastOutcome {
        attempted: recipients.len(),
        delivered,
    })
}
