//! Per-phone message cap on the engine path.

use tracing::warn;

use teamline_store::MembershipStore;

/// Whether the sender is still under their message cap.
///
/// A non-positive limit disables the cap. Store errors fail open: a usage
/// counter is not worth blocking a paying user over.
pub async fn check_allowance(store: &dyn MembershipStore, phone: &str, limit: i64) -> bool {
    if limit <= 0 {
        return true;
    }
    match store.get_usage(phone).await {
        Ok(count) => count < limit,
        Err(e) => {
            warn!(phone, error = %e, "usage lookup failed, allowing");
            true
        },
    }
}

/// Count one engine turn. Best-effort.
pub async fn note_usage(store: &dyn MembershipStore, phone: &str) {
    if let Err(e) = store.increment_usage(phone).await {
        warn!(phone, error = %e, "usage increment failed");
    }
}
