//! Best-effort activity recording.

use tracing::warn;

use warden_database::store::ActivityLogStore;
use warden_entity::activity::CreateActivityLog;

/// Append `entry`, logging instead of failing when the store errors.
pub(crate) async fn record(store: &dyn ActivityLogStore, entry: CreateActivityLog) {
    if let Err(e) = store.append(&entry).await {
        warn!(
            user_id = %entry.user_id,
            action = %entry.action,
            error = %e,
            "Failed to record activity"
        );
    }
}
