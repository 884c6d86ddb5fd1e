//! Dashboard aggregates: account totals, role distribution, recent
//! activity, and daily sign-ups. Calendar days are UTC.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use warden_core::result::AppResult;
use warden_database::Stores;
use warden_database::store::{ActivityLogStore, RoleStore, UserStore};
use warden_entity::activity::ActivityLog;
use warden_entity::role::RoleUserCount;
use warden_entity::user::DailySignups;

/// Entries returned when no limit is given.
pub const DEFAULT_ACTIVITY_LIMIT: u64 = 20;
/// Largest accepted activity limit.
pub const MAX_ACTIVITY_LIMIT: u64 = 100;
/// Analytics window when none is given.
pub const DEFAULT_ANALYTICS_DAYS: u32 = 30;
/// Longest accepted analytics window.
pub const MAX_ANALYTICS_DAYS: u32 = 365;

/// Headline account counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    /// Accounts created since midnight UTC.
    pub new_users_today: u64,
    /// Accounts created in the last seven days.
    pub new_users_this_week: u64,
    pub total_roles: u64,
}

/// Computes dashboard aggregates from the stores.
#[derive(Clone)]
pub struct DashboardService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    activity: Arc<dyn ActivityLogStore>,
}

impl std::fmt::Debug for DashboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService").finish_non_exhaustive()
    }
}

impl DashboardService {
    /// Creates a new dashboard service.
    pub fn new(stores: &Stores) -> Self {
        Self {
            users: stores.users.clone(),
            roles: stores.roles.clone(),
            activity: stores.activity.clone(),
        }
    }

    /// Account and role totals as of now.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.stats_at(Utc::now()).await
    }

    /// Account and role totals as of `now`.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
        Ok(DashboardStats {
            total_users: self.users.count().await?,
            active_users: self.users.count_by_active(true).await?,
            inactive_users: self.users.count_by_active(false).await?,
            new_users_today: self.users.count_created_since(midnight).await?,
            new_users_this_week: self.users.count_created_since(now - Duration::days(7)).await?,
            total_roles: self.roles.count().await?,
        })
    }

    /// Holders per role, roles nobody holds included.
    pub async fn role_distribution(&self) -> AppResult<Vec<RoleUserCount>> {
        self.roles.user_counts().await
    }

    /// Newest activity across every user.
    pub async fn recent_activity(&self, limit: u64) -> AppResult<Vec<ActivityLog>> {
        self.activity
            .recent(limit.clamp(1, MAX_ACTIVITY_LIMIT))
            .await
    }

    /// Sign-ups per day over the last `days` days, today included.
    pub async fn user_analytics(&self, days: u32) -> AppResult<Vec<DailySignups>> {
        self.user_analytics_until(days, Utc::now().date_naive()).await
    }

    /// Sign-ups per day for the `days` days ending on `today`. Days without
    /// sign-ups are reported as zero.
    pub async fn user_analytics_until(
        &self,
        days: u32,
        today: NaiveDate,
    ) -> AppResult<Vec<DailySignups>> {
        let days = days.clamp(1, MAX_ANALYTICS_DAYS);
        let first = today - Duration::days(i64::from(days) - 1);
        let since = first.and_time(chrono::NaiveTime::MIN).and_utc();
        let counted = self.users.signups_per_day(since).await?;

        Ok(first
            .iter_days()
            .take(days as usize)
            .map(|date| DailySignups {
                date,
                user_count: counted
                    .iter()
                    .find(|d| d.date == date)
                    .map_or(0, |d| d.user_count),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_entity::activity::CreateActivityLog;

    use crate::testing::Fixture;

    #[tokio::test]
    async fn test_stats_count_accounts() {
        let f = Fixture::new();
        f.user("Admin", "ann", "password1").await;
        let user = f.user("User", "uma", "password1").await;
        f.user("User", "ulf", "password1").await;
        UserStore::set_active(&f.memory, user, false).await.expect("deactivate");
        let svc = DashboardService::new(&f.stores);

        let stats = svc.stats().await.expect("stats");
        assert_eq!(
            stats,
            DashboardStats {
                total_users: 3,
                active_users: 2,
                inactive_users: 1,
                new_users_today: 3,
                new_users_this_week: 3,
                total_roles: 4,
            }
        );

        let later = svc
            .stats_at(Utc::now() + Duration::days(8))
            .await
            .expect("stats");
        assert_eq!(later.new_users_today, 0);
        assert_eq!(later.new_users_this_week, 0);
    }

    #[tokio::test]
    async fn test_role_distribution_includes_empty_roles() {
        let f = Fixture::new();
        f.user("Manager", "mia", "password1").await;
        f.user("Manager", "max", "password1").await;

        let counts = DashboardService::new(&f.stores)
            .role_distribution()
            .await
            .expect("distribution");
        assert_eq!(counts.len(), 4);
        let manager = counts.iter().find(|c| c.role_name == "Manager").expect("manager");
        assert_eq!(manager.user_count, 2);
        let user = counts.iter().find(|c| c.role_name == "User").expect("user");
        assert_eq!(user.user_count, 0);
    }

    #[tokio::test]
    async fn test_recent_activity_is_clamped() {
        let f = Fixture::new();
        let id = f.user("User", "uma", "password1").await;
        for i in 0..3 {
            let entry = CreateActivityLog::new(id, "login", "auth", format!("#{i}"));
            ActivityLogStore::append(&f.memory, &entry).await.expect("append");
        }
        let svc = DashboardService::new(&f.stores);

        let recent = svc.recent_activity(2).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].details, "#2");
        assert_eq!(svc.recent_activity(0).await.expect("recent").len(), 1);
    }

    #[tokio::test]
    async fn test_analytics_fills_missing_days() {
        let f = Fixture::new();
        f.user("User", "uma", "password1").await;
        f.user("User", "ulf", "password1").await;
        let today = Utc::now().date_naive();

        let series = DashboardService::new(&f.stores)
            .user_analytics_until(7, today)
            .await
            .expect("analytics");
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, today - Duration::days(6));
        assert!(series[..6].iter().all(|d| d.user_count == 0));
        assert_eq!(series[6], DailySignups { date: today, user_count: 2 });
    }
}
