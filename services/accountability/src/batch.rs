//! Nightly accountability jobs
//!
//! Goal non-compliance turns into in-game penalties once per day: every
//! goal that is neither completed nor checked in costs its owner one
//! building. A reset sweep then clears the day's check-ins, and goals whose
//! target date has arrived are completed automatically.

use crate::config::BatchSettings;
use crate::store::AccountabilityStore;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Outcome of one penalty pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PenaltyReport {
    /// Distinct goal owners examined
    pub users_seen: usize,
    /// Users that lost at least one building
    pub users_penalized: usize,
    /// Users skipped because their iteration failed
    pub users_skipped: usize,
    /// Buildings destroyed across all users
    pub buildings_destroyed: usize,
    /// Check-in flags cleared at the end of the pass
    pub checkins_cleared: u64,
}

/// The nightly batch: penalty pass, reset sweep, auto-completion
///
/// All three jobs share one injected store handle and one run guard; an
/// invocation that overlaps a still-running one is skipped with a warning
/// instead of racing it.
#[derive(Clone)]
pub struct AccountabilityBatch {
    store: Arc<dyn AccountabilityStore>,
    run_guard: Arc<Mutex<()>>,
}

impl AccountabilityBatch {
    /// Create a new batch over the given store
    pub fn new(store: Arc<dyn AccountabilityStore>) -> Self {
        Self {
            store,
            run_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Run the penalty pass: destroy one building per unmet goal, per user
    ///
    /// Users are processed sequentially; a failure for one user is logged
    /// and skipped without aborting the rest. The pass ends by clearing all
    /// check-in flags, so the read of the flags and their reset happen in
    /// the same run.
    pub async fn run_penalty(&self) -> Result<PenaltyReport> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Previous batch run still in progress, skipping penalty pass");
            return Ok(PenaltyReport::default());
        };

        let user_ids = self.store.goal_owner_ids().await?;
        info!("Running penalty pass over {} goal owners", user_ids.len());

        let mut report = PenaltyReport {
            users_seen: user_ids.len(),
            ..Default::default()
        };

        for user_id in user_ids {
            match self.penalize_user(user_id).await {
                Ok(destroyed) if destroyed.is_empty() => {}
                Ok(destroyed) => {
                    report.users_penalized += 1;
                    report.buildings_destroyed += destroyed.len();
                }
                Err(e) => {
                    error!("Penalty pass failed for user {}: {}", user_id, e);
                    report.users_skipped += 1;
                }
            }
        }

        match self.store.clear_checkins().await {
            Ok(cleared) => report.checkins_cleared = cleared,
            Err(e) => error!("Failed to clear check-in flags after penalty pass: {}", e),
        }

        info!(
            "Penalty pass done: {} buildings destroyed across {} of {} users ({} skipped)",
            report.buildings_destroyed, report.users_penalized, report.users_seen,
            report.users_skipped
        );
        Ok(report)
    }

    /// Destroy up to one building per unmet goal for a single user
    ///
    /// A user with fewer standing buildings than unmet goals loses only
    /// what they have; the remainder is not carried forward.
    async fn penalize_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let failed = self.store.unmet_goal_count(user_id).await?;
        if failed == 0 {
            return Ok(Vec::new());
        }

        let destroyed = self.store.destroy_buildings(user_id, failed).await?;
        info!(
            "User {} missed {} goals, destroyed {} buildings",
            user_id,
            failed,
            destroyed.len()
        );

        Ok(destroyed)
    }

    /// Clear the check-in flag on every goal
    ///
    /// Idempotent sweep behind the penalty pass; also catches goals checked
    /// in between the two runs.
    pub async fn run_reset(&self) -> Result<u64> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Previous batch run still in progress, skipping reset sweep");
            return Ok(0);
        };

        let cleared = self.store.clear_checkins().await?;
        info!("Reset sweep cleared {} check-in flags", cleared);
        Ok(cleared)
    }

    /// Complete every unfinished goal whose target date is `today`
    pub async fn run_autocompletion(&self, today: NaiveDate) -> Result<u64> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Previous batch run still in progress, skipping auto-completion");
            return Ok(0);
        };

        let completed = self.store.complete_due_goals(today).await?;
        info!("Auto-completed {} goals due {}", completed, today);
        Ok(completed)
    }

    /// Register the three nightly jobs on a scheduler and start it
    pub async fn start_schedule(&self, settings: &BatchSettings) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new().await?;

        let batch = self.clone();
        let penalty_job = Job::new_async(settings.penalty_schedule.as_str(), move |_, _| {
            let batch = batch.clone();
            Box::pin(async move {
                info!("Penalty job fired");
                if let Err(e) = batch.run_penalty().await {
                    error!("Penalty job failed: {}", e);
                }
            })
        })?;
        scheduler.add(penalty_job).await?;

        let batch = self.clone();
        let reset_job = Job::new_async(settings.reset_schedule.as_str(), move |_, _| {
            let batch = batch.clone();
            Box::pin(async move {
                info!("Reset job fired");
                if let Err(e) = batch.run_reset().await {
                    error!("Reset job failed: {}", e);
                }
            })
        })?;
        scheduler.add(reset_job).await?;

        let batch = self.clone();
        let autocomplete_job =
            Job::new_async(settings.autocomplete_schedule.as_str(), move |_, _| {
                let batch = batch.clone();
                Box::pin(async move {
                    info!("Auto-completion job fired");
                    let today = Local::now().date_naive();
                    if let Err(e) = batch.run_autocompletion(today).await {
                        error!("Auto-completion job failed: {}", e);
                    }
                })
            })?;
        scheduler.add(autocomplete_job).await?;

        scheduler.start().await?;

        info!(
            "Registered nightly jobs: penalty [{}], reset [{}], auto-completion [{}]",
            settings.penalty_schedule, settings.reset_schedule, settings.autocomplete_schedule
        );
        Ok(scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct MemGoal {
        user_id: Uuid,
        is_completed: bool,
        accountability: bool,
        target_date: Option<NaiveDate>,
    }

    struct MemBuilding {
        id: Uuid,
        user_id: Uuid,
        destroyed: bool,
        // Stands in for created_at ordering.
        seq: u32,
    }

    #[derive(Default)]
    struct MemStore {
        goals: StdMutex<Vec<MemGoal>>,
        buildings: StdMutex<Vec<MemBuilding>>,
        fail_user: Option<Uuid>,
    }

    impl MemStore {
        fn with_goal(self, user_id: Uuid, is_completed: bool, accountability: bool) -> Self {
            self.with_dated_goal(user_id, is_completed, accountability, None)
        }

        fn with_dated_goal(
            self,
            user_id: Uuid,
            is_completed: bool,
            accountability: bool,
            target_date: Option<NaiveDate>,
        ) -> Self {
            self.goals.lock().unwrap().push(MemGoal {
                user_id,
                is_completed,
                accountability,
                target_date,
            });
            self
        }

        fn with_building(self, user_id: Uuid, destroyed: bool) -> Self {
            let mut buildings = self.buildings.lock().unwrap();
            let seq = buildings.len() as u32;
            buildings.push(MemBuilding {
                id: Uuid::new_v4(),
                user_id,
                destroyed,
                seq,
            });
            drop(buildings);
            self
        }

        fn standing_count(&self, user_id: Uuid) -> usize {
            self.buildings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.user_id == user_id && !b.destroyed)
                .count()
        }

        fn checkin_count(&self) -> usize {
            self.goals
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.accountability)
                .count()
        }
    }

    #[async_trait]
    impl AccountabilityStore for MemStore {
        async fn goal_owner_ids(&self) -> Result<Vec<Uuid>> {
            let mut ids: Vec<Uuid> = Vec::new();
            for goal in self.goals.lock().unwrap().iter() {
                if !ids.contains(&goal.user_id) {
                    ids.push(goal.user_id);
                }
            }
            Ok(ids)
        }

        async fn unmet_goal_count(&self, user_id: Uuid) -> Result<i64> {
            if self.fail_user == Some(user_id) {
                bail!("storage offline");
            }

            let count = self
                .goals
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == user_id && !g.is_completed && !g.accountability)
                .count();
            Ok(count as i64)
        }

        async fn destroy_buildings(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>> {
            let mut buildings = self.buildings.lock().unwrap();
            let mut candidates: Vec<&mut MemBuilding> = buildings
                .iter_mut()
                .filter(|b| b.user_id == user_id && !b.destroyed)
                .collect();
            candidates.sort_by_key(|b| b.seq);

            let mut destroyed = Vec::new();
            for building in candidates.into_iter().take(limit as usize) {
                building.destroyed = true;
                destroyed.push(building.id);
            }
            Ok(destroyed)
        }

        async fn clear_checkins(&self) -> Result<u64> {
            let mut cleared = 0;
            for goal in self.goals.lock().unwrap().iter_mut() {
                if goal.accountability {
                    goal.accountability = false;
                    cleared += 1;
                }
            }
            Ok(cleared)
        }

        async fn complete_due_goals(&self, today: NaiveDate) -> Result<u64> {
            let mut completed = 0;
            for goal in self.goals.lock().unwrap().iter_mut() {
                if goal.target_date == Some(today) && !goal.is_completed {
                    goal.is_completed = true;
                    completed += 1;
                }
            }
            Ok(completed)
        }
    }

    fn batch_over(store: MemStore) -> (AccountabilityBatch, Arc<MemStore>) {
        let store = Arc::new(store);
        (AccountabilityBatch::new(store.clone()), store)
    }

    #[tokio::test]
    async fn compliant_user_keeps_all_buildings() {
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, true, false)
            .with_goal(user, false, true)
            .with_building(user, false)
            .with_building(user, false);
        let (batch, store) = batch_over(store);

        let report = batch.run_penalty().await.unwrap();

        assert_eq!(report.buildings_destroyed, 0);
        assert_eq!(report.users_penalized, 0);
        assert_eq!(store.standing_count(user), 2);
    }

    #[tokio::test]
    async fn one_unmet_goal_costs_one_building() {
        // User with goals [failed, completed] and buildings
        // [active, active, destroyed]: exactly one building falls.
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, false, false)
            .with_goal(user, true, false)
            .with_building(user, false)
            .with_building(user, false)
            .with_building(user, true);
        let (batch, store) = batch_over(store);

        let report = batch.run_penalty().await.unwrap();

        assert_eq!(report.buildings_destroyed, 1);
        assert_eq!(report.users_penalized, 1);
        assert_eq!(store.standing_count(user), 1);
    }

    #[tokio::test]
    async fn penalty_is_capped_at_available_buildings() {
        // Three unmet goals but a single standing building: the user loses
        // that one building and the remainder is dropped without error.
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, false, false)
            .with_goal(user, false, false)
            .with_goal(user, false, false)
            .with_building(user, false);
        let (batch, store) = batch_over(store);

        let report = batch.run_penalty().await.unwrap();

        assert_eq!(report.buildings_destroyed, 1);
        assert_eq!(report.users_skipped, 0);
        assert_eq!(store.standing_count(user), 0);
    }

    #[tokio::test]
    async fn oldest_buildings_fall_first() {
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, false, false)
            .with_building(user, false)
            .with_building(user, false);
        let (batch, store) = batch_over(store);

        batch.run_penalty().await.unwrap();

        let buildings = store.buildings.lock().unwrap();
        assert!(buildings[0].destroyed);
        assert!(!buildings[1].destroyed);
    }

    #[tokio::test]
    async fn penalty_pass_clears_checkin_flags() {
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, false, true)
            .with_goal(user, false, true);
        let (batch, store) = batch_over(store);

        let report = batch.run_penalty().await.unwrap();

        assert_eq!(report.checkins_cleared, 2);
        assert_eq!(store.checkin_count(), 0);
    }

    #[tokio::test]
    async fn failing_user_does_not_abort_the_pass() {
        let broken_user = Uuid::new_v4();
        let healthy_user = Uuid::new_v4();
        let mut store = MemStore::default()
            .with_goal(broken_user, false, false)
            .with_goal(healthy_user, false, false)
            .with_building(broken_user, false)
            .with_building(healthy_user, false);
        store.fail_user = Some(broken_user);
        let (batch, store) = batch_over(store);

        let report = batch.run_penalty().await.unwrap();

        assert_eq!(report.users_skipped, 1);
        assert_eq!(report.users_penalized, 1);
        assert_eq!(store.standing_count(broken_user), 1);
        assert_eq!(store.standing_count(healthy_user), 0);
    }

    #[tokio::test]
    async fn reset_sweep_is_idempotent() {
        let user = Uuid::new_v4();
        let store = MemStore::default()
            .with_goal(user, false, true)
            .with_goal(user, true, true);
        let (batch, store) = batch_over(store);

        let first = batch.run_reset().await.unwrap();
        let second = batch.run_reset().await.unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(store.checkin_count(), 0);
    }

    #[tokio::test]
    async fn autocompletion_flips_only_due_unfinished_goals() {
        let user = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let store = MemStore::default()
            .with_dated_goal(user, false, false, Some(today))
            .with_dated_goal(user, true, false, Some(today))
            .with_dated_goal(user, false, false, Some(tomorrow))
            .with_dated_goal(user, false, false, None);
        let (batch, store) = batch_over(store);

        let completed = batch.run_autocompletion(today).await.unwrap();

        assert_eq!(completed, 1);
        let goals = store.goals.lock().unwrap();
        assert!(goals[0].is_completed);
        assert!(goals[1].is_completed);
        assert!(!goals[2].is_completed);
        assert!(!goals[3].is_completed);
    }
}
