//! Dashboard synchronizers.
//!
//! A dashboard holds one wholesale snapshot of the merged issue list plus
//! the assignment mapping. A recurring schedule re-pulls the snapshot on a
//! fixed cadence, and regaining focus triggers the same refresh. Refreshes
//! are not coalesced: whichever completion lands last owns the snapshot,
//! with no sequence numbering.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::engine::Engine;
use crate::error::Result;
use crate::model::{AssignmentRecord, Issue, IssueId, Status};

/// A running recurring task. Cancelling detaches the timer; dropping the
/// handle cancels too, so a torn-down view cannot orphan its timer.
pub trait ScheduleHandle: Send {
    fn cancel(&self);
}

/// Source of recurring ticks. Production uses [`ThreadSchedule`]; tests
/// drive [`ManualSchedule`] by hand.
pub trait Schedule: Send + Sync {
    fn every(&self, interval: Duration, tick: Arc<dyn Fn() + Send + Sync>)
    -> Box<dyn ScheduleHandle>;
}

/// Timer thread backed schedule.
#[derive(Debug, Default)]
pub struct ThreadSchedule;

struct ThreadHandle {
    state: Arc<(Mutex<bool>, Condvar)>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadHandle {
    fn stop(&self) {
        let (stopped, signal) = &*self.state;
        *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        signal.notify_all();
        if let Some(thread) = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = thread.join();
        }
    }
}

impl ScheduleHandle for ThreadHandle {
    fn cancel(&self) {
        self.stop();
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Schedule for ThreadSchedule {
    fn every(
        &self,
        interval: Duration,
        tick: Arc<dyn Fn() + Send + Sync>,
    ) -> Box<dyn ScheduleHandle> {
        let state = Arc::new((Mutex::new(false), Condvar::new()));
        let shared = Arc::clone(&state);
        let thread = std::thread::spawn(move || {
            let (stopped, signal) = &*shared;
            let mut guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                // A stop raised while a tick ran has already consumed its
                // notify; re-check before waiting out another interval.
                if *guard {
                    return;
                }
                let (next, timeout) = signal
                    .wait_timeout(guard, interval)
                    .unwrap_or_else(PoisonError::into_inner);
                guard = next;
                if *guard {
                    return;
                }
                if timeout.timed_out() {
                    drop(guard);
                    tick();
                    guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);
                }
            }
        });
        Box::new(ThreadHandle {
            state,
            thread: Mutex::new(Some(thread)),
        })
    }
}

/// Hand-cranked schedule for tests. `fire_all` runs every live tick once.
#[derive(Default)]
pub struct ManualSchedule {
    tasks: Arc<Mutex<Vec<ManualTask>>>,
    next_id: AtomicU64,
}

struct ManualTask {
    id: u64,
    tick: Arc<dyn Fn() + Send + Sync>,
}

struct ManualHandle {
    id: u64,
    tasks: Arc<Mutex<Vec<ManualTask>>>,
}

impl ScheduleHandle for ManualHandle {
    fn cancel(&self) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|task| task.id != self.id);
    }
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl ManualSchedule {
    pub fn fire_all(&self) {
        let ticks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|task| Arc::clone(&task.tick))
            .collect();
        for tick in ticks {
            tick();
        }
    }

    #[must_use]
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Schedule for ManualSchedule {
    fn every(
        &self,
        _interval: Duration,
        tick: Arc<dyn Fn() + Send + Sync>,
    ) -> Box<dyn ScheduleHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ManualTask { id, tick });
        Box::new(ManualHandle {
            id,
            tasks: Arc::clone(&self.tasks),
        })
    }
}

/// One wholesale view state. A failed refresh keeps the prior lists and
/// records the error; it never renders a partial merge.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub assignments: BTreeMap<String, AssignmentRecord>,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub struct Dashboard {
    engine: Arc<Engine>,
    clock: Arc<dyn crate::clock::Clock>,
    snapshot: Mutex<Snapshot>,
}

impl Dashboard {
    #[must_use]
    pub fn new(engine: Arc<Engine>, clock: Arc<dyn crate::clock::Clock>) -> Self {
        Self {
            engine,
            clock,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Re-pull the merged view and assignment mapping, replacing the prior
    /// snapshot wholesale. On failure the prior lists stay and the error is
    /// recorded for the caller to present.
    pub fn refresh(&self) -> Snapshot {
        let pulled = self
            .engine
            .all_issues()
            .map(|issues| (issues, self.engine.assignments()));
        let mut snapshot = self.lock();
        match pulled {
            Ok((issues, assignments)) => {
                *snapshot = Snapshot {
                    issues,
                    assignments,
                    error: None,
                    refreshed_at: Some(self.clock.now()),
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "dashboard refresh failed");
                snapshot.error = Some(err.to_string());
            }
        }
        snapshot.clone()
    }

    /// Focus regained. Same refresh as the interval tick.
    pub fn on_focus(&self) -> Snapshot {
        self.refresh()
    }

    /// Move an issue's status with an optimistic snapshot update. The
    /// snapshot shows the new status immediately; a failed store call rolls
    /// it back to the last known-good status.
    pub fn set_status(&self, id: &IssueId, status: Status) -> Result<Issue> {
        let previous = {
            let mut snapshot = self.lock();
            let previous = snapshot
                .issues
                .iter()
                .find(|issue| &issue.id == id)
                .map(|issue| issue.status);
            if let Some(issue) = snapshot.issues.iter_mut().find(|issue| &issue.id == id) {
                issue.status = status;
            }
            previous
        };
        match self.engine.set_status(id, status) {
            Ok(issue) => Ok(issue),
            Err(err) => {
                if let Some(last_good) = previous {
                    let mut snapshot = self.lock();
                    if let Some(issue) =
                        snapshot.issues.iter_mut().find(|issue| &issue.id == id)
                    {
                        issue.status = last_good;
                    }
                }
                Err(err)
            }
        }
    }

    /// Begin polling on `schedule`. The returned handle detaches the timer
    /// when cancelled or dropped.
    pub fn start(
        self: &Arc<Self>,
        schedule: &dyn Schedule,
        interval: Duration,
    ) -> Box<dyn ScheduleHandle> {
        let dashboard = Arc::clone(self);
        schedule.every(
            interval,
            Arc::new(move || {
                dashboard.refresh();
            }),
        )
    }

    /// Replace the snapshot with an already-computed one. Models a refresh
    /// completion landing after a newer one started (last completion wins).
    #[cfg(test)]
    fn apply(&self, snapshot: Snapshot) {
        *self.lock() = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use crate::ledger::LocalLedger;
    use crate::model::{Category, Role};
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testutil::FakeRemote;
    use crate::tracking::TrackingStore;
    use chrono::{TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn remote_issue(id: u64) -> Issue {
        Issue {
            id: IssueId::remote(id),
            title: format!("remote issue {id}"),
            description: "from the wire".to_string(),
            category: Category::Transportation,
            status: Status::Pending,
            reporter_id: 1,
            reporter_name: "Citizen 1".to_string(),
            created_at: start(),
            upvotes: 0,
        }
    }

    struct Fixture {
        dashboard: Arc<Dashboard>,
        remote: Arc<FakeRemote>,
    }

    fn fixture(role: Role) -> Fixture {
        let storage: Arc<dyn crate::storage::Storage> = Arc::new(MemoryStorage::default());
        let clock = Arc::new(ManualClock::new(start()));
        let remote = Arc::new(FakeRemote::new(start()));
        let sessions = SessionStore::new(Arc::clone(&storage), clock.clone());
        sessions
            .login("viewer@example.com", None, role)
            .expect("login succeeds");
        let engine = Arc::new(Engine::new(
            sessions,
            LocalLedger::new(Arc::clone(&storage), clock.clone()),
            TrackingStore::new(Arc::clone(&storage), clock.clone()),
            remote.clone(),
        ));
        Fixture {
            dashboard: Arc::new(Dashboard::new(engine, clock)),
            remote,
        }
    }

    #[test]
    fn refresh_replaces_the_snapshot_wholesale() {
        let fx = fixture(Role::Citizen);
        fx.remote.push_issue(remote_issue(1));
        let snapshot = fx.dashboard.refresh();
        assert_eq!(snapshot.issues.len(), 1);
        assert!(snapshot.error.is_none());

        fx.remote.push_issue(remote_issue(2));
        let snapshot = fx.dashboard.refresh();
        assert_eq!(snapshot.issues.len(), 2);
        assert_eq!(snapshot.refreshed_at, Some(start()));
    }

    #[test]
    fn failed_refresh_keeps_the_prior_list_and_reports_the_error() {
        let fx = fixture(Role::Citizen);
        fx.remote.push_issue(remote_issue(1));
        fx.dashboard.refresh();

        fx.remote.set_offline(true);
        let snapshot = fx.dashboard.refresh();
        assert_eq!(snapshot.issues.len(), 1);
        assert!(snapshot.error.is_some());

        fx.remote.set_offline(false);
        let snapshot = fx.dashboard.refresh();
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn status_update_is_optimistic_and_rolls_back_on_failure() {
        let fx = fixture(Role::Moderator);
        fx.remote.push_issue(remote_issue(1));
        fx.dashboard.refresh();
        let id = IssueId::remote(1);

        fx.dashboard
            .set_status(&id, Status::InProgress)
            .expect("update succeeds");
        let shown = fx.dashboard.snapshot().issues[0].status;
        assert_eq!(shown, Status::InProgress);

        fx.remote.set_offline(true);
        let err = fx.dashboard.set_status(&id, Status::Resolved).unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        let shown = fx.dashboard.snapshot().issues[0].status;
        assert_eq!(shown, Status::InProgress);
    }

    #[test]
    fn polling_ticks_refresh_until_cancelled() {
        let fx = fixture(Role::Citizen);
        fx.remote.push_issue(remote_issue(1));
        let schedule = ManualSchedule::default();

        let handle = fx.dashboard.start(&schedule, Duration::from_secs(5));
        assert_eq!(schedule.live_tasks(), 1);
        let before = fx.remote.call_count();
        schedule.fire_all();
        schedule.fire_all();
        assert_eq!(fx.remote.call_count(), before + 2);

        handle.cancel();
        assert_eq!(schedule.live_tasks(), 0);
        schedule.fire_all();
        assert_eq!(fx.remote.call_count(), before + 2);
    }

    #[test]
    fn dropping_the_handle_detaches_the_timer() {
        let fx = fixture(Role::Citizen);
        let schedule = ManualSchedule::default();
        {
            let _handle = fx.dashboard.start(&schedule, Duration::from_secs(5));
            assert_eq!(schedule.live_tasks(), 1);
        }
        assert_eq!(schedule.live_tasks(), 0);
    }

    #[test]
    fn last_completed_refresh_wins_regardless_of_start_order() {
        let fx = fixture(Role::Citizen);
        fx.remote.push_issue(remote_issue(1));
        let stale = fx.dashboard.refresh();

        fx.remote.push_issue(remote_issue(2));
        let fresh = fx.dashboard.refresh();
        assert_eq!(fresh.issues.len(), 2);

        // The slower, earlier-started pull completes after the newer one.
        fx.dashboard.apply(stale);
        assert_eq!(fx.dashboard.snapshot().issues.len(), 1);
    }

    #[test]
    fn cancel_during_a_running_tick_returns_without_another_wait() {
        let (started, ready) = std::sync::mpsc::channel();
        let started = Mutex::new(started);
        let schedule = ThreadSchedule;
        let handle = schedule.every(
            Duration::from_millis(150),
            Arc::new(move || {
                let _ = started
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .send(());
                std::thread::sleep(Duration::from_millis(200));
            }),
        );
        ready.recv().expect("first tick starts");
        let begun = std::time::Instant::now();
        handle.cancel();
        // Joins as soon as the in-flight tick finishes, not an interval later.
        assert!(begun.elapsed() < Duration::from_millis(300));
    }

    #[test]
    fn thread_schedule_ticks_and_stops() {
        let counter = Arc::new(AtomicU64::new(0));
        let ticker = Arc::clone(&counter);
        let schedule = ThreadSchedule;
        let handle = schedule.every(
            Duration::from_millis(5),
            Arc::new(move || {
                ticker.fetch_add(1, Ordering::SeqCst);
            }),
        );
        std::thread::sleep(Duration::from_millis(100));
        handle.cancel();
        let settled = counter.load(Ordering::SeqCst);
        assert!(settled >= 1);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.load(Ordering::SeqCst), settled);
    }
}
