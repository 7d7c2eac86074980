use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::Shutdown;
use crate::api::GeoApi;
use crate::i18n::Translator;
use crate::model::{EvaluationRun, EvaluationStatus};
use crate::notifications::{NotificationKind, NotificationStore};
use crate::query::{EvaluationRunsQuery, Fetcher};

/// Remembers the last status of every run it has seen.
#[derive(Debug, Default)]
pub struct RunTracker {
    seen: HashMap<String, EvaluationStatus>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs that finished since the previous call. Runs seen for the first
    /// time are only recorded, so a restart does not replay old results.
    pub fn finished_since_last<'a>(&mut self, runs: &'a [EvaluationRun]) -> Vec<&'a EvaluationRun> {
        let mut finished = Vec::new();
        for run in runs {
            let previous = self.seen.insert(run.id.clone(), run.status);
            if let Some(previous) = previous {
                if !previous.is_finished() && run.status.is_finished() {
                    finished.push(run);
                }
            }
        }
        finished
    }
}

/// Raise a notification for each run that just finished.
pub fn notify_finished(runs: &[&EvaluationRun], notifications: &NotificationStore, t: &Translator) {
    for run in runs {
        let (kind, title) = match run.status {
            EvaluationStatus::Failed => (NotificationKind::Error, t.t("notify.run_failed")),
            _ => (NotificationKind::Success, t.t("notify.run_completed")),
        };
        let message = match &run.error_message {
            Some(err) if run.status == EvaluationStatus::Failed => format!("{}: {}", run.label(), err),
            _ => format!("{} ({} prompts)", run.label(), run.prompt_count),
        };
        info!(run_id = %run.id, status = run.status.as_str(), "evaluation finished");
        notifications.add_notification(kind, title, &message);
    }
}

/// Watches every run regardless of the status filter the runs page has
/// applied, so a run leaving a filtered list is still noticed.
pub struct EvaluationPoller {
    all_runs: Arc<Fetcher<EvaluationRunsQuery>>,
    tracker: RunTracker,
}

impl EvaluationPoller {
    pub fn new(api: Arc<dyn GeoApi>) -> Self {
        Self {
            all_runs: Fetcher::new(api, EvaluationRunsQuery { status: None }),
            tracker: RunTracker::new(),
        }
    }

    /// Fetch all runs once and notify about any that just finished.
    /// Returns how many finished.
    pub fn poll_once(&mut self, notifications: &NotificationStore, translator: &Translator) -> usize {
        self.all_runs.refetch_blocking();
        let state = self.all_runs.state();
        if state.error.is_some() {
            debug!("evaluation poll failed, keeping previous runs");
            return 0;
        }
        let finished = self.tracker.finished_since_last(&state.data);
        notify_finished(&finished, notifications, translator);
        finished.len()
    }
}

/// Poll evaluation runs every `interval`, posting a notification when one
/// completes or fails, and keep the page's `display` list fresh.
pub fn spawn_evaluation_poller(
    api: Arc<dyn GeoApi>,
    display: Arc<Fetcher<EvaluationRunsQuery>>,
    notifications: NotificationStore,
    translator: Translator,
    interval: Duration,
    shutdown: Shutdown,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut poller = EvaluationPoller::new(api);
        loop {
            poller.poll_once(&notifications, &translator);
            display.refetch_blocking();
            if !shutdown.wait(interval) {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, status: EvaluationStatus) -> EvaluationRun {
        EvaluationRun {
            id: id.into(),
            workspace_id: String::new(),
            name: Some(format!("Run {}", id)),
            brand_name: None,
            models_used: Vec::new(),
            status,
            progress: 0.0,
            prompt_count: 12,
            started_at: None,
            completed_at: None,
            error_message: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn only_transitions_are_reported() {
        let mut tracker = RunTracker::new();
        let first = [run("a", EvaluationStatus::Running), run("b", EvaluationStatus::Completed)];
        assert!(tracker.finished_since_last(&first).is_empty());

        let second = [run("a", EvaluationStatus::Completed), run("b", EvaluationStatus::Completed)];
        let done = tracker.finished_since_last(&second);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, "a");

        assert!(tracker.finished_since_last(&second).is_empty());
    }

    #[test]
    fn failures_become_error_notifications() {
        let store = NotificationStore::new();
        let mut failed = run("x", EvaluationStatus::Failed);
        failed.error_message = Some("quota exceeded".into());
        let ok = run("y", EvaluationStatus::Completed);

        notify_finished(&[&failed, &ok], &store, &Translator::default());
        let items = store.notifications();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].kind, NotificationKind::Error);
        assert_eq!(items[1].message, "Run x: quota exceeded");
        assert_eq!(items[0].title, "Evaluation completed");
    }

    #[test]
    fn runs_hidden_by_the_page_filter_still_notify() {
        use chrono::NaiveDate;

        use crate::api::MockApi;
        use crate::storage::TokenStore;

        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let api: Arc<dyn GeoApi> = Arc::new(MockApi::with_seed(TokenStore::in_memory(), today, 7));
        let running_only = Fetcher::new(
            Arc::clone(&api),
            EvaluationRunsQuery {
                status: Some(EvaluationStatus::Running),
            },
        );
        let store = NotificationStore::new();
        let t = Translator::default();
        let mut poller = EvaluationPoller::new(Arc::clone(&api));

        assert_eq!(poller.poll_once(&store, &t), 0);
        let mut finished = 0;
        for _ in 0..40 {
            running_only.refetch_blocking();
            finished += poller.poll_once(&store, &t);
        }

        assert!(finished >= 1);
        assert_eq!(store.notifications().len(), finished);
        assert!(store
            .notifications()
            .iter()
            .any(|n| n.message.starts_with("New Brand Evaluation")));
        running_only.refetch_blocking();
        assert!(running_only.state().data.iter().all(|r| r.id != "run-4"));
    }
}
