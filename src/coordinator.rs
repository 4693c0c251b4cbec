//! Request Coordinator
//!
//! Owns the lifecycle of weather searches. Each submission cancels the one
//! in flight, takes the next sequence number, and applies its result to the
//! [`DashboardState`] only if no newer submission was issued meanwhile.
//! Results are therefore applied in submission order, never completion order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::WeatherBackend;
use crate::error::{LOCATION_NOT_FOUND_MESSAGE, SearchError, SkylensError};
use crate::models::{RawWeatherPayload, WeatherModel, WeatherQuery, WeatherType};
use crate::normalize::normalize;

/// Transient error shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    /// Search that raised it; only that search's timer may dismiss it
    pub seq: u64,
}

/// What the dashboard shows right now
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub model: Option<Arc<WeatherModel>>,
    pub weather_type: WeatherType,
    pub busy: bool,
    pub error: Option<ErrorNotice>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            model: None,
            weather_type: WeatherType::Sunny,
            busy: false,
            error: None,
        }
    }
}

/// Result of a search that did not fail
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The model is now on the dashboard
    Applied(Arc<WeatherModel>),
    /// A newer search was issued; this one was dropped silently
    Superseded,
}

#[derive(Default)]
struct InFlight {
    latest_seq: u64,
    token: Option<CancellationToken>,
}

/// Issues weather searches and keeps the dashboard on the latest one
pub struct SearchCoordinator<B: WeatherBackend> {
    backend: Arc<B>,
    in_flight: Mutex<InFlight>,
    state: Arc<watch::Sender<DashboardState>>,
    error_dismiss: Duration,
}

impl<B: WeatherBackend> SearchCoordinator<B> {
    pub fn new(backend: Arc<B>, error_dismiss: Duration) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            backend,
            in_flight: Mutex::new(InFlight::default()),
            state: Arc::new(state),
            error_dismiss,
        }
    }

    /// Observe dashboard changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Snapshot of the current dashboard
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Sequence number of the most recently issued search
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.lock().latest_seq
    }

    fn lock(&self) -> MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate user input and run the search.
    ///
    /// Invalid input fails before anything is issued and leaves the
    /// dashboard untouched.
    pub async fn submit(
        &self,
        location: &str,
        date: Option<&str>,
    ) -> Result<SearchOutcome, SearchError> {
        let query = WeatherQuery::new(location, date).map_err(|source| SearchError {
            location: location.to_string(),
            seq: self.latest_seq(),
            source,
        })?;
        self.submit_query(query).await
    }

    /// Run a search, superseding any search still in flight
    pub async fn submit_query(&self, query: WeatherQuery) -> Result<SearchOutcome, SearchError> {
        let (seq, token) = self.begin();
        let _release = Release { coordinator: self, seq };
        info!(seq, location = %query.location, date = ?query.date, "Search issued");

        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(seq, "Search cancelled by a newer one");
                return Ok(SearchOutcome::Superseded);
            }
            result = self.backend.fetch_weather(&query) => result,
        };

        self.settle(seq, query, result)
    }

    /// Cancel the search in flight and take the next sequence number
    fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut in_flight = self.lock();
        if let Some(previous) = in_flight.token.replace(token.clone()) {
            previous.cancel();
        }
        in_flight.latest_seq += 1;
        self.state.send_modify(|s| {
            s.busy = true;
            s.error = None;
        });
        (in_flight.latest_seq, token)
    }

    /// Publish the outcome of search `seq` unless a newer one was issued
    fn settle(
        &self,
        seq: u64,
        query: WeatherQuery,
        result: Result<RawWeatherPayload, SkylensError>,
    ) -> Result<SearchOutcome, SearchError> {
        match result {
            Ok(raw) => {
                let model = Arc::new(normalize(raw, &query));
                let weather_type = model.weather_type();
                let applied = self.apply_if_latest(seq, |s| {
                    s.model = Some(Arc::clone(&model));
                    s.weather_type = weather_type;
                    s.busy = false;
                    s.error = None;
                });
                if applied {
                    info!(seq, city = %model.city, "Search applied");
                    Ok(SearchOutcome::Applied(model))
                } else {
                    debug!(seq, "Discarding stale result");
                    Ok(SearchOutcome::Superseded)
                }
            }
            Err(source) => {
                let applied = self.apply_if_latest(seq, |s| {
                    s.busy = false;
                    s.error = Some(ErrorNotice {
                        message: LOCATION_NOT_FOUND_MESSAGE.to_string(),
                        seq,
                    });
                });
                if !applied {
                    debug!(seq, "Discarding stale failure: {}", source);
                    return Ok(SearchOutcome::Superseded);
                }

                warn!(seq, location = %query.location, "Search failed: {}", source);
                self.schedule_dismiss(seq);
                Err(SearchError {
                    location: query.location,
                    seq,
                    source,
                })
            }
        }
    }

    /// Clear the busy flag of search `seq` if it is still the latest and
    /// never settled, e.g. because its caller dropped the future.
    fn release(&self, seq: u64) {
        let mut in_flight = self.lock();
        if in_flight.latest_seq != seq {
            return;
        }
        in_flight.token = None;
        let cleared = self.state.send_if_modified(|s| std::mem::replace(&mut s.busy, false));
        if cleared {
            debug!(seq, "Search abandoned before it settled");
        }
    }

    /// Apply `update` only if `seq` is still the latest search. Checked and
    /// applied under the same lock that issues sequence numbers.
    fn apply_if_latest(&self, seq: u64, update: impl FnOnce(&mut DashboardState)) -> bool {
        let mut in_flight = self.lock();
        if in_flight.latest_seq != seq {
            return false;
        }
        in_flight.token = None;
        self.state.send_modify(update);
        true
    }

    fn schedule_dismiss(&self, seq: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.error_dismiss;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| match &s.error {
                Some(notice) if notice.seq == seq => {
                    s.error = None;
                    true
                }
                _ => false,
            });
        });
    }
}

/// Runs [`SearchCoordinator::release`] when a search future finishes or is dropped
struct Release<'a, B: WeatherBackend> {
    coordinator: &'a SearchCoordinator<B>,
    seq: u64,
}

impl<B: WeatherBackend> Drop for Release<'_, B> {
    fn drop(&mut self) {
        self.coordinator.release(self.seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::LocationSuggestion;
    use async_trait::async_trait;
    use serde_json::json;

    /// Backend that answers after a per-location delay
    struct FakeBackend;

    fn delay_for(location: &str) -> Duration {
        match location {
            "Slowtown" => Duration::from_millis(500),
            _ => Duration::from_millis(50),
        }
    }

    #[async_trait]
    impl WeatherBackend for FakeBackend {
        async fn fetch_weather(
            &self,
            query: &WeatherQuery,
        ) -> Result<RawWeatherPayload, SkylensError> {
            tokio::time::sleep(delay_for(&query.location)).await;
            if query.location == "Atlantis" {
                return Err(SkylensError::api_status("Backend error 404", 404));
            }
            Ok(serde_json::from_value(json!({
                "city": { "name": query.location, "country": "Testland" },
                "live_forecast": [{ "date": "2025-06-01", "condition": "Light Snow" }]
            }))
            .unwrap())
        }

        async fn suggest_locations(
            &self,
            _text: &str,
        ) -> Result<Vec<LocationSuggestion>, SkylensError> {
            Ok(Vec::new())
        }
    }

    fn coordinator() -> SearchCoordinator<FakeBackend> {
        SearchCoordinator::new(Arc::new(FakeBackend), Duration::from_secs(3))
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_search_is_applied() {
        let coordinator = coordinator();
        let outcome = coordinator.submit("Oslo", None).await.unwrap();

        let SearchOutcome::Applied(model) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(model.city, "Oslo");

        let state = coordinator.state();
        assert!(!state.busy);
        assert!(state.error.is_none());
        assert_eq!(state.weather_type, WeatherType::Snowy);
        assert_eq!(state.model.unwrap().country, "Testland");
        assert_eq!(coordinator.latest_seq(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_search_supersedes_older() {
        let coordinator = coordinator();

        let (first, second) = tokio::join!(coordinator.submit("Slowtown", None), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            coordinator.submit("Fastville", None).await
        });

        assert!(matches!(first, Ok(SearchOutcome::Superseded)));
        assert!(matches!(second, Ok(SearchOutcome::Applied(_))));

        let state = coordinator.state();
        assert_eq!(state.model.unwrap().city, "Fastville");
        assert!(!state.busy);
        assert!(state.error.is_none());
        assert_eq!(coordinator.latest_seq(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_not_applied() {
        let coordinator = coordinator();
        coordinator.submit("Oslo", None).await.unwrap();

        // A second search has been issued; seq 1 is now stale
        coordinator.lock().latest_seq = 2;
        let applied = coordinator.apply_if_latest(1, |s| s.model = None);

        assert!(!applied);
        assert_eq!(coordinator.state().model.unwrap().city, "Oslo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_is_silent() {
        let coordinator = coordinator();
        let (first, _) = coordinator.begin();
        let (second, _) = coordinator.begin();
        let query = WeatherQuery::new("Atlantis", None).unwrap();

        let outcome = coordinator.settle(
            first,
            query.clone(),
            Err(SkylensError::api_status("Backend error 404", 404)),
        );
        assert!(matches!(outcome, Ok(SearchOutcome::Superseded)));
        let state = coordinator.state();
        assert!(state.error.is_none());
        // the newer search is still running
        assert!(state.busy);

        let err = coordinator
            .settle(second, query, Err(SkylensError::api_status("Backend error 404", 404)))
            .unwrap_err();
        assert_eq!(err.seq, 2);
        assert_eq!(coordinator.state().error.unwrap().seq, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_search_clears_busy() {
        let coordinator = coordinator();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), coordinator.submit("Slowtown", None))
                .await;
        assert!(timed_out.is_err());

        let state = coordinator.state();
        assert!(!state.busy);
        assert!(state.model.is_none());
        assert!(coordinator.lock().token.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_drop_keeps_newer_busy() {
        let coordinator = coordinator();
        let (_first, _) = coordinator.begin();
        let (_second, _) = coordinator.begin();

        coordinator.release(1);
        assert!(coordinator.state().busy);

        coordinator.release(2);
        assert!(!coordinator.state().busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_in_flight() {
        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();

        let (outcome, saw_busy) = tokio::join!(coordinator.submit("Slowtown", None), async {
            rx.changed().await.unwrap();
            rx.borrow().busy
        });

        assert!(saw_busy);
        assert!(matches!(outcome, Ok(SearchOutcome::Applied(_))));
        assert!(!coordinator.state().busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_surfaces_and_auto_dismisses() {
        let coordinator = coordinator();
        let err = coordinator.submit("Atlantis", None).await.unwrap_err();

        assert_eq!(err.user_message(), "Location not found. Please try again.");
        assert_eq!(err.source.code(), Some(ErrorCode::ApiLocationNotFound));
        let state = coordinator.state();
        assert!(!state.busy);
        assert_eq!(state.error.as_ref().unwrap().message, LOCATION_NOT_FOUND_MESSAGE);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(coordinator.state().error.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(coordinator.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_timer_does_not_dismiss_newer_error() {
        let coordinator = coordinator();
        coordinator.submit("Atlantis", None).await.unwrap_err();

        tokio::time::sleep(Duration::from_secs(2)).await;
        coordinator.submit("Atlantis", None).await.unwrap_err();

        // first timer fires here, but the error now belongs to search 2
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(coordinator.state().error.unwrap().seq, 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(coordinator.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_search_clears_previous_error() {
        let coordinator = coordinator();
        coordinator.submit("Atlantis", None).await.unwrap_err();
        coordinator.submit("Oslo", None).await.unwrap();
        assert!(coordinator.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_issues_nothing() {
        let coordinator = coordinator();
        let err = coordinator.submit("   ", None).await.unwrap_err();
        assert!(matches!(err.source, SkylensError::Validation { .. }));
        assert_eq!(coordinator.latest_seq(), 0);
        assert!(coordinator.state().error.is_none());
    }
}
