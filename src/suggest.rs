//! Debounced location suggestions
//!
//! Every keystroke calls [`SuggestionLookup::lookup`]. The lookup waits for the
//! debounce delay and then asks the backend; a newer keystroke cancels both the
//! pending delay and any request already sent. Lookup failures are never shown
//! to the user, they just produce an empty list.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::WeatherBackend;
use crate::models::LocationSuggestion;

pub struct SuggestionLookup<B: WeatherBackend> {
    backend: Arc<B>,
    debounce: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl<B: WeatherBackend> SuggestionLookup<B> {
    pub fn new(backend: Arc<B>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Suggestions for the text as typed so far.
    ///
    /// Returns `None` when a newer keystroke superseded this one; the caller
    /// keeps whatever it shows. Blank text clears the list immediately.
    pub async fn lookup(&self, text: &str) -> Option<Vec<LocationSuggestion>> {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        let text = text.trim();
        if text.is_empty() {
            return Some(Vec::new());
        }

        tokio::select! {
            biased;
            () = token.cancelled() => return None,
            () = tokio::time::sleep(self.debounce) => {}
        }

        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("Suggestion request for '{}' aborted", text);
                return None;
            }
            result = self.backend.suggest_locations(text) => result,
        };

        match result {
            Ok(suggestions) => Some(suggestions),
            Err(e) => {
                warn!("Suggestion lookup for '{}' failed: {}", text, e);
                Some(Vec::new())
            }
        }
    }
}
