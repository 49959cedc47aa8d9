//! Flight search and save orchestration.
//!
//! [`FlightSearch`] holds the state a search view renders: the criteria,
//! the latest result list, the selected flight and a status message. Each
//! operation that talks to the booking service spawns one task and returns
//! its [`JoinHandle`] immediately; the task applies the outcome to the
//! shared state when the request resolves.
//!
//! # Ordering and teardown
//!
//! * Every search is numbered. Only the response of the most recently
//!   issued search is applied; an older search that resolves late is
//!   discarded instead of overwriting fresher results.
//! * After [`FlightSearch::dispose`] (or drop) no pending task mutates the
//!   state. Tasks race their request against the disposal signal and
//!   re-check the disposed flag under the state lock before applying.
//! * Failures never escape: they are logged and turned into a
//!   [`StatusMessage`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skybook_models::{city_validators, Flight, FormGroup};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::LogConfig;
use crate::status::StatusMessage;
use crate::teardown::Teardown;
use crate::transport::FlightTransport;

/// Initial departure city.
pub const DEFAULT_FROM: &str = "Graz";
/// Initial arrival city.
pub const DEFAULT_TO: &str = "Hamburg";

const FROM: &str = "from";
const TO: &str = "to";

/// Behaviour switches for a [`FlightSearch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Check the criteria with the city validators before searching. A
    /// rejected search marks both fields for attention and issues no
    /// request.
    pub validate: bool,
    /// Logging switch.
    pub log: LogConfig,
}

#[derive(Debug)]
struct SearchState {
    criteria: FormGroup,
    results: Vec<Flight>,
    selected: Option<Flight>,
    message: Option<StatusMessage>,
    /// Number of the latest issued search.
    epoch: u64,
    disposed: bool,
}

impl SearchState {
    fn new() -> Self {
        let mut criteria = FormGroup::new(&[FROM, TO]);
        // Both names exist in the group just created.
        let _ = criteria.patch_value(FROM, DEFAULT_FROM);
        let _ = criteria.patch_value(TO, DEFAULT_TO);
        Self {
            criteria,
            results: Vec::new(),
            selected: None,
            message: None,
            epoch: 0,
            disposed: false,
        }
    }

    fn criteria_valid(&mut self) -> bool {
        let validators = city_validators();
        let mut valid = true;
        for (_, field) in self.criteria.iter_mut() {
            valid &= field.validate(&validators);
        }
        valid
    }
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search/save state for one view.
///
/// Must be used from within a tokio runtime: operations spawn tasks.
pub struct FlightSearch<T: FlightTransport> {
    transport: Arc<T>,
    state: Arc<Mutex<SearchState>>,
    teardown: Teardown,
    options: SearchOptions,
}

impl<T: FlightTransport> FlightSearch<T> {
    /// Create an orchestrator with default criteria `Graz` → `Hamburg`.
    pub fn new(transport: T, options: SearchOptions) -> Self {
        Self::with_shared(Arc::new(transport), options)
    }

    /// Create an orchestrator on a transport shared with other views.
    pub fn with_shared(transport: Arc<T>, options: SearchOptions) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(SearchState::new())),
            teardown: Teardown::new(),
            options,
        }
    }

    // ------------------------------------------------------------------
    // Criteria
    // ------------------------------------------------------------------

    /// Current departure criterion.
    pub fn from(&self) -> String {
        lock(&self.state).criteria.value(FROM).to_string()
    }

    /// Current arrival criterion.
    pub fn to(&self) -> String {
        lock(&self.state).criteria.value(TO).to_string()
    }

    /// Change the departure criterion.
    pub fn set_from(&self, from: &str) {
        let _ = lock(&self.state).criteria.set_value(FROM, from);
    }

    /// Change the arrival criterion.
    pub fn set_to(&self, to: &str) {
        let _ = lock(&self.state).criteria.set_value(TO, to);
    }

    /// The criteria fields, including touched/dirty flags and the errors
    /// of the last validation.
    pub fn criteria(&self) -> FormGroup {
        lock(&self.state).criteria.clone()
    }

    // ------------------------------------------------------------------
    // Observed state
    // ------------------------------------------------------------------

    /// Flights of the latest applied search, in service order.
    pub fn results(&self) -> Vec<Flight> {
        lock(&self.state).results.clone()
    }

    /// The selected flight, if any.
    pub fn selected(&self) -> Option<Flight> {
        lock(&self.state).selected.clone()
    }

    /// Status of the latest search or save.
    pub fn message(&self) -> Option<StatusMessage> {
        lock(&self.state).message
    }

    /// Return `true` once the orchestrator was disposed.
    pub fn is_disposed(&self) -> bool {
        lock(&self.state).disposed
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Look up flights for the current criteria.
    ///
    /// Returns `None` without issuing a request when disposed or when the
    /// validation gate rejects the criteria.
    pub fn search(&self) -> Option<JoinHandle<()>> {
        let (from, to, epoch) = {
            let mut state = lock(&self.state);
            if state.disposed {
                return None;
            }
            if self.options.validate && !state.criteria_valid() {
                state.criteria.mark_all_for_attention();
                debug!(errors = %state.criteria.errors(), "search blocked by validation");
                return None;
            }
            state.epoch += 1;
            (
                state.criteria.value(FROM).to_string(),
                state.criteria.value(TO).to_string(),
                state.epoch,
            )
        };

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.signal();
        let log = self.options.log;

        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = teardown.disposed() => {
                    debug!(epoch, "search abandoned on dispose");
                    return;
                }
                outcome = transport.find(&from, &to) => outcome,
            };

            let mut state = lock(&state);
            if state.disposed {
                return;
            }
            if epoch != state.epoch {
                debug!(epoch, latest = state.epoch, "discarding stale search response");
                return;
            }
            match outcome {
                Ok(flights) => {
                    info!(%from, %to, count = flights.len(), "flights loaded");
                    if log.debug {
                        for flight in &flights {
                            debug!(%flight, "loaded");
                        }
                    }
                    state.results = flights;
                    state.message = Some(StatusMessage::LoadSucceeded);
                }
                Err(e) => {
                    error!(%from, %to, error = %e, "error loading flights");
                    state.message = Some(StatusMessage::LoadFailed);
                }
            }
        }))
    }

    /// Make `flight` the selection, replacing any previous one.
    pub fn select(&self, flight: Flight) {
        lock(&self.state).selected = Some(flight);
    }

    /// Flip the delay flag of the selected flight.
    ///
    /// The selection is replaced by a new record; returns it, or `None`
    /// when nothing is selected.
    pub fn toggle_delayed(&self) -> Option<Flight> {
        let mut state = lock(&self.state);
        let selected = state.selected.as_ref()?;
        let toggled = selected.with_delayed(!selected.delayed);
        state.selected = Some(toggled.clone());
        Some(toggled)
    }

    /// Persist the selected flight.
    ///
    /// Returns `None` without issuing a request when nothing is selected
    /// or the orchestrator was disposed.
    pub fn save(&self) -> Option<JoinHandle<()>> {
        let flight = {
            let state = lock(&self.state);
            if state.disposed {
                return None;
            }
            match &state.selected {
                Some(flight) => flight.clone(),
                None => {
                    debug!("save ignored: no flight selected");
                    return None;
                }
            }
        };

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.signal();
        let log = self.options.log;

        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = teardown.disposed() => {
                    debug!(id = flight.id, "save detached on dispose");
                    return;
                }
                outcome = transport.save(&flight) => outcome,
            };

            let mut state = lock(&state);
            if state.disposed {
                return;
            }
            match outcome {
                Ok(saved) => {
                    info!(id = saved.id, "flight saved");
                    if log.debug {
                        debug!(flight = %saved, "saved flight");
                    }
                    state.selected = Some(saved);
                    state.message = Some(StatusMessage::SaveSucceeded);
                }
                Err(e) => {
                    error!(id = flight.id, error = %e, "error saving flight");
                    state.message = Some(StatusMessage::SaveFailed);
                }
            }
        }))
    }

    /// Replace the result entry whose id matches `updated`, then search
    /// again so the list is reconciled with the service.
    ///
    /// Other entries are left untouched. Returns the handle of the
    /// follow-up search.
    pub fn update_flight(&self, updated: Flight) -> Option<JoinHandle<()>> {
        {
            let mut state = lock(&self.state);
            if state.disposed {
                return None;
            }
            if let Some(slot) = state.results.iter_mut().find(|f| f.id == updated.id) {
                *slot = updated;
            }
        }
        self.search()
    }

    /// Detach from every pending request. Idempotent.
    ///
    /// Responses arriving afterwards are dropped without touching state.
    pub fn dispose(&self) {
        lock(&self.state).disposed = true;
        self.teardown.dispose();
    }
}

impl<T: FlightTransport> Drop for FlightSearch<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
