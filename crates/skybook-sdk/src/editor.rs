//! Flight editing flow.
//!
//! [`FlightEditor`] backs an edit form for a single flight: it loads the
//! record by id, validates user input (synchronous field checks, the
//! round-trip group check and an asynchronous "known departure city"
//! check against the booking service) and saves the result.
//!
//! Form edits are published to a debounced, de-duplicated change stream;
//! settled values are kept for the presentation layer and traced when
//! debug logging is on.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skybook_models::{
    city_validators, max_length, min_length, numeric, parse_flight_id, required, round_trip,
    FieldError, Flight, FormGroup, ModelError, ValidationError, Validators, FLIGHT_DATE_LEN,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::changes::{debounce_distinct, CHANGE_DEBOUNCE};
use crate::config::LogConfig;
use crate::status::StatusMessage;
use crate::teardown::Teardown;
use crate::transport::FlightTransport;

/// Name of the id field.
pub const FIELD_ID: &str = "id";
/// Name of the departure field.
pub const FIELD_FROM: &str = "from";
/// Name of the arrival field.
pub const FIELD_TO: &str = "to";
/// Name of the date field.
pub const FIELD_DATE: &str = "date";

const FIELDS: [&str; 4] = [FIELD_ID, FIELD_FROM, FIELD_TO, FIELD_DATE];

/// Snapshot of every `(field, value)` pair of the form.
pub type FormValue = Vec<(String, String)>;

/// Validator chains, one per field.
struct EditValidators {
    id: Validators,
    city: Validators,
    date: Validators,
}

impl EditValidators {
    fn new() -> Self {
        Self {
            id: Validators::new().with(required()).with(numeric()),
            city: city_validators(),
            date: Validators::new()
                .with(required())
                .with(min_length(FLIGHT_DATE_LEN))
                .with(max_length(FLIGHT_DATE_LEN)),
        }
    }

    fn for_field(&self, name: &str) -> &Validators {
        match name {
            FIELD_ID => &self.id,
            FIELD_DATE => &self.date,
            _ => &self.city,
        }
    }
}

#[derive(Debug)]
struct EditorState {
    form: FormGroup,
    flight: Option<Flight>,
    message: Option<StatusMessage>,
    settled: Option<FormValue>,
    disposed: bool,
}

impl EditorState {
    fn patch_from(&mut self, flight: &Flight) {
        let values = [
            (FIELD_ID, flight.id.to_string()),
            (FIELD_FROM, flight.from.clone()),
            (FIELD_TO, flight.to.clone()),
            (FIELD_DATE, flight.date.clone()),
        ];
        for (name, value) in values {
            // Every name is one of FIELDS.
            let _ = self.form.patch_value(name, &value);
        }
    }

    /// Run the synchronous field and group checks; returns `true` when
    /// everything passes.
    fn validate_sync(&mut self, validators: &EditValidators) -> bool {
        for (name, field) in self.form.iter_mut() {
            field.validate(validators.for_field(name));
        }
        let from = self.form.value(FIELD_FROM).to_string();
        let to = self.form.value(FIELD_TO).to_string();
        self.form.group_errors = round_trip(&from, &to).err().into_iter().collect();
        self.form.is_valid()
    }

    /// Build the record to save from the form, keeping the delay status of
    /// the loaded flight.
    fn to_flight(&self) -> Result<Flight, ModelError> {
        Ok(Flight {
            id: parse_flight_id(self.form.value(FIELD_ID))?,
            from: self.form.value(FIELD_FROM).to_string(),
            to: self.form.value(FIELD_TO).to_string(),
            date: self.form.value(FIELD_DATE).to_string(),
            delayed: self.flight.as_ref().is_some_and(|f| f.delayed),
        })
    }
}

fn lock(state: &Mutex<EditorState>) -> MutexGuard<'_, EditorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Edit-form state for one flight.
///
/// Must be created inside a tokio runtime: construction starts the change
/// stream and operations spawn tasks.
pub struct FlightEditor<T: FlightTransport> {
    transport: Arc<T>,
    state: Arc<Mutex<EditorState>>,
    validators: EditValidators,
    teardown: Teardown,
    saved_tx: broadcast::Sender<Flight>,
    changes_tx: mpsc::UnboundedSender<FormValue>,
    background: Vec<JoinHandle<()>>,
    log: LogConfig,
}

impl<T: FlightTransport> FlightEditor<T> {
    /// Create an editor with an empty form.
    pub fn new(transport: T, log: LogConfig) -> Self {
        Self::with_shared(Arc::new(transport), log)
    }

    /// Create an editor on a transport shared with other views.
    pub fn with_shared(transport: Arc<T>, log: LogConfig) -> Self {
        let state = Arc::new(Mutex::new(EditorState {
            form: FormGroup::new(&FIELDS),
            flight: None,
            message: None,
            settled: None,
            disposed: false,
        }));

        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (mut settled_rx, debounce_task) = debounce_distinct(changes_rx, CHANGE_DEBOUNCE);
        let watcher_state = Arc::clone(&state);
        let watcher = tokio::spawn(async move {
            while let Some(value) = settled_rx.recv().await {
                if log.debug {
                    debug!(?value, "form value settled");
                }
                let mut state = lock(&watcher_state);
                if state.disposed {
                    break;
                }
                state.settled = Some(value);
            }
        });

        let (saved_tx, _) = broadcast::channel(16);

        Self {
            transport,
            state,
            validators: EditValidators::new(),
            teardown: Teardown::new(),
            saved_tx,
            changes_tx,
            background: vec![debounce_task, watcher],
            log,
        }
    }

    // ------------------------------------------------------------------
    // Observed state
    // ------------------------------------------------------------------

    /// The form fields with their flags and errors.
    pub fn form(&self) -> FormGroup {
        lock(&self.state).form.clone()
    }

    /// The flight last loaded or saved.
    pub fn flight(&self) -> Option<Flight> {
        lock(&self.state).flight.clone()
    }

    /// Status of the latest load or save.
    pub fn message(&self) -> Option<StatusMessage> {
        lock(&self.state).message
    }

    /// The last form value that stayed unchanged for the debounce period.
    pub fn settled_value(&self) -> Option<FormValue> {
        lock(&self.state).settled.clone()
    }

    /// Receive every flight this editor saves successfully.
    pub fn subscribe_saved(&self) -> broadcast::Receiver<Flight> {
        self.saved_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Show `flight` in the form without marking any field dirty.
    pub fn set_flight(&self, flight: Flight) {
        let mut state = lock(&self.state);
        state.patch_from(&flight);
        state.flight = Some(flight);
    }

    /// Apply a user edit to one field.
    ///
    /// The field is marked touched and re-validated, and the new form value
    /// is published to the change stream.
    pub fn set_field(&self, name: &str, value: &str) -> Result<(), ModelError> {
        let snapshot = {
            let mut state = lock(&self.state);
            let field = state.form.field_mut(name)?;
            field.set_value(value);
            field.mark_touched();
            field.validate(self.validators.for_field(name));
            state.form.values()
        };
        // The stream is gone only after dispose.
        let _ = self.changes_tx.send(snapshot);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Load the flight with `id` into the form.
    pub fn load(&self, id: i64) -> Option<JoinHandle<()>> {
        if lock(&self.state).disposed {
            return None;
        }

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.signal();
        let log = self.log;

        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = teardown.disposed() => return,
                outcome = transport.find_by_id(id) => outcome,
            };

            let mut state = lock(&state);
            if state.disposed {
                return;
            }
            match outcome {
                Ok(flight) => {
                    if log.debug {
                        debug!(%flight, "flight loaded");
                    }
                    state.patch_from(&flight);
                    state.flight = Some(flight);
                    state.message = Some(StatusMessage::LoadSucceeded);
                }
                Err(e) => {
                    error!(id, error = %e, "error loading flight");
                    state.message = Some(StatusMessage::LoadFailed);
                }
            }
        }))
    }

    /// Validate the whole form, including the asynchronous departure-city
    /// check, and return the record it describes.
    ///
    /// On failure every field is marked for attention. A disposed editor
    /// skips the service check.
    pub async fn validate(&self) -> Result<Flight, ValidationError> {
        let (from, ask_service) = {
            let mut state = lock(&self.state);
            state.validate_sync(&self.validators);
            let from = state.form.value(FIELD_FROM).to_string();
            let from_ok = state.form.field(FIELD_FROM).is_some_and(|f| f.is_valid());
            (from, from_ok && !state.disposed)
        };

        // Only ask the service about values that pass the local checks,
        // and never once disposed.
        let city_error = if ask_service {
            let mut teardown = self.teardown.signal();
            tokio::select! {
                biased;
                () = teardown.disposed() => None,
                outcome = self.check_departure_city(&from) => outcome.err(),
            }
        } else {
            None
        };

        let mut state = lock(&self.state);
        if let Some(err) = city_error {
            if let Ok(field) = state.form.field_mut(FIELD_FROM) {
                field.errors.push(err);
            }
        }
        if state.form.is_valid() {
            if let Ok(flight) = state.to_flight() {
                return Ok(flight);
            }
            // Digits that do not fit an i64.
            let actual = state.form.value(FIELD_ID).to_string();
            if let Ok(field) = state.form.field_mut(FIELD_ID) {
                field.errors.push(FieldError::Pattern {
                    pattern: "[0-9]+".to_string(),
                    actual,
                });
            }
        }
        state.form.mark_all_for_attention();
        Err(state.form.errors())
    }

    /// The service must know at least one flight departing from `city`.
    async fn check_departure_city(&self, city: &str) -> Result<(), FieldError> {
        let rejected = || FieldError::AsyncCity {
            city: city.to_string(),
        };
        match self.transport.find(city, "").await {
            Ok(flights) if !flights.is_empty() => Ok(()),
            Ok(_) => Err(rejected()),
            Err(e) => {
                warn!(%city, error = %e, "departure city check failed");
                Err(rejected())
            }
        }
    }

    /// Validate and save the form.
    ///
    /// Invalid input issues no request and is returned as the error. A
    /// valid form sets the "saving" message and returns the handle of the
    /// save task, or `None` if the editor was disposed.
    pub async fn submit(&self) -> Result<Option<JoinHandle<()>>, ValidationError> {
        if lock(&self.state).disposed {
            return Ok(None);
        }
        let flight = self.validate().await?;

        {
            let mut state = lock(&self.state);
            if state.disposed {
                return Ok(None);
            }
            state.message = Some(StatusMessage::Saving);
        }

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.signal();
        let saved_tx = self.saved_tx.clone();
        let log = self.log;

        Ok(Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = teardown.disposed() => return,
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
                    state.patch_from(&saved);
                    state.flight = Some(saved.clone());
                    state.message = Some(StatusMessage::SaveSucceeded);
                    // Nobody listening is fine.
                    let _ = saved_tx.send(saved);
                }
                Err(e) => {
                    error!(id = flight.id, error = %e, "error saving flight");
                    state.message = Some(StatusMessage::SaveFailed);
                }
            }
        })))
    }

    /// Detach from pending requests and stop the change stream.
    /// Idempotent.
    pub fn dispose(&self) {
        lock(&self.state).disposed = true;
        self.teardown.dispose();
        for task in &self.background {
            task.abort();
        }
    }
}

impl<T: FlightTransport> Drop for FlightEditor<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{flight, unavailable, FakeTransport};

    fn editor() -> (FlightEditor<FakeTransport>, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::default());
        (
            FlightEditor::with_shared(Arc::clone(&transport), LogConfig::debug()),
            transport,
        )
    }

    fn fill(editor: &FlightEditor<FakeTransport>, from: &str, to: &str, date: &str) {
        editor.set_field(FIELD_ID, "0").unwrap();
        editor.set_field(FIELD_FROM, from).unwrap();
        editor.set_field(FIELD_TO, to).unwrap();
        editor.set_field(FIELD_DATE, date).unwrap();
    }

    const DATE: &str = "2024-01-01T10:00:00.0000000+00:00";

    #[tokio::test]
    async fn load_patches_form() {
        let (editor, transport) = editor();
        let loaded = flight(4, "Wien", "Berlin");
        transport.reply_by_id(Ok(loaded.clone()));

        editor.load(4).unwrap().await.unwrap();

        let form = editor.form();
        assert_eq!(form.value(FIELD_ID), "4");
        assert_eq!(form.value(FIELD_FROM), "Wien");
        assert_eq!(form.value(FIELD_TO), "Berlin");
        assert!(!form.field(FIELD_FROM).unwrap().dirty);
        assert_eq!(editor.flight(), Some(loaded));
        assert_eq!(editor.message(), Some(StatusMessage::LoadSucceeded));
    }

    #[tokio::test]
    async fn failed_load_sets_error_message() {
        let (editor, transport) = editor();
        transport.reply_by_id(Err(unavailable()));
        editor.load(4).unwrap().await.unwrap();
        assert_eq!(editor.message(), Some(StatusMessage::LoadFailed));
        assert!(editor.flight().is_none());
    }

    #[tokio::test]
    async fn invalid_form_blocks_save() {
        let (editor, transport) = editor();
        fill(&editor, "Paris", "", "tomorrow");

        let err = editor.submit().await.unwrap_err();
        assert!(err
            .errors_for(FIELD_FROM)
            .iter()
            .any(|e| matches!(e, FieldError::City { .. })));
        assert_eq!(err.errors_for(FIELD_TO), &[FieldError::Required]);
        assert!(matches!(
            err.errors_for(FIELD_DATE),
            [FieldError::MinLength { required: 33, .. }]
        ));

        assert_eq!(transport.save_calls.load(Ordering::SeqCst), 0);
        // Local failure on `from`: the service is not asked.
        assert_eq!(transport.find_calls.load(Ordering::SeqCst), 0);
        let form = editor.form();
        assert!(form.field(FIELD_ID).unwrap().touched);
        assert!(form.field(FIELD_TO).unwrap().dirty);
        assert!(editor.message().is_none());
    }

    #[tokio::test]
    async fn round_trip_is_rejected() {
        let (editor, transport) = editor();
        transport.reply_find("", Ok(vec![flight(1, "Graz", "Wien")]));
        fill(&editor, "Graz", "Graz", DATE);

        let err = editor.submit().await.unwrap_err();
        assert_eq!(
            err.errors_for("form"),
            &[FieldError::RoundTrip {
                city: "Graz".into()
            }]
        );
    }

    #[tokio::test]
    async fn unknown_departure_city_is_rejected_by_service_check() {
        let (editor, transport) = editor();
        // No flight departs from Berlin according to the service.
        transport.reply_find("", Ok(Vec::new()));
        fill(&editor, "Berlin", "Graz", DATE);

        let err = editor.submit().await.unwrap_err();
        assert_eq!(
            err.errors_for(FIELD_FROM),
            &[FieldError::AsyncCity {
                city: "Berlin".into()
            }]
        );
        assert_eq!(transport.save_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_form_saves_and_broadcasts() {
        let (editor, transport) = editor();
        let mut saved_rx = editor.subscribe_saved();
        transport.reply_find("", Ok(vec![flight(1, "Graz", "Wien")]));
        fill(&editor, "Graz", "Hamburg", DATE);

        let reply = transport.queue_save();
        let pending = editor.submit().await.unwrap().unwrap();
        assert_eq!(editor.message(), Some(StatusMessage::Saving));

        let mut canonical = Flight::new("Graz", "Hamburg", DATE);
        canonical.id = 12;
        reply.send(Ok(canonical.clone())).unwrap();
        pending.await.unwrap();

        assert_eq!(editor.message(), Some(StatusMessage::SaveSucceeded));
        assert_eq!(editor.flight(), Some(canonical.clone()));
        assert_eq!(editor.form().value(FIELD_ID), "12");
        assert_eq!(saved_rx.recv().await.unwrap(), canonical);

        let sent = transport.saved.lock().unwrap().clone();
        assert_eq!(sent, vec![Flight::new("Graz", "Hamburg", DATE)]);
    }

    #[tokio::test]
    async fn save_keeps_delay_status_of_loaded_flight() {
        let (editor, transport) = editor();
        let mut loaded = flight(3, "Wien", "Berlin");
        loaded.delayed = true;
        editor.set_flight(loaded.clone());
        transport.reply_find("", Ok(vec![loaded.clone()]));

        editor.submit().await.unwrap().unwrap().await.unwrap();

        assert_eq!(transport.saved.lock().unwrap().clone(), vec![loaded]);
    }

    #[tokio::test]
    async fn failed_save_sets_error_message() {
        let (editor, transport) = editor();
        transport.reply_find("", Ok(vec![flight(1, "Graz", "Wien")]));
        fill(&editor, "Graz", "Wien", DATE);
        transport.reply_save(Err(unavailable()));

        editor.submit().await.unwrap().unwrap().await.unwrap();
        assert_eq!(editor.message(), Some(StatusMessage::SaveFailed));
        assert!(editor.flight().is_none());
    }

    #[tokio::test]
    async fn dispose_detaches_pending_save() {
        let (editor, transport) = editor();
        let mut saved_rx = editor.subscribe_saved();
        transport.reply_find("", Ok(vec![flight(1, "Graz", "Wien")]));
        fill(&editor, "Graz", "Wien", DATE);

        let reply = transport.queue_save();
        let pending = editor.submit().await.unwrap().unwrap();
        editor.dispose();
        let _ = reply.send(Ok(flight(50, "Graz", "Wien")));
        pending.await.unwrap();

        assert_eq!(editor.message(), Some(StatusMessage::Saving));
        assert!(editor.flight().is_none());
        assert!(saved_rx.try_recv().is_err());
        assert!(editor.load(1).is_none());
    }

    #[tokio::test]
    async fn disposed_editor_submits_nothing() {
        let (editor, transport) = editor();
        editor.set_flight(flight(3, "Wien", "Berlin"));
        editor.dispose();

        assert!(editor.submit().await.unwrap().is_none());
        assert_eq!(transport.find_calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.save_calls.load(Ordering::SeqCst), 0);
        assert!(editor.message().is_none());
    }

    #[tokio::test]
    async fn dispose_during_city_check_issues_no_save() {
        let (editor, transport) = editor();
        editor.set_flight(flight(3, "Wien", "Berlin"));
        let reply = transport.queue_find("");

        let (submitted, ()) = tokio::join!(editor.submit(), async {
            editor.dispose();
            let _ = reply.send(Ok(vec![flight(1, "Wien", "Graz")]));
        });

        assert!(submitted.unwrap().is_none());
        assert_eq!(transport.save_calls.load(Ordering::SeqCst), 0);
        assert!(editor.message().is_none());
    }

    #[tokio::test]
    async fn oversized_id_is_stored_on_the_form() {
        let (editor, transport) = editor();
        transport.reply_find("", Ok(vec![flight(1, "Graz", "Wien")]));
        editor.set_field(FIELD_ID, "99999999999999999999").unwrap();
        editor.set_field(FIELD_FROM, "Graz").unwrap();
        editor.set_field(FIELD_TO, "Wien").unwrap();
        editor.set_field(FIELD_DATE, DATE).unwrap();

        let err = editor.submit().await.unwrap_err();
        assert!(matches!(
            err.errors_for(FIELD_ID),
            [FieldError::Pattern { .. }]
        ));

        let form = editor.form();
        assert_eq!(form.field(FIELD_ID).unwrap().errors, err.errors_for(FIELD_ID));
        assert!(form.field(FIELD_DATE).unwrap().touched);
        assert!(form.field(FIELD_DATE).unwrap().dirty);
        assert_eq!(transport.save_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_field_is_rejected() {
        let (editor, _) = editor();
        assert!(matches!(
            editor.set_field("gate", "A1"),
            Err(ModelError::UnknownField { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn edits_settle_after_debounce() {
        let (editor, _) = editor();
        editor.set_field(FIELD_FROM, "G").unwrap();
        editor.set_field(FIELD_FROM, "Gr").unwrap();
        editor.set_field(FIELD_FROM, "Graz").unwrap();
        assert!(editor.settled_value().is_none());

        tokio::time::sleep(CHANGE_DEBOUNCE * 2).await;

        let settled = editor.settled_value().unwrap();
        assert!(settled.contains(&(FIELD_FROM.to_string(), "Graz".to_string())));
    }
}
