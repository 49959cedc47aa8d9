//! Scripted transport for orchestrator tests.
//!
//! Replies are queued per call kind. A queued reply is a oneshot receiver,
//! so a test decides exactly when (and whether) each request resolves.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use skybook_models::Flight;
use tokio::sync::oneshot;

use crate::error::TransportError;
use crate::transport::FlightTransport;

pub type Reply<T> = Result<T, TransportError>;

#[derive(Default)]
pub struct FakeTransport {
    /// `find` replies keyed by the `to` criterion.
    find_replies: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply<Vec<Flight>>>>>>,
    by_id_replies: Mutex<VecDeque<oneshot::Receiver<Reply<Flight>>>>,
    save_replies: Mutex<VecDeque<oneshot::Receiver<Reply<Flight>>>>,
    pub find_calls: AtomicUsize,
    pub by_id_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub saved: Mutex<Vec<Flight>>,
}

pub fn unavailable() -> TransportError {
    TransportError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "down".into(),
    }
}

pub fn flight(id: i64, from: &str, to: &str) -> Flight {
    Flight {
        id,
        from: from.into(),
        to: to.into(),
        date: "2024-01-01T10:00:00.0000000+00:00".into(),
        delayed: false,
    }
}

impl FakeTransport {
    /// Queue a `find` reply for searches towards `to`; resolve it later
    /// through the returned sender.
    pub fn queue_find(&self, to: &str) -> oneshot::Sender<Reply<Vec<Flight>>> {
        let (tx, rx) = oneshot::channel();
        self.find_replies
            .lock()
            .unwrap()
            .entry(to.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    /// Queue an already resolved `find` reply.
    pub fn reply_find(&self, to: &str, reply: Reply<Vec<Flight>>) {
        let _ = self.queue_find(to).send(reply);
    }

    pub fn queue_by_id(&self) -> oneshot::Sender<Reply<Flight>> {
        let (tx, rx) = oneshot::channel();
        self.by_id_replies.lock().unwrap().push_back(rx);
        tx
    }

    pub fn reply_by_id(&self, reply: Reply<Flight>) {
        let _ = self.queue_by_id().send(reply);
    }

    pub fn queue_save(&self) -> oneshot::Sender<Reply<Flight>> {
        let (tx, rx) = oneshot::channel();
        self.save_replies.lock().unwrap().push_back(rx);
        tx
    }

    pub fn reply_save(&self, reply: Reply<Flight>) {
        let _ = self.queue_save().send(reply);
    }
}

async fn resolve<T>(rx: Option<oneshot::Receiver<Reply<T>>>, fallback: impl FnOnce() -> Reply<T>) -> Reply<T> {
    match rx {
        Some(rx) => rx.await.unwrap_or_else(|_| Err(unavailable())),
        None => fallback(),
    }
}

impl FlightTransport for FakeTransport {
    async fn find(&self, _from: &str, to: &str) -> Result<Vec<Flight>, TransportError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let rx = self
            .find_replies
            .lock()
            .unwrap()
            .get_mut(to)
            .and_then(VecDeque::pop_front);
        // Unscripted searches find nothing.
        resolve(rx, || Ok(Vec::new())).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Flight, TransportError> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        let rx = self.by_id_replies.lock().unwrap().pop_front();
        resolve(rx, || {
            Err(TransportError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: format!("unknown flight {id}"),
            })
        })
        .await
    }

    async fn save(&self, flight: &Flight) -> Result<Flight, TransportError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.saved.lock().unwrap().push(flight.clone());
        let rx = self.save_replies.lock().unwrap().pop_front();
        let echo = flight.clone();
        // Unscripted saves echo the record back with an id.
        resolve(rx, move || {
            let mut saved = echo;
            if saved.id == 0 {
                saved.id = 100;
            }
            Ok(saved)
        })
        .await
    }
}
