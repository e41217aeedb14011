use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use playd_protocol::{ClientId, Response, ResponseSink};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::{debug, warn};

/// The connected clients, each with an outbox of packed lines.
///
/// This is the player's response sink: responses are routed here and the
/// connection tasks drain their outboxes onto the socket. A client whose
/// outbox fills up is dropped from the pool, which closes its outbox.
pub struct ClientPool {
    outboxes: Mutex<HashMap<ClientId, Sender<String>>>,
    next_id: AtomicUsize,
    capacity: usize,
}

impl ClientPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            outboxes: Mutex::new(HashMap::new()),
            // 0 is the broadcast address.
            next_id: AtomicUsize::new(1),
            capacity,
        }
    }

    /// Gives a new client an id and an outbox.
    pub fn register(&self) -> (ClientId, Receiver<String>) {
        let id = ClientId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);
        self.outboxes.lock().insert(id, tx);
        debug!("Client {} registered", id);
        (id, rx)
    }

    pub fn remove(&self, id: ClientId) {
        if self.outboxes.lock().remove(&id).is_some() {
            debug!("Client {} removed", id);
        }
    }

    /// Number of clients currently registered.
    pub fn connected(&self) -> usize {
        self.outboxes.lock().len()
    }
}

impl ResponseSink for ClientPool {
    fn respond(&self, response: &Response, id: ClientId) {
        let line = response.pack();
        let mut outboxes = self.outboxes.lock();

        if id.is_broadcast() {
            outboxes.retain(|client, outbox| deliver(*client, outbox, line.clone()));
        } else if let Some(outbox) = outboxes.get(&id) {
            if !deliver(id, outbox, line) {
                outboxes.remove(&id);
            }
        } else {
            debug!("Dropping response for unknown client {}", id);
        }
    }
}

/// Queues `line` for `client`. Returns false if the client should be dropped.
fn deliver(client: ClientId, outbox: &Sender<String>, line: String) -> bool {
    match outbox.try_send(line) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("Client {} is not reading its responses, dropping it", client);
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Client {} hung up before delivery", client);
            true
        }
    }
}
