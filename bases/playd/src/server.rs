use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use player::{Player, PlayerError};
use playd_protocol::{messages, tokenize, ClientId, Response, ResponseCode, ResponseSink};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::clients::ClientPool;
use crate::config::Config;
use crate::error::ServerError;

/// Serves one player to any number of line-protocol clients over TCP.
pub struct Server {
    player: Arc<Mutex<Player>>,
    clients: Arc<ClientPool>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    tick_interval: Duration,
    max_line_length: usize,
}

/// What each connection task needs to reach the rest of the server.
#[derive(Clone)]
struct Shared {
    player: Arc<Mutex<Player>>,
    clients: Arc<ClientPool>,
    shutdown: CancellationToken,
    fatal: UnboundedSender<PlayerError>,
    max_line_length: usize,
}

impl Server {
    pub fn new(mut player: Player, config: &Config) -> Result<Self, ServerError> {
        let clients = Arc::new(ClientPool::new(config.outbox_capacity));
        player.attach_sink(clients.clone())?;

        Ok(Self {
            player: Arc::new(Mutex::new(player)),
            clients,
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            tick_interval: config.tick_interval,
            max_line_length: config.max_line_length,
        })
    }

    /// Cancelling this token shuts the server down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Accepts clients until the player quits, the token is cancelled, or
    /// the player hits a fatal error.
    ///
    /// Returns once every connection has flushed and closed. A fatal player
    /// error is announced to all clients and then returned.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServerError> {
        info!("playd server starting...");

        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();
        let shared = Shared {
            player: self.player.clone(),
            clients: self.clients.clone(),
            shutdown: self.shutdown.clone(),
            fatal: fatal_tx,
            max_line_length: self.max_line_length,
        };

        self.tasks.spawn(drive_updates(
            self.player.clone(),
            self.tick_interval,
            self.shutdown.clone(),
        ));

        let mut fatal = None;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(e) = fatal_rx.recv() => {
                    error!("Fatal player error: {}", e);
                    let failure = Response::new(ResponseCode::Fail).with_arg(e.to_string());
                    self.clients.respond(&failure, ClientId::BROADCAST);
                    fatal = Some(e);
                    self.shutdown.cancel();
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let shared = shared.clone();
                        self.tasks.spawn(async move {
                            if let Err(e) = serve_client(stream, peer, shared).await {
                                warn!("Connection from {} ended with error: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => warn!("Failed to accept connection: {}", e),
                },
            }
        }

        info!("playd server shutting down");
        drop(listener);
        self.tasks.close();
        self.tasks.wait().await;

        match fatal {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

async fn drive_updates(player: Arc<Mutex<Player>>, period: Duration, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let running = player.lock().update();
                if !running {
                    info!("Player has quit");
                    shutdown.cancel();
                    break;
                }
            }
        }
    }
}

async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    shared: Shared,
) -> Result<(), ServerError> {
    // Register under the player lock so no broadcast can overtake the welcome.
    let (id, mut outbox) = {
        let mut player = shared.player.lock();
        let (id, outbox) = shared.clients.register();
        player.welcome(id);
        (id, outbox)
    };
    info!(
        "Client {} connected from {} ({} connected)",
        id,
        peer,
        shared.clients.connected()
    );

    let codec = LinesCodec::new_with_max_length(shared.max_line_length);
    let (mut sink, mut lines) = Framed::new(stream, codec).split();

    let result = loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => break Ok(()),
            queued = outbox.recv() => match queued {
                Some(line) => {
                    if let Err(e) = sink.send(line).await {
                        break Err(e.into());
                    }
                }
                // The pool gave up on this client.
                None => break Ok(()),
            },
            next = lines.next() => match next {
                Some(Ok(line)) => dispatch(&line, id, &shared),
                // The framed stream ends after a decode error, so the client
                // is told why before it is disconnected.
                Some(Err(e @ LinesCodecError::MaxLineLengthExceeded)) => {
                    let what = Response::new(ResponseCode::What).with_arg(messages::LINE_TOO_LONG);
                    shared.clients.respond(&what, id);
                    break Err(e.into());
                }
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
        }
    };

    shared.clients.remove(id);
    while let Ok(line) = outbox.try_recv() {
        if sink.send(line).await.is_err() {
            break;
        }
    }
    info!("Client {} disconnected", id);

    result
}

/// Runs one request line and answers the client that sent it.
fn dispatch(line: &str, id: ClientId, shared: &Shared) {
    let words = match tokenize(line) {
        Ok(words) => words,
        Err(e) => {
            debug!("Client {} sent an unparseable line: {}", id, e);
            let what = Response::new(ResponseCode::What).with_arg(e.to_string());
            shared.clients.respond(&what, id);
            return;
        }
    };
    if words.is_empty() {
        return;
    }

    let mut player = shared.player.lock();
    match player.run_command(&words, id) {
        Ok(result) => {
            shared.clients.respond(&result.to_response(&words), id);
            if !player.is_running() {
                shared.shutdown.cancel();
            }
        }
        Err(e) => {
            // The accept loop reports it and shuts everything down.
            if let Err(unreported) = shared.fatal.send(e) {
                error!("Fatal player error during shutdown: {}", unreported.0);
                shared.shutdown.cancel();
            }
        }
    }
}
