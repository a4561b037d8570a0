//! Bot server: the event loop tying transport channels to the conversation
//! core.
//!
//! The transport collaborator pushes [`InboundEvent`]s into the server's event
//! channel and consumes [`Reply`]s from the reply channel; rendering and send
//! retries are its business. The server resolves each event on its own tokio
//! task, so events from different identities run fully in parallel, and a slow
//! storage call for one user never delays another. A periodic sweep clears
//! idle sessions that nobody looks up again.
//!
//! Shutdown: on ctrl-c (or when the transport drops its sender) intake stops,
//! in-flight tasks get a bounded grace period to finish, and the store is
//! flushed before the loop returns.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::bot::event::{InboundEvent, Reply};
use crate::bot::handlers::Handler;
use crate::bot::session::SessionManager;
use crate::config::Config;
use crate::service::WishlistService;
use crate::storage::Store;

const EVENT_QUEUE: usize = 64;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct BotServer {
    handler: Arc<Handler>,
    event_tx: mpsc::Sender<InboundEvent>,
    event_rx: mpsc::Receiver<InboundEvent>,
    reply_tx: mpsc::Sender<Reply>,
    reply_rx: Option<mpsc::Receiver<Reply>>,
    sweep_interval: Duration,
}

impl BotServer {
    pub fn new(config: &Config) -> Result<Self> {
        let store = Store::open(&config.storage.data_dir)?;
        let service = WishlistService::new(store);
        let sessions = SessionManager::new(Duration::from_secs(
            config.session.idle_timeout_minutes * 60,
        ));
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let (reply_tx, reply_rx) = mpsc::channel(EVENT_QUEUE);
        Ok(Self {
            handler: Arc::new(Handler::new(service, sessions)),
            event_tx,
            event_rx,
            reply_tx,
            reply_rx: Some(reply_rx),
            sweep_interval: Duration::from_secs(config.session.sweep_interval_secs),
        })
    }

    /// Sender half for the transport to push inbound events into.
    pub fn event_sender(&self) -> mpsc::Sender<InboundEvent> {
        self.event_tx.clone()
    }

    /// Receiver half for the transport to consume replies from. Can be taken
    /// once.
    pub fn take_reply_receiver(&mut self) -> Option<mpsc::Receiver<Reply>> {
        self.reply_rx.take()
    }

    pub fn handler(&self) -> Arc<Handler> {
        Arc::clone(&self.handler)
    }

    /// Run until ctrl-c or until every event sender is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("bot server started");
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut in_flight: JoinSet<()> = JoinSet::new();

        // The server holds one sender clone itself; drop it so a closed
        // transport actually closes the channel.
        drop(self.event_tx);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
                _ = sweep.tick() => {
                    self.handler.sessions().evict_expired();
                }
                // Reap finished tasks so the set stays small.
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                maybe = self.event_rx.recv() => {
                    match maybe {
                        Some(event) => {
                            let handler = Arc::clone(&self.handler);
                            let reply_tx = self.reply_tx.clone();
                            in_flight.spawn(async move {
                                let reply = handler.handle(&event).await;
                                if reply_tx.send(reply).await.is_err() {
                                    debug!("reply channel closed, dropping reply");
                                }
                            });
                        }
                        None => {
                            info!("event channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Bounded drain of in-flight events, then flush.
        self.event_rx.close();
        if tokio::time::timeout(SHUTDOWN_GRACE, async {
            while in_flight.join_next().await.is_some() {}
        })
        .await
        .is_err()
        {
            warn!("shutdown grace period elapsed with events still in flight");
            in_flight.abort_all();
        }
        self.handler.service().store().flush()?;
        info!("bot server stopped");
        Ok(())
    }
}
