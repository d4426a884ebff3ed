use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use uuid::Uuid;

use crate::{
    detection::{build_result, DetectionEngine},
    export::write_export,
    input::read_text,
    notifications::{Notification, NotificationCenter, NotificationLevel},
    optimize::{types::DEFAULT_REJECTION, OptimizationError, TextOptimizer, TextStats},
    readiness::{self, Readiness},
    verdict::{verdict_for, Verdict},
};

use super::state::{reduce, Effect, Event, Session, WorkflowState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const EVENT_STATE_CHANGED: &str = "workflow-state-changed";
pub const EVENT_NOTIFICATION_POSTED: &str = "notification-posted";
pub const EVENT_NOTIFICATION_DISMISSED: &str = "notification-dismissed";
pub const EVENT_CLIPBOARD_REQUESTED: &str = "clipboard-requested";
pub const EVENT_FILE_EXPORTED: &str = "file-exported";

/// Everything a surface needs to render the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session: Session,
    pub readiness: Readiness,
    pub verdict: Option<Verdict>,
    pub optimize_stats: TextStats,
    pub optimized_stats: Option<TextStats>,
    pub notifications: Vec<Notification>,
}

impl SessionSnapshot {
    fn capture(session: &Session, notifications: &NotificationCenter) -> Self {
        Self {
            session: session.clone(),
            readiness: readiness::evaluate(session),
            verdict: session.detection.as_ref().map(verdict_for),
            optimize_stats: TextStats::of(&session.optimize_input),
            optimized_stats: session
                .optimization
                .as_ref()
                .map(|result| TextStats::of(&result.optimized_text)),
            notifications: notifications.active(Instant::now()),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.session.state
    }
}

/// Broadcast to every subscriber, in the order things happen.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum SessionEvent {
    StateChanged {
        from: WorkflowState,
        to: WorkflowState,
    },
    NotificationPosted(Notification),
    NotificationDismissed {
        id: Uuid,
    },
    ClipboardRequested {
        text: String,
    },
    FileExported {
        path: PathBuf,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StateChanged { .. } => EVENT_STATE_CHANGED,
            SessionEvent::NotificationPosted(_) => EVENT_NOTIFICATION_POSTED,
            SessionEvent::NotificationDismissed { .. } => EVENT_NOTIFICATION_DISMISSED,
            SessionEvent::ClipboardRequested { .. } => EVENT_CLIPBOARD_REQUESTED,
            SessionEvent::FileExported { .. } => EVENT_FILE_EXPORTED,
        }
    }
}

/// Collaborators the workflow drives.
#[derive(Clone)]
pub struct WorkflowDeps {
    pub detection: Arc<dyn DetectionEngine>,
    pub optimizer: Arc<dyn TextOptimizer>,
    pub notification_ttl: Duration,
    pub export_dir: PathBuf,
}

enum Message {
    Dispatch {
        event: Event,
        reply: Option<oneshot::Sender<SessionSnapshot>>,
    },
    ExportFinished(Result<PathBuf, String>),
    DismissNotification {
        id: Uuid,
        expired: bool,
    },
}

/// Handle to the workflow actor. Cheap to clone; the actor stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct WorkflowController {
    tx: mpsc::UnboundedSender<Message>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl WorkflowController {
    /// Spawns the actor on the current tokio runtime.
    pub fn spawn(deps: WorkflowDeps) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let notifications = NotificationCenter::new(deps.notification_ttl);
        let session = Session::new();
        let (snapshot_tx, snapshots) =
            watch::channel(SessionSnapshot::capture(&session, &notifications));
        let (events, _) = broadcast::channel(256);

        let actor = WorkflowActor {
            session,
            notifications,
            deps,
            loopback: tx.downgrade(),
            snapshots: snapshot_tx,
            events: events.clone(),
            outbox: Vec::new(),
        };
        tokio::spawn(actor.run(rx));

        Self {
            tx,
            snapshots,
            events,
        }
    }

    /// Applies `event` and returns the snapshot right after the transition.
    pub async fn dispatch(&self, event: Event) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Message::Dispatch {
                event,
                reply: Some(reply_tx),
            })
            .map_err(|_| anyhow!("workflow actor stopped"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("workflow actor dropped the reply"))
    }

    /// Queues `event` without waiting for it.
    pub fn send(&self, event: Event) -> Result<()> {
        self.tx
            .send(Message::Dispatch { event, reply: None })
            .map_err(|_| anyhow!("workflow actor stopped"))
    }

    pub fn dismiss_notification(&self, id: Uuid) -> Result<()> {
        self.tx
            .send(Message::DismissNotification { id, expired: false })
            .map_err(|_| anyhow!("workflow actor stopped"))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Waits until a snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        timeout: Duration,
        predicate: impl Fn(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut rx = self.snapshots.clone();
        let wait = async {
            loop {
                {
                    let current = rx.borrow_and_update();
                    if predicate(&current) {
                        return Ok::<_, anyhow::Error>(current.clone());
                    }
                }
                rx.changed()
                    .await
                    .map_err(|_| anyhow!("workflow actor stopped"))?;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| anyhow!("timed out after {:?} waiting for workflow", timeout))?
    }

    /// Waits until the session is no longer detecting or optimizing.
    pub async fn wait_until_idle(&self, timeout: Duration) -> Result<SessionSnapshot> {
        self.wait_for(timeout, |snapshot| !snapshot.state().is_busy())
            .await
    }
}

struct WorkflowActor {
    session: Session,
    notifications: NotificationCenter,
    deps: WorkflowDeps,
    loopback: mpsc::WeakUnboundedSender<Message>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    /// Flushed after the snapshot they describe is published.
    outbox: Vec<SessionEvent>,
}

impl WorkflowActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        log_debug!("workflow actor started");
        while let Some(message) = rx.recv().await {
            match message {
                Message::Dispatch { event, reply } => {
                    self.apply(event);
                    self.publish();
                    if let Some(reply) = reply {
                        let _ = reply.send(self.snapshots.borrow().clone());
                    }
                }
                Message::ExportFinished(outcome) => {
                    match outcome {
                        Ok(path) => {
                            let message = format!("Download started: {}", path.display());
                            self.emit(SessionEvent::FileExported { path });
                            self.notify(NotificationLevel::Success, message);
                        }
                        Err(err) => {
                            self.notify(NotificationLevel::Error, format!("Download failed: {err}"));
                        }
                    }
                    self.publish();
                }
                Message::DismissNotification { id, expired } => {
                    if self.notifications.dismiss(id) {
                        if !expired {
                            log_debug!("notification {} dismissed", id);
                        }
                        self.emit(SessionEvent::NotificationDismissed { id });
                        self.publish();
                    }
                }
            }
        }
        log_debug!("workflow actor stopped");
    }

    fn apply(&mut self, event: Event) {
        let name = event.name();
        let from = self.session.state;
        let transition = reduce(std::mem::take(&mut self.session), event);
        self.session = transition.session;

        if transition.ignored {
            log_debug!("ignored {} in state {}", name, from.as_str());
        }

        let to = self.session.state;
        if from != to {
            log_info!("workflow {} -> {} on {}", from.as_str(), to.as_str(), name);
            self.emit(SessionEvent::StateChanged { from, to });
        }

        for effect in transition.effects {
            self.run_effect(effect);
        }
    }

    fn publish(&mut self) {
        self.notifications.prune_expired(Instant::now());
        self.snapshots
            .send_replace(SessionSnapshot::capture(&self.session, &self.notifications));
        for event in self.outbox.drain(..) {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.outbox.push(event);
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        let notification = self.notifications.push(level, message, Instant::now());
        log_debug!(
            "notification [{}] {}",
            notification.level.as_str(),
            notification.message
        );

        let id = notification.id;
        let ttl = self.notifications.ttl();
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(Message::DismissNotification { id, expired: true });
            }
        });

        self.emit(SessionEvent::NotificationPosted(notification));
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Notify { level, message } => self.notify(level, message),

            Effect::ReadFile { ticket, handle } => {
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let job = tokio::spawn(async move { read_text(&handle).await });
                    let outcome = match job.await {
                        Ok(Ok(text)) => Ok(text),
                        Ok(Err(err)) => {
                            log_warn!("file read for ticket {:?} failed: {err:#}", ticket);
                            Err(err.to_string())
                        }
                        Err(err) => Err(format!("file read worker failed: {err}")),
                    };
                    deliver(&loopback, Event::FileRead { ticket, outcome });
                });
            }

            Effect::StartDetection { request, text } => {
                let engine = self.deps.detection.clone();
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let job = tokio::spawn(async move {
                        let weights = engine.score(&text).await?;
                        build_result(&text, &weights, Utc::now())
                    });
                    let outcome = match job.await {
                        Ok(Ok(result)) => Ok(result),
                        Ok(Err(err)) => {
                            log_error!("detection {:?} failed: {err:#}", request);
                            Err(err.to_string())
                        }
                        Err(err) => {
                            log_error!("detection worker {:?} failed to join: {err}", request);
                            Err(err.to_string())
                        }
                    };
                    deliver(&loopback, Event::DetectionCompleted { request, outcome });
                });
            }

            Effect::StartOptimization { request, text } => {
                let optimizer = self.deps.optimizer.clone();
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let job = tokio::spawn(async move { optimizer.optimize(&text).await });
                    let outcome = match job.await {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            log_error!("optimization worker {:?} failed to join: {err}", request);
                            Err(OptimizationError::Rejected(DEFAULT_REJECTION.to_string()))
                        }
                    };
                    deliver(&loopback, Event::OptimizationCompleted { request, outcome });
                });
            }

            // The surface answers with `Event::ClipboardResult`.
            Effect::CopyToClipboard { text } => {
                self.emit(SessionEvent::ClipboardRequested { text });
            }

            Effect::ExportText { text } => {
                let dir = self.deps.export_dir.clone();
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let outcome = match write_export(&dir, &text, Utc::now()).await {
                        Ok(path) => {
                            log_info!("exported optimized text to {}", path.display());
                            Ok(path)
                        }
                        Err(err) => {
                            log_error!("export failed: {err:#}");
                            Err(err.to_string())
                        }
                    };
                    if let Some(tx) = loopback.upgrade() {
                        let _ = tx.send(Message::ExportFinished(outcome));
                    }
                });
            }
        }
    }
}

fn deliver(loopback: &mpsc::WeakUnboundedSender<Message>, event: Event) {
    match loopback.upgrade() {
        Some(tx) => {
            let _ = tx.send(Message::Dispatch { event, reply: None });
        }
        None => {
            log_debug!("workflow gone; dropping {}", event.name());
        }
    }
}
