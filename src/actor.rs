// src/actor.rs - Engine ownership for pose sources running on another thread
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::accumulator::GestureState;
use crate::engine::{GestureEngine, GestureFeedback};
use crate::error::{EngineClosed, NavigationError};
use crate::navigation::{NavigationCommand, NavigationSink, SectionDeck};
use crate::pose::PoseFrame;

const COMMAND_BUFFER: usize = 128;

#[derive(Debug)]
pub enum EngineCommand {
    Observe(PoseFrame),
    Enable,
    Disable,
    Click(NavigationCommand),
    JumpTo(usize, oneshot::Sender<Result<usize, NavigationError>>),
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub enabled: bool,
    pub state: Option<GestureState>,
    pub progress: f64,
    pub current_index: usize,
    pub current_section: String,
    pub last_source_error: Option<String>,
}

/// Cloneable handle to an engine owned by a single tokio task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
    feedback: watch::Receiver<Option<GestureFeedback>>,
}

impl EngineHandle {
    pub async fn observe(&self, frame: PoseFrame) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Observe(frame)).await
    }

    /// For capture callbacks running outside the runtime. Must not be
    /// called from within an async context.
    pub fn observe_blocking(&self, frame: PoseFrame) -> Result<(), EngineClosed> {
        self.tx
            .blocking_send(EngineCommand::Observe(frame))
            .map_err(|_| EngineClosed)
    }

    pub async fn enable(&self) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Enable).await
    }

    pub async fn disable(&self) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Disable).await
    }

    pub async fn click(&self, command: NavigationCommand) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Click(command)).await
    }

    pub async fn jump_to(&self, index: usize) -> Result<Result<usize, NavigationError>, EngineClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::JumpTo(index, reply)).await?;
        rx.await.map_err(|_| EngineClosed)
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot, EngineClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| EngineClosed)
    }

    pub async fn shutdown(&self) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Shutdown).await
    }

    /// Latest feedback, updated after every observed frame and after
    /// every click or jump that moves the page.
    pub fn feedback(&self) -> watch::Receiver<Option<GestureFeedback>> {
        self.feedback.clone()
    }

    async fn send(&self, command: EngineCommand) -> Result<(), EngineClosed> {
        self.tx.send(command).await.map_err(|_| EngineClosed)
    }
}

/// Moves `engine` onto its own task. The task ends on `Shutdown` or once
/// every handle is dropped, and hands the engine back.
pub fn spawn_engine(
    engine: GestureEngine<SectionDeck>,
) -> (EngineHandle, JoinHandle<GestureEngine<SectionDeck>>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (feedback_tx, feedback_rx) = watch::channel(None);

    let task = tokio::spawn(run_engine(engine, rx, feedback_tx));
    let handle = EngineHandle {
        tx,
        feedback: feedback_rx,
    };
    (handle, task)
}

async fn run_engine(
    mut engine: GestureEngine<SectionDeck>,
    mut rx: mpsc::Receiver<EngineCommand>,
    feedback_tx: watch::Sender<Option<GestureFeedback>>,
) -> GestureEngine<SectionDeck> {
    while let Some(command) = rx.recv().await {
        match command {
            EngineCommand::Observe(frame) => {
                if let Some(feedback) = engine.observe(&frame) {
                    feedback_tx.send_replace(Some(feedback));
                }
            }
            EngineCommand::Enable => engine.enable(),
            EngineCommand::Disable => {
                engine.disable();
                feedback_tx.send_replace(None);
            }
            EngineCommand::Click(command) => {
                let index = engine.click(command);
                publish_index(&feedback_tx, index);
            }
            EngineCommand::JumpTo(index, reply) => {
                let result = engine
                    .sink_mut()
                    .jump_to(index)
                    .map(|_| engine.sink().current_index());
                if let Ok(index) = result {
                    publish_index(&feedback_tx, index);
                }
                let _ = reply.send(result);
            }
            EngineCommand::Snapshot(reply) => {
                let _ = reply.send(EngineSnapshot {
                    enabled: engine.is_enabled(),
                    state: engine.state().cloned(),
                    progress: engine.progress(),
                    current_index: engine.sink().current_index(),
                    current_section: engine.sink().current_section().to_string(),
                    last_source_error: engine.last_source_error().map(str::to_string),
                });
            }
            EngineCommand::Shutdown => break,
        }
    }
    debug!("Gesture engine task stopped");
    engine
}

/// Keeps the published page in step with clicks and jumps. Nothing is
/// published while the engine is disabled.
fn publish_index(feedback_tx: &watch::Sender<Option<GestureFeedback>>, index: usize) {
    feedback_tx.send_if_modified(|feedback| match feedback.as_mut() {
        Some(feedback) if feedback.current_index != index => {
            feedback.current_index = index;
            true
        }
        _ => false,
    });
}
