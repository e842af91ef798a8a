use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::engine_warn;
use timeline_core::{CollectionRequest, CollectionResult};
use tokio_util::sync::CancellationToken;

use crate::collector::{Collector, CollectorEvent, ProgressSink};
use crate::host::Host;

enum EngineCommand {
    Start(CollectionRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Collector(CollectorEvent),
    RunFinished(CollectionResult),
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: CollectorEvent) {
        let _ = self.tx.send(EngineEvent::Collector(event));
    }
}

/// Runs collections on a background thread, one at a time.
pub struct CollectorHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: Arc<Mutex<CancellationToken>>,
}

impl CollectorHandle {
    pub fn new(collector: Collector, host: Arc<dyn Host>) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = Arc::new(Mutex::new(CancellationToken::new()));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let worker_cancel = cancel.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start(request) => {
                        let token = match worker_cancel.lock() {
                            Ok(guard) => guard.clone(),
                            Err(_) => {
                                engine_warn!("Cancellation state poisoned, skipping run");
                                continue;
                            }
                        };
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        let result = runtime.block_on(collector.collect(
                            host.as_ref(),
                            request,
                            &sink,
                            &token,
                        ));
                        let _ = event_tx.send(EngineEvent::RunFinished(result));
                    }
                }
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    /// Queues a run with a fresh cancellation token.
    pub fn start(&self, request: CollectionRequest) {
        if let Ok(mut token) = self.cancel.lock() {
            *token = CancellationToken::new();
        }
        let _ = self.cmd_tx.send(EngineCommand::Start(request));
    }

    /// Cancels the current run; it finishes with what it has gathered.
    pub fn cancel(&self) {
        if let Ok(token) = self.cancel.lock() {
            token.cancel();
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
