use crate::paint::messages::PaintEvent;
use crate::paint::session::PaintSession;
use crate::paint::settings_store::StateStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of draining the queue once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PumpReport {
    pub handled: usize,
    pub errors: Vec<String>,
}

/// Serializes every source of input (pointer, timer, controls) onto a single
/// queue that is drained against one session.
pub struct PaintController {
    events_tx: Sender<PaintEvent>,
    events_rx: Receiver<PaintEvent>,
}

impl Default for PaintController {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintController {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            events_tx,
            events_rx,
        }
    }

    pub fn sender(&self) -> Sender<PaintEvent> {
        self.events_tx.clone()
    }

    pub fn send(&self, event: impl Into<PaintEvent>) {
        // The receiver lives in `self`, so the channel cannot be disconnected here.
        let _ = self.events_tx.send(event.into());
    }

    /// Applies every queued event in arrival order. A failing event is logged
    /// and reported; later events are still applied.
    pub fn pump<S: StateStore>(&mut self, session: &mut PaintSession<S>) -> PumpReport {
        let mut report = PumpReport::default();
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    report.handled += 1;
                    if let Err(err) = session.handle_event(event) {
                        tracing::error!(error = ?err, "failed to apply paint event");
                        report.errors.push(format!("{err:#}"));
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        report
    }
}

type Waker = Box<dyn Fn() + Send>;

/// Background timer that enqueues [`PaintEvent::Tick`] at a fixed interval.
/// It never touches session state; ticks are applied by the pump like any
/// other event. Ticks are only produced while the ticker is armed.
pub struct Ticker {
    armed: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(events_tx: Sender<PaintEvent>, interval: Duration) -> Self {
        Self::spawn_inner(events_tx, interval, None)
    }

    /// Like [`Ticker::spawn`], calling `waker` after each enqueued tick so a
    /// front-end can schedule a frame that drains the queue.
    pub fn spawn_with_waker(
        events_tx: Sender<PaintEvent>,
        interval: Duration,
        waker: impl Fn() + Send + 'static,
    ) -> Self {
        Self::spawn_inner(events_tx, interval, Some(Box::new(waker)))
    }

    fn spawn_inner(events_tx: Sender<PaintEvent>, interval: Duration, waker: Option<Waker>) -> Self {
        let armed = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(AtomicBool::new(false));
        let thread_armed = Arc::clone(&armed);
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            while !thread_stop.load(Ordering::Relaxed) {
                std::thread::sleep(interval);
                if !thread_armed.load(Ordering::Relaxed) {
                    continue;
                }
                if events_tx.send(PaintEvent::Tick(Instant::now())).is_err() {
                    tracing::debug!("paint event queue closed; ticker exiting");
                    break;
                }
                if let Some(waker) = &waker {
                    waker();
                }
            }
        });
        Self {
            armed,
            stop,
            handle: Some(handle),
        }
    }

    /// Pauses or resumes tick production, typically following whether a
    /// stroke is in progress.
    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::Relaxed);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("paint ticker thread panicked");
            }
        }
    }
}
