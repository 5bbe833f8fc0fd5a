use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::{trace, warn};

/// Unified event type consumed by the app loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick,
    /// The terminal reader stopped; no further key events will arrive
    InputClosed(String),
}

/// Single channel every event source feeds, drained on the UI thread
pub struct EventHub {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    /// Forward terminal events from a background reader thread
    pub fn spawn_terminal_reader(&self) {
        let tx = self.sender();

        thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(CtEvent::Paste(text)) => AppEvent::Paste(text),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, "terminal input closed");
                    let _ = tx.send(AppEvent::InputClosed(err.to_string()));
                    break;
                }
            };

            if tx.send(event).is_err() {
                break;
            }
        });
    }

    pub fn next(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<AppEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Time source for the session timer
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handle to a repeating tick task. The task runs until `cancel` is called
/// (or the handle is dropped).
#[derive(Debug)]
pub struct TickHandle {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    /// A handle with no worker behind it
    pub fn detached() -> Self {
        Self {
            stop: None,
            worker: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // closing the stop channel wakes the worker immediately
        self.stop.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        trace!("tick task cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Something that can start a repeating tick
pub trait TickScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TickHandle;
}

/// Sends `AppEvent::Tick` into an event channel from a worker thread
#[derive(Clone, Debug)]
pub struct ChannelTickScheduler {
    tx: Sender<AppEvent>,
}

impl ChannelTickScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl TickScheduler for ChannelTickScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TickHandle {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tx = self.tx.clone();

        let worker = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(AppEvent::Tick).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        TickHandle {
            stop: Some(stop_tx),
            worker: Some(worker),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Scheduler for headless tests: hands out detached handles and remembers
/// them so tests can check they were cancelled.
#[derive(Clone, Debug, Default)]
pub struct ManualTickScheduler {
    issued: Rc<RefCell<Vec<Arc<AtomicBool>>>>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a tick was scheduled
    pub fn scheduled(&self) -> usize {
        self.issued.borrow().len()
    }

    /// Number of scheduled ticks that have not been cancelled
    pub fn active(&self) -> usize {
        self.issued
            .borrow()
            .iter()
            .filter(|flag| !flag.load(Ordering::SeqCst))
            .count()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_repeating(&mut self, _interval: Duration) -> TickHandle {
        let handle = TickHandle::detached();
        self.issued.borrow_mut().push(Arc::clone(&handle.cancelled));
        handle
    }
}
