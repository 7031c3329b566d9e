use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Everything the sketch loop reacts to. `Tick` is synthesized by the
/// runner whenever no terminal event arrives within the tick interval,
/// and is what drives the commit-deadline polling.
#[derive(Clone, Debug)]
pub enum SketchEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Where sketch events come from. `poll` waits up to `wait` for the next
/// event; `None` means nothing arrived (or the source is gone) and the
/// loop should tick instead.
pub trait EventSource: Send + 'static {
    fn poll(&self, wait: Duration) -> Option<SketchEvent>;
}

fn translate(event: CtEvent) -> Option<SketchEvent> {
    match event {
        CtEvent::Key(key) => Some(SketchEvent::Key(key)),
        CtEvent::Mouse(mouse) => Some(SketchEvent::Mouse(mouse)),
        CtEvent::Resize(_, _) => Some(SketchEvent::Resize),
        _ => None,
    }
}

/// Production source: a forwarding thread blocks on `crossterm::event::read`
/// and pushes translated events over a channel, so the sketch loop itself
/// never blocks on the terminal.
pub struct TerminalEvents {
    rx: Receiver<SketchEvent>,
}

impl TerminalEvents {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || Self::forward(tx));
        Self { rx }
    }

    fn forward(tx: Sender<SketchEvent>) {
        while let Ok(event) = event::read() {
            if let Some(ev) = translate(event) {
                if tx.send(ev).is_err() {
                    return;
                }
            }
        }
    }
}

impl EventSource for TerminalEvents {
    fn poll(&self, wait: Duration) -> Option<SketchEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Channel-fed source for driving the loop headlessly in tests.
pub struct TestEventSource {
    rx: Receiver<SketchEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SketchEvent>) -> Self {
        Self { rx }
    }

    pub fn channel() -> (Sender<SketchEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl EventSource for TestEventSource {
    fn poll(&self, wait: Duration) -> Option<SketchEvent> {
        match self.rx.recv_timeout(wait) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Advances the app one event at a time: real events pass through, quiet
/// intervals become `Tick`s at the configured rate.
pub struct Runner<S: EventSource> {
    source: S,
    tick_rate: Duration,
}

impl<S: EventSource> Runner<S> {
    pub fn new(source: S, tick_rate: Duration) -> Self {
        Self { source, tick_rate }
    }

    pub fn step(&self) -> SketchEvent {
        self.source
            .poll(self.tick_rate)
            .unwrap_or(SketchEvent::Tick)
    }
}
