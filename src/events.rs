/// notifications delivered to presentation-layer observers
#[derive(Clone, Debug, PartialEq)]
pub enum RecognitionEvent {
    Matched { label: String, score: f64 },
    Unmatched,
    InteractionStart { x: f64, y: f64 },
    InteractionEnd { x: f64, y: f64 },
}

/// handle returned by subscribe; used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandlerId(u64);

/// Synchronous multi-subscriber registry. Handlers run on the task that
/// produced the event, in subscription order. No buffering or replay.
#[derive(Default)]
pub struct Notifier {
    handlers: Vec<(HandlerId, Box<dyn FnMut(&RecognitionEvent)>)>,
    next_id: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&RecognitionEvent) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// true if the handler was registered
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _)| *hid != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &RecognitionEvent) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("handlers", &self.handlers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
