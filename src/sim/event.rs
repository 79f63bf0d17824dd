/// Lifecycle events published by `GameState`, and the bus that delivers them.
///
/// Delivery is synchronous: `emit` runs every handler registered for the
/// event's kind, in registration order, before returning. Emitting a kind
/// with no handlers does nothing.

use std::collections::HashMap;

use crate::domain::team::Winner;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted,
    QuarterStarted { quarter: u32, duration: u32 },
    GamePaused,
    GameUnpaused,
    QuarterEnded { pause_duration: u32 },
    GameEnded { winner: Winner },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    GameStarted,
    QuarterStarted,
    GamePaused,
    GameUnpaused,
    QuarterEnded,
    GameEnded,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameStarted => EventKind::GameStarted,
            GameEvent::QuarterStarted { .. } => EventKind::QuarterStarted,
            GameEvent::GamePaused => EventKind::GamePaused,
            GameEvent::GameUnpaused => EventKind::GameUnpaused,
            GameEvent::QuarterEnded { .. } => EventKind::QuarterEnded,
            GameEvent::GameEnded { .. } => EventKind::GameEnded,
        }
    }
}

pub type Handler = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { handlers: HashMap::new() }
    }

    /// Register a handler. Duplicates are kept; each registration fires.
    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn has_subscribers(&self, kind: EventKind) -> bool {
        self.handlers.get(&kind).map_or(false, |v| !v.is_empty())
    }

    pub fn emit(&mut self, event: &GameEvent) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for handler in list.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_fire_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(EventKind::GameStarted, Box::new(move |_: &GameEvent| log.borrow_mut().push(tag)));
        }
        bus.emit(&GameEvent::GameStarted);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let mut bus = EventBus::new();
        bus.emit(&GameEvent::QuarterEnded { pause_duration: 5 });
        assert!(!bus.has_subscribers(EventKind::QuarterEnded));
    }

    #[test]
    fn only_matching_kind_is_delivered() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let h = Rc::clone(&hits);
        bus.subscribe(EventKind::GameEnded, Box::new(move |_: &GameEvent| *h.borrow_mut() += 1));
        bus.emit(&GameEvent::GameStarted);
        bus.emit(&GameEvent::GameEnded { winner: Winner::Draw });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn clear_drops_all_handlers() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let h = Rc::clone(&hits);
        bus.subscribe(EventKind::GameStarted, Box::new(move |_: &GameEvent| *h.borrow_mut() += 1));
        bus.clear();
        bus.emit(&GameEvent::GameStarted);
        assert_eq!(*hits.borrow(), 0);
        assert!(!bus.has_subscribers(EventKind::GameStarted));
    }

    #[test]
    fn duplicate_registrations_both_fire() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        for _ in 0..2 {
            let h = Rc::clone(&hits);
            bus.subscribe(EventKind::GamePaused, Box::new(move |_: &GameEvent| *h.borrow_mut() += 1));
        }
        bus.emit(&GameEvent::GamePaused);
        assert_eq!(*hits.borrow(), 2);
    }
}
