use crate::config::Callback;
use crate::date::DateObject;
use crate::hint::HintRequest;
use std::rc::Rc;

/// A formatted value together with the dates it was produced from
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Emission {
    pub value: String,
    /// The single value, or the start of a range
    pub primary: DateObject,
    /// The end of a range
    pub secondary: Option<DateObject>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Ready(DateObject),
    /// The value to write back to the host input
    Select(String),
    Change(Emission),
    Done(Emission),
    Confirm(Emission),
    Now(Emission),
    /// The host input should be emptied
    Clear(Emission),
    Close,
    Hint(HintRequest),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ready(_) => EventKind::Ready,
            Event::Select(_) => EventKind::Select,
            Event::Change(_) => EventKind::Change,
            Event::Done(_) => EventKind::Done,
            Event::Confirm(_) => EventKind::Confirm,
            Event::Now(_) => EventKind::Now,
            Event::Clear(_) => EventKind::Clear,
            Event::Close => EventKind::Close,
            Event::Hint(_) => EventKind::Hint,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    Ready,
    Select,
    Change,
    Done,
    Confirm,
    Now,
    Clear,
    Close,
    Hint,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObserverId(u64);

pub type Observer = Callback<dyn Fn(&Event)>;

/// Listeners for picker events, notified in subscription order
#[derive(Clone, Debug, Default)]
pub struct Observers {
    entries: Vec<(ObserverId, EventKind, Observer)>,
    next_id: u64,
}

impl Observers {
    pub fn new() -> Observers {
        Observers::default()
    }

    pub fn subscribe<F: Fn(&Event) + 'static>(&mut self, kind: EventKind, f: F) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        let f: Rc<dyn Fn(&Event)> = Rc::new(f);
        self.entries.push((id, kind, Callback::from_rc(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&(eid, _, _)| eid != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notify(&self, event: &Event) {
        let kind = event.kind();
        for (_, _, f) in self.entries.iter().filter(|(_, k, _)| *k == kind) {
            f(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_notify_by_kind_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            observers.subscribe(EventKind::Select, move |e| {
                if let Event::Select(v) = e {
                    seen.borrow_mut().push(format!("{tag}:{v}"));
                }
            });
        }
        let other = {
            let seen = Rc::clone(&seen);
            observers.subscribe(EventKind::Close, move |_| seen.borrow_mut().push(String::from("close")))
        };
        observers.notify(&Event::Select(String::from("2024-06-01")));
        assert_eq!(*seen.borrow(), ["a:2024-06-01", "b:2024-06-01"]);
        assert!(observers.unsubscribe(other));
        assert!(!observers.unsubscribe(other));
        observers.notify(&Event::Close);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(observers.len(), 2);
    }
}
