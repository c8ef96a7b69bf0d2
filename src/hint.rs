use std::time::{Duration, Instant};

pub const DEFAULT_HINT_DURATION: Duration = Duration::from_millis(3000);

/// A request to show `content` for `duration`, as emitted to observers
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HintRequest {
    pub content: String,
    pub duration: Duration,
}

/// A transient message with at most one pending dismissal
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hint {
    content: String,
    visible: bool,
    dismiss_at: Option<Instant>,
}

impl Hint {
    pub fn new() -> Hint {
        Hint::default()
    }

    /// Show `content`, replacing whatever was showing and its pending
    /// dismissal.  A zero duration keeps the hint up until it is replaced or
    /// cancelled.
    pub fn show(&mut self, content: &str, duration: Duration, now: Instant) -> HintRequest {
        content.clone_into(&mut self.content);
        self.visible = true;
        self.dismiss_at = (!duration.is_zero()).then(|| now + duration);
        HintRequest {
            content: self.content.clone(),
            duration,
        }
    }

    /// Hide the hint if its dismissal deadline has passed.  Returns whether
    /// this call hid it.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.dismiss_at {
            Some(deadline) if deadline <= now => {
                self.visible = false;
                self.dismiss_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.visible = false;
        self.dismiss_at = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<&str> {
        self.visible.then_some(self.content.as_str())
    }

    pub fn dismiss_at(&self) -> Option<Instant> {
        self.dismiss_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_expire() {
        let start = Instant::now();
        let mut hint = Hint::new();
        let req = hint.show("Date is unavailable", DEFAULT_HINT_DURATION, start);
        assert_eq!(req.content, "Date is unavailable");
        assert_eq!(hint.content(), Some("Date is unavailable"));
        assert!(!hint.expire(start + Duration::from_millis(2999)));
        assert!(hint.is_visible());
        assert!(hint.expire(start + DEFAULT_HINT_DURATION));
        assert_eq!(hint.content(), None);
        assert!(!hint.expire(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_show_replaces_pending_dismissal() {
        let start = Instant::now();
        let mut hint = Hint::new();
        hint.show("first", Duration::from_millis(1000), start);
        let later = start + Duration::from_millis(900);
        hint.show("second", Duration::from_millis(1000), later);
        assert!(!hint.expire(start + Duration::from_millis(1500)));
        assert_eq!(hint.content(), Some("second"));
        assert!(hint.expire(later + Duration::from_millis(1000)));
    }

    #[test]
    fn test_cancel_and_zero_duration() {
        let start = Instant::now();
        let mut hint = Hint::new();
        hint.show("sticky", Duration::ZERO, start);
        assert_eq!(hint.dismiss_at(), None);
        assert!(!hint.expire(start + Duration::from_secs(60)));
        assert!(hint.is_visible());
        hint.cancel();
        assert!(!hint.is_visible());
    }
}
