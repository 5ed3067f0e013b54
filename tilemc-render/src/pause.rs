use std::sync::atomic::{AtomicBool, Ordering};

/// Per-world pause flag.
///
/// Last write wins. Readers may see a stale value for one checkpoint.
#[derive(Debug, Default)]
pub struct PauseSignal(AtomicBool);

impl PauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, paused: bool) {
        self.0.store(paused, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_unpaused() {
        assert!(!PauseSignal::new().is_set());
    }

    #[test]
    fn test_visible_across_threads() {
        let signal = Arc::new(PauseSignal::new());
        let writer = Arc::clone(&signal);
        thread::spawn(move || writer.set(true)).join().unwrap();
        assert!(signal.is_set());
        signal.set(false);
        assert!(!signal.is_set());
    }
}
