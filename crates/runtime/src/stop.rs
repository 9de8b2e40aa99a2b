use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative stop flag shared by the execution loop, the sensor worker and
/// supervisors.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clears a previous stop request so the loop can be started again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Blocks the current thread for `duration`, waking every `poll` to check
    /// the flag. Returns `false` if a stop was requested before the end.
    pub fn sleep(&self, duration: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let poll = poll.max(Duration::from_millis(1));

        loop {
            if self.is_stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(poll.min(deadline - now));
        }
    }
}
