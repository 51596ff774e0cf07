//! Background request plumbing. The UI thread never blocks on the
//! network: each request runs on a worker thread that owns its own Tokio
//! runtime and reports the outcome over a std mpsc channel, drained by an
//! `Update` system on the next frames.

use std::future::Future;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Cooldown between manual "retry connection" attempts.
pub const RETRY_COOLDOWN: Duration = Duration::from_secs(2);

/// Runs `fut` to completion on a worker thread and sends the result.
/// The receiving half lives in a page resource; if the page was torn
/// down before completion the send fails silently, which is fine.
pub fn spawn<T, F>(tx: Sender<T>, fut: F)
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("create tokio runtime");
        let result = runtime.block_on(fut);
        let _ = tx.send(result);
    });
}

/// One channel pair owned by a page, wrapped for use as a Bevy resource.
/// Both halves sit behind a Mutex so the resource is Sync.
pub struct Inbox<T> {
    tx: Mutex<Sender<T>>,
    rx: Mutex<Receiver<T>>,
}

impl<T> Inbox<T> {
    pub fn sender(&self) -> Sender<T> {
        self.tx.lock().expect("inbox sender lock").clone()
    }

    /// Drains everything that arrived since the last frame.
    pub fn drain(&self) -> Vec<T> {
        let mut out = Vec::new();
        if let Ok(rx) = self.rx.lock() {
            while let Ok(item) = rx.try_recv() {
                out.push(item);
            }
        }
        out
    }
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self {
            tx: Mutex::new(tx),
            rx: Mutex::new(rx),
        }
    }
}

/// Tracks when a fetch was last attempted so the retry action can be
/// rate-limited to one attempt per cooldown window.
#[derive(Default)]
pub struct RetryGate {
    last_attempt: Option<Instant>,
}

impl RetryGate {
    pub fn mark(&mut self) {
        self.last_attempt = Some(Instant::now());
    }

    pub fn ready(&self) -> bool {
        match self.last_attempt {
            Some(at) => at.elapsed() >= RETRY_COOLDOWN,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_work_reports_back_through_the_inbox() {
        let inbox: Inbox<i32> = Inbox::default();
        spawn(inbox.sender(), async { 41 + 1 });
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let got = inbox.drain();
            if !got.is_empty() {
                assert_eq!(got, vec![42]);
                break;
            }
            assert!(Instant::now() < deadline, "worker never reported");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn retry_gate_blocks_until_cooldown_elapses() {
        let mut gate = RetryGate::default();
        assert!(gate.ready());
        gate.mark();
        assert!(!gate.ready());
    }
}
