use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tick rate used when a source reports no usable frame rate.
pub const DEFAULT_TICK_RATE: f64 = 20.0;

/// State shared between the UI thread and the ticking thread. The stop flag
/// is the only cross-thread control signal; reads and writes go through the
/// mutex so start/stop and the loop never race on it.
struct ClockShared {
    stopped: Mutex<bool>,
    interval: Mutex<Duration>,
}

/// Fires tick notifications at a configurable rate on a dedicated thread.
///
/// Each loop iteration sleeps `1/rate` seconds and then emits, so the actual
/// cadence drifts by the cost of the emit; there is no wall-clock correction.
/// Ticks are delivered over an mpsc channel and drained on the UI thread.
pub struct FrameClock {
    shared: Arc<ClockShared>,
    tick_tx: mpsc::Sender<()>,
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl FrameClock {
    pub fn new() -> (Self, mpsc::Receiver<()>) {
        let (tick_tx, tick_rx) = mpsc::channel();
        let clock = Self {
            shared: Arc::new(ClockShared {
                stopped: Mutex::new(true),
                interval: Mutex::new(Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE)),
            }),
            tick_tx,
            waker: None,
            handle: None,
        };
        (clock, tick_rx)
    }

    /// Called after each tick is queued, so the event loop wakes up and
    /// drains it. The gui wires this to `egui::Context::request_repaint`.
    pub fn set_waker(&mut self, waker: Arc<dyn Fn() + Send + Sync>) {
        self.waker = Some(waker);
    }

    /// Updates the interval used for subsequent ticks (not one in flight).
    /// Non-finite or non-positive rates fall back to [`DEFAULT_TICK_RATE`].
    pub fn set_rate(&self, frames_per_second: f64) {
        let rate = if frames_per_second.is_finite() && frames_per_second > 0.0 {
            frames_per_second
        } else {
            log::warn!(
                "unusable tick rate {}, falling back to {} fps",
                frames_per_second,
                DEFAULT_TICK_RATE
            );
            DEFAULT_TICK_RATE
        };
        if let Ok(mut interval) = self.shared.interval.lock() {
            *interval = Duration::from_secs_f64(1.0 / rate);
        }
    }

    pub fn rate(&self) -> f64 {
        self.shared
            .interval
            .lock()
            .map(|interval| 1.0 / interval.as_secs_f64())
            .unwrap_or(DEFAULT_TICK_RATE)
    }

    /// Begins firing ticks. Non-blocking; no-op while already running.
    pub fn start(&mut self) {
        if self.is_running() {
            log::debug!("frame clock already running, start ignored");
            return;
        }
        // A previous run may have exited on its own after the tick channel
        // disconnected; reap the handle before spawning the next one.
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        if let Ok(mut stopped) = self.shared.stopped.lock() {
            *stopped = false;
        }

        let shared = Arc::clone(&self.shared);
        let tick_tx = self.tick_tx.clone();
        let waker = self.waker.clone();
        self.handle = Some(std::thread::spawn(move || loop {
            let interval = shared
                .interval
                .lock()
                .map(|interval| *interval)
                .unwrap_or_else(|_| Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE));
            std::thread::sleep(interval);

            if shared.stopped.lock().map(|stopped| *stopped).unwrap_or(true) {
                return;
            }
            if tick_tx.send(()).is_err() {
                log::debug!("tick receiver dropped, clock thread exiting");
                return;
            }
            if let Some(waker) = waker.as_deref() {
                waker();
            }
        }));
    }

    /// Requests cessation and joins the ticking thread, so no further tick is
    /// produced after this returns. At most one already-queued tick may still
    /// sit in the channel; listeners tolerate it. Idempotent.
    pub fn stop(&mut self) {
        if let Ok(mut stopped) = self.shared.stopped.lock() {
            *stopped = true;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("frame clock thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for FrameClock {
    fn drop(&mut self) {
        self.stop();
    }
}
