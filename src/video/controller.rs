use crate::video::capture::{CaptureSource, Frame};
use crate::video::clock::FrameClock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Arc;

/// Playback state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// No active playback; handle closed.
    Init,
    /// Clock running; handle open.
    Playing,
    /// Clock stopped; handle open for offline sources, released for live ones.
    Paused,
}

/// Whether a source is finite and file-backed or an unbounded device/stream.
///
/// The distinction drives handle lifecycle: pausing keeps a file handle open
/// so playback resumes in place, while a device handle is released and
/// reacquired because a live capture cannot resume a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Offline,
    Live,
}

/// Source descriptor for a playback session. Immutable once assigned;
/// replacing it goes through a full reset in [`PlaybackController::set_source`].
#[derive(Debug, Clone)]
pub struct VideoSource {
    pub url: String,
    pub kind: StreamKind,
}

/// Notifications drained by the presentation layer. The controller never
/// touches icons or widgets; it only reports what happened.
#[derive(Debug)]
pub enum PlaybackEvent {
    /// A decoded frame, already normalized to 3-channel RGB.
    Frame(Frame),
    StateChanged(PlayState),
    /// An offline source reached end-of-stream; the session was reset.
    Finished,
}

/// The playback state machine. Owns one capture source and one frame clock,
/// reacts to user commands by transitioning state and starting/stopping the
/// clock and handle, and reacts to clock ticks by pulling frames.
///
/// Commands are total: every command is defined for every state and none of
/// them panics or returns an error; capture failures resolve into state
/// transitions or logged no-ops. Commands other than the internal reset are
/// no-ops while no source descriptor is set.
pub struct PlaybackController {
    capture: Box<dyn CaptureSource>,
    clock: FrameClock,
    ticks: mpsc::Receiver<()>,
    source: Option<VideoSource>,
    fallback_fps: f64,
    state: PlayState,
    events: VecDeque<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(capture: Box<dyn CaptureSource>, fallback_fps: f64) -> Self {
        let (clock, ticks) = FrameClock::new();
        Self {
            capture,
            clock,
            ticks,
            source: None,
            fallback_fps,
            state: PlayState::Init,
            events: VecDeque::new(),
        }
    }

    pub fn set_waker(&mut self, waker: Arc<dyn Fn() + Send + Sync>) {
        self.clock.set_waker(waker);
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.events.pop_front()
    }

    /// Resets the session and assigns a new source descriptor. The source is
    /// opened once up front only to query its native frame rate for the
    /// clock, then released again; playback itself starts on `toggle`, or
    /// right away when `auto_play` is set.
    pub fn set_source(&mut self, url: impl Into<String>, kind: StreamKind, auto_play: bool) {
        self.reset();

        let url = url.into();
        if url.is_empty() {
            self.source = None;
            return;
        }

        let rate = if self.capture.open(&url) {
            let rate = self.capture.frame_rate();
            self.capture.release();
            rate
        } else {
            log::warn!("could not open {} to query its frame rate", url);
            0.0
        };
        if rate > 0.0 {
            self.clock.set_rate(rate);
        } else {
            log::warn!(
                "{} reported no usable frame rate, ticking at {} fps",
                url,
                self.fallback_fps
            );
            self.clock.set_rate(self.fallback_fps);
        }

        log::info!("source set to {} ({:?})", url, kind);
        self.source = Some(VideoSource { url, kind });

        if auto_play {
            self.toggle();
        }
    }

    /// The single user-facing control: play from Init or Paused, pause from
    /// Playing. Open failures are not reported here; the first tick notices
    /// the closed handle and resets.
    pub fn toggle(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        match self.state {
            PlayState::Init => {
                self.capture.open(&source.url);
                self.clock.start();
                self.set_state(PlayState::Playing);
            }
            PlayState::Playing => {
                self.clock.stop();
                if source.kind == StreamKind::Live {
                    self.capture.release();
                }
                self.set_state(PlayState::Paused);
            }
            PlayState::Paused => {
                if source.kind == StreamKind::Live {
                    self.capture.open(&source.url);
                }
                self.clock.start();
                self.set_state(PlayState::Playing);
            }
        }
    }

    /// Explicit play; idempotent while already playing.
    pub fn play(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if !self.capture.is_opened() {
            self.capture.open(&source.url);
        }
        self.clock.start();
        self.set_state(PlayState::Playing);
    }

    /// Explicit stop: pauses from Playing, no-op from Init or Paused.
    pub fn stop(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.state != PlayState::Playing {
            return;
        }
        self.clock.stop();
        if source.kind == StreamKind::Live {
            self.capture.release();
        }
        self.set_state(PlayState::Paused);
    }

    /// Restarts playback from the beginning: the handle is released and
    /// freshly reopened regardless of the current state.
    pub fn replay(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.capture.release();
        self.capture.open(&source.url);
        self.clock.start();
        self.set_state(PlayState::Playing);
    }

    /// Unconditional, idempotent teardown: clock stopped, handle released,
    /// state back to Init.
    pub fn reset(&mut self) {
        self.clock.stop();
        self.capture.release();
        self.set_state(PlayState::Init);
    }

    /// Drains pending clock ticks on the UI thread and pulls one frame per
    /// tick. A stale tick queued before the clock stopped is consumed but
    /// ignored. `read_frame` runs right here, so a stalling source blocks
    /// the UI for the duration of the read; the capture backend's teardown
    /// is what unblocks it.
    pub fn pump(&mut self) {
        while self.ticks.try_recv().is_ok() {
            if self.state == PlayState::Playing {
                self.handle_tick();
            }
        }
    }

    /// One clock tick: pull a frame, with the two-strikes failure policy.
    /// A single failed read is retried once; a failed retry means
    /// end-of-stream for offline sources and a skipped frame for live ones,
    /// which are expected to occasionally miss a frame without ending
    /// playback.
    pub(crate) fn handle_tick(&mut self) {
        if !self.capture.is_opened() {
            log::error!("capture handle is closed during playback, resetting");
            self.reset();
            return;
        }

        if let Some(frame) = self.capture.read_frame() {
            self.events.push_back(PlaybackEvent::Frame(frame.into_rgb()));
            return;
        }

        log::warn!("frame read failed, retrying once");
        match self.capture.read_frame() {
            Some(frame) => self.events.push_back(PlaybackEvent::Frame(frame.into_rgb())),
            None => {
                let kind = self.source.as_ref().map(|source| source.kind);
                if kind == Some(StreamKind::Offline) {
                    log::info!("playback finished");
                    self.reset();
                    self.events.push_back(PlaybackEvent::Finished);
                } else {
                    log::warn!("live source missed a frame, continuing");
                }
            }
        }
    }

    fn set_state(&mut self, state: PlayState) {
        if self.state != state {
            self.state = state;
            self.events.push_back(PlaybackEvent::StateChanged(state));
        }
    }
}
