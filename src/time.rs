//! Frame timing and the frame loop.
//!
//! A [`FrameSource`] hands out one delta per frame. [`FrameClock`] measures
//! wall-clock time, [`FixedFrames`] replays a fixed step for headless runs.
//! [`FrameLoop`] drives a closure from a source until the source runs dry or
//! its [`CancelToken`] is cancelled.
//!
//! ```ignore
//! let token = CancelToken::new();
//! let mut frames = FrameLoop::new(FixedFrames::new(1.0 / 60.0, 600), token.clone());
//! let ran = frames.run(|delta| {
//!     river.step(delta, &input.snapshot());
//! });
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag that tears down a running frame loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after the current frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Source of per-frame time steps.
pub trait FrameSource {
    /// Seconds since the previous frame, or `None` when no frames remain.
    fn next_frame(&mut self) -> Option<f32>;
}

/// Wall-clock frame timer.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    /// Largest delta handed out; longer stalls are cut to this.
    max_delta: f32,
    /// Overrides measured time when set.
    fixed_delta: Option<f32>,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock whose deltas never exceed `max_delta` seconds.
    pub fn new(max_delta: f32) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            max_delta,
            fixed_delta: None,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to a new frame and return its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.delta_secs = self.fixed_delta.unwrap_or(raw_delta).min(self.max_delta);
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Restart timing from now so the next delta does not include a pause.
    pub fn resync(&mut self) {
        self.last_frame = Instant::now();
    }

    /// Use a fixed delta instead of measured time. `None` restores real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Delta of the last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl FrameSource for FrameClock {
    fn next_frame(&mut self) -> Option<f32> {
        Some(self.tick())
    }
}

/// A fixed number of frames with a constant delta.
#[derive(Debug, Clone)]
pub struct FixedFrames {
    delta: f32,
    remaining: u64,
}

impl FixedFrames {
    /// `count` frames of `delta` seconds each.
    pub fn new(delta: f32, count: u64) -> Self {
        Self {
            delta,
            remaining: count,
        }
    }
}

impl FrameSource for FixedFrames {
    fn next_frame(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.delta)
    }
}

/// Explicit frame loop over a [`FrameSource`] with a cancellation token.
pub struct FrameLoop<S: FrameSource> {
    source: S,
    token: CancelToken,
}

impl<S: FrameSource> FrameLoop<S> {
    /// Create a loop that stops when `token` is cancelled.
    pub fn new(source: S, token: CancelToken) -> Self {
        Self { source, token }
    }

    /// Call `frame` with each delta until the source is exhausted or the
    /// token is cancelled. Returns the number of frames run.
    pub fn run<F: FnMut(f32)>(&mut self, mut frame: F) -> u64 {
        let mut frames = 0;
        while !self.token.is_cancelled() {
            let Some(delta) = self.source.next_frame() else {
                break;
            };
            frame(delta);
            frames += 1;
        }
        frames
    }
}
