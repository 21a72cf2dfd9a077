//! Frame-driven ticking
//!
//! Games decide whether another frame is wanted; the host owns the actual
//! frame primitive (`requestAnimationFrame` on the web, a plain loop in the
//! native demo). `FrameLoop` keeps track of the pending request so it can be
//! cancelled on reset, state change or teardown.

/// Largest frame delta passed to a game, in milliseconds
pub const MAX_FRAME_DT_MS: f32 = 100.0;

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    /// Schedule another frame
    Continue,
    /// Nothing left to animate
    Stop,
}

impl TickControl {
    pub fn from_bool(keep_going: bool) -> Self {
        if keep_going {
            TickControl::Continue
        } else {
            TickControl::Stop
        }
    }
}

/// Anything advanced once per animation frame
pub trait FrameDriven {
    /// Advance by `dt_ms` milliseconds
    fn tick(&mut self, dt_ms: f32) -> TickControl;
}

/// Host-side frame scheduling primitive
pub trait FrameHost {
    type Handle: Copy + std::fmt::Debug;

    /// Ask for one frame callback; `None` if the host cannot schedule
    fn request_frame(&mut self) -> Option<Self::Handle>;

    /// Drop a previously requested callback
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Tracks at most one pending frame request
#[derive(Debug)]
pub struct FrameLoop<H: FrameHost> {
    host: H,
    pending: Option<H::Handle>,
    last_time_ms: Option<f64>,
}

impl<H: FrameHost> FrameLoop<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            pending: None,
            last_time_ms: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// A frame callback is outstanding
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Request a frame unless one is already pending
    pub fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = self.host.request_frame();
            if self.pending.is_none() {
                log::warn!("Frame host refused a frame request");
            }
        }
    }

    /// Handle a fired frame: tick the game and reschedule if it continues
    pub fn on_frame<G: FrameDriven + ?Sized>(&mut self, game: &mut G, now_ms: f64) -> TickControl {
        self.pending = None;

        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) as f32).clamp(0.0, MAX_FRAME_DT_MS),
            None => 0.0,
        };

        let control = game.tick(dt);
        match control {
            TickControl::Continue => {
                self.last_time_ms = Some(now_ms);
                self.schedule();
            }
            TickControl::Stop => self.last_time_ms = None,
        }
        control
    }

    /// Cancel any outstanding frame and forget timing
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
            log::debug!("Cancelled pending frame {:?}", handle);
        }
        self.last_time_ms = None;
    }
}

impl<H: FrameHost> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Counts requests and cancellations
    #[derive(Debug, Default)]
    pub(crate) struct CountingHost {
        pub next: u32,
        pub requested: u32,
        pub cancelled: Vec<u32>,
    }

    impl FrameHost for CountingHost {
        type Handle = u32;

        fn request_frame(&mut self) -> Option<u32> {
            self.next += 1;
            self.requested += 1;
            Some(self.next)
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    struct Countdown {
        frames_left: u32,
        total_dt: f32,
    }

    impl FrameDriven for Countdown {
        fn tick(&mut self, dt_ms: f32) -> TickControl {
            self.total_dt += dt_ms;
            self.frames_left = self.frames_left.saturating_sub(1);
            TickControl::from_bool(self.frames_left > 0)
        }
    }

    #[test]
    fn test_stop_leaves_nothing_pending() {
        let mut frames = FrameLoop::new(CountingHost::default());
        let mut game = Countdown {
            frames_left: 3,
            total_dt: 0.0,
        };
        frames.schedule();
        let mut now = 0.0;
        while frames.is_pending() {
            now += 16.0;
            frames.on_frame(&mut game, now);
        }
        assert_eq!(game.frames_left, 0);
        assert_eq!(frames.host().requested, 3);
        assert!((game.total_dt - 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_schedule_is_idempotent() {
        let mut frames = FrameLoop::new(CountingHost::default());
        frames.schedule();
        frames.schedule();
        assert_eq!(frames.host().requested, 1);
    }

    #[test]
    fn test_cancel_releases_pending_handle() {
        let mut frames = FrameLoop::new(CountingHost::default());
        frames.schedule();
        frames.cancel();
        assert!(!frames.is_pending());
        assert_eq!(frames.host().cancelled, vec![1]);

        // Second cancel is a no-op
        frames.cancel();
        assert_eq!(frames.host().cancelled.len(), 1);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut frames = FrameLoop::new(CountingHost::default());
        let mut game = Countdown {
            frames_left: 10,
            total_dt: 0.0,
        };
        frames.on_frame(&mut game, 0.0);
        frames.on_frame(&mut game, 5000.0);
        assert!((game.total_dt - MAX_FRAME_DT_MS).abs() < 1e-3);
    }
}
