/// Handle for one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host frame loop, the equivalent of `requestAnimationFrame`.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameToken;
    /// Withdraw a pending request. Unknown or already-fired tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self) -> FrameToken {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        (**self).cancel_frame(token);
    }
}

/// A frame callback that came due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DueFrame {
    /// Token returned by the matching [`FrameScheduler::request_frame`].
    pub token: FrameToken,
    /// Frame timestamp in milliseconds.
    pub time_ms: f64,
}

/// Deterministic scheduler driven by explicit time steps.
///
/// At most one request is pending; a new request replaces the previous one.
#[derive(Clone, Debug, Default)]
pub struct ManualFrameClock {
    now_ms: f64,
    next_token: u64,
    pending: Option<FrameToken>,
    requested: u64,
}

impl ManualFrameClock {
    /// Clock starting at `start_ms`.
    pub fn starting_at(start_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            ..Self::default()
        }
    }

    /// Current time.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// A callback is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Total requests made so far, cancelled ones included.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Move time forward by `step_ms` and fire the pending callback, if any.
    pub fn advance(&mut self, step_ms: f64) -> Option<DueFrame> {
        self.now_ms += step_ms;
        let token = self.pending.take()?;
        Some(DueFrame {
            token,
            time_ms: self.now_ms,
        })
    }
}

impl FrameScheduler for ManualFrameClock {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        self.requested += 1;
        let token = FrameToken(self.next_token);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
