use std::time::{Duration, Instant};

/// Handle for one "call me before the next repaint" registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Host frame scheduler: collects requests and releases them once per frame
/// interval. Each request is delivered at most once.
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
    next_id: u64,
    pending: Vec<FrameRequest>,
}

impl FramePacer {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next_frame: now,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }

    /// `None` until the next frame boundary. At a boundary, drains every
    /// pending request; the list may be empty, the host still presents.
    pub fn take_due(&mut self, now: Instant) -> Option<Vec<FrameRequest>> {
        if now < self.next_frame {
            return None;
        }
        self.next_frame += self.interval;
        // Don't replay frames we slept through
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

impl FrameScheduler for FramePacer {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id);
        self.next_id += 1;
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|pending| *pending != request);
    }
}
