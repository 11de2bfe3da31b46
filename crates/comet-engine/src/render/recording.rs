//! Headless render surface.

use tracing::trace;

use super::{Color, DrawCommand, RenderSurface};

/// A presented frame: the clear color plus commands in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub clear: Color,
    pub commands: Vec<(i32, DrawCommand)>,
}

impl RecordedFrame {
    /// Commands on one layer, in draw order.
    pub fn layer(&self, layer: i32) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(move |(l, _)| *l == layer)
            .map(|(_, c)| c)
    }
}

/// Keeps the last presented frame in memory instead of drawing it.
///
/// Optionally closes itself after a fixed number of presented frames, which
/// is how headless runs of [`FrameLoop::run_until_closed`](crate::frame::FrameLoop::run_until_closed)
/// terminate.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    open: bool,
    pending: Vec<(i32, DrawCommand)>,
    last: Option<RecordedFrame>,
    presented: u64,
    close_after: Option<u64>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            open: true,
            ..Default::default()
        }
    }

    /// Close automatically once `frames` frames were presented.
    pub fn with_frame_budget(frames: u64) -> Self {
        Self {
            close_after: Some(frames),
            ..Self::new()
        }
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.last.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }
}

impl RenderSurface for RecordingSurface {
    fn is_open(&self) -> bool {
        self.open
    }

    fn draw_world(&mut self, command: DrawCommand, layer: i32) {
        self.pending.push((layer, command));
    }

    fn present(&mut self, clear: Color) {
        let mut commands = std::mem::take(&mut self.pending);
        commands.sort_by_key(|(layer, _)| *layer);
        trace!(commands = commands.len(), frame = self.presented, "present");
        self.last = Some(RecordedFrame { clear, commands });
        self.presented += 1;
        if self.close_after.is_some_and(|budget| self.presented >= budget) {
            self.close();
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}
