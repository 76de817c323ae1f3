//! Frame assembly
//!
//! [`FrameGenerator`] owns the renderer and its drawing surface. Callers
//! keep it behind a mutex so only one frame is in flight at a time.

use super::canvas_renderer::{EncodedImage, FrameRenderer, PngFrameRenderer};
use super::viewport::CoordinateSpace;
use crate::imaging::ScanImage;
use spectroplot_core::{ImagingError, MachineStateSnapshot, Position3};

/// One rendered frame plus the machine state it was drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub image: EncodedImage,
    pub state: MachineStateSnapshot,
    /// Frames produced by this generator so far, this one included
    pub sequence: u64,
}

impl RenderFrame {
    /// Metadata as HTTP-style header pairs
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.image.content_type.to_string()),
            ("Content-Length", self.image.bytes.len().to_string()),
            ("Plotter-State", self.state.state.clone()),
            ("Plotter-Position", position_json(&self.state.position)),
            ("Targeting-Position", position_json(&self.state.targeting)),
        ]
    }
}

fn position_json(position: &Position3) -> String {
    serde_json::to_string(position).unwrap_or_else(|_| "{}".to_string())
}

/// Long-lived frame producer
pub struct FrameGenerator {
    renderer: Box<dyn FrameRenderer>,
    frames: u64,
}

impl Default for FrameGenerator {
    fn default() -> Self {
        Self::new(Box::new(PngFrameRenderer::new()))
    }
}

impl FrameGenerator {
    pub fn new(renderer: Box<dyn FrameRenderer>) -> Self {
        Self {
            renderer,
            frames: 0,
        }
    }

    /// Frames produced so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Render the current image with a cursor at the machine position
    pub fn next_frame(
        &mut self,
        image: &ScanImage,
        space: &CoordinateSpace,
        state: MachineStateSnapshot,
    ) -> Result<RenderFrame, ImagingError> {
        let field = image.render();
        let cursor = space.workspace_to_display(state.position.x, state.position.y);
        let encoded = self.renderer.render(&field, Some(cursor), space)?;

        self.frames += 1;
        tracing::trace!(
            "Frame {} rendered ({} bytes)",
            self.frames,
            encoded.bytes.len()
        );
        Ok(RenderFrame {
            image: encoded,
            state,
            sequence: self.frames,
        })
    }
}
