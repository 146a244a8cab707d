use crate::foundation::core::Canvas;
use crate::foundation::error::TrainreelResult;
use crate::render::backend::FrameRGBA;

/// A drawing surface: a `vello_cpu` render context plus the pixmap it resolves into.
///
/// Every render call takes its target explicitly, so a preview target and a generation target
/// never share state.
pub struct RenderTarget {
    canvas: Canvas,
    pub(crate) ctx: vello_cpu::RenderContext,
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl RenderTarget {
    /// Allocate a target of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> TrainreelResult<Self> {
        let canvas = Canvas::new(width, height)?;
        // Canvas::new guarantees both sides fit in u16.
        let (w, h) = (width as u16, height as u16);
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Target dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Copy the last rendered pixels out as a frame.
    pub fn read_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Borrow the last rendered premultiplied RGBA8 bytes without copying.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn begin(&mut self) {
        self.ctx.reset();
    }

    pub(crate) fn resolve(&mut self) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}
