use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::foundation::math::Fnv1a64;
use crate::scene::options::FontSource;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_CACHED_LAYOUTS: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Text styling request for [`TextLayoutEngine::layout`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle {
    pub(crate) size_px: f32,
    pub(crate) bold: bool,
    pub(crate) max_width_px: Option<f32>,
}

/// Stateful helper for building (and caching) Parley layouts.
///
/// Font resolution happens once at construction: either the system `sans-serif` family or the
/// family registered from a font file.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    layouts: HashMap<u64, Arc<parley::Layout<TextBrushRgba8>>>,
    fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl TextLayoutEngine {
    /// Construct a layout engine for `source`.
    pub(crate) fn new(source: &FontSource) -> TrainreelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let family = match source {
            FontSource::System => "sans-serif".to_owned(),
            FontSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    TrainreelError::validation(format!(
                        "failed to read font '{}': {e}",
                        path.display()
                    ))
                })?;
                let families = font_ctx
                    .collection
                    .register_fonts(parley::fontique::Blob::from(bytes), None);
                let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                    TrainreelError::validation(format!(
                        "no font families registered from '{}'",
                        path.display()
                    ))
                })?;
                font_ctx
                    .collection
                    .family_name(family_id)
                    .ok_or_else(|| TrainreelError::validation("registered font family has no name"))?
                    .to_string()
            }
        };
        tracing::debug!(family = %family, "text engine ready");

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            layouts: HashMap::new(),
            fonts: HashMap::new(),
        })
    }

    /// Shape and wrap `text`, reusing a cached layout for identical requests.
    ///
    /// Words wider than `max_width_px` are left on their own line and overflow.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        style: TextStyle,
    ) -> TrainreelResult<Arc<parley::Layout<TextBrushRgba8>>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(TrainreelError::render("text size_px must be finite and > 0"));
        }

        let key = layout_key(text, style);
        if let Some(layout) = self.layouts.get(&key) {
            return Ok(Arc::clone(layout));
        }
        if self.layouts.len() >= MAX_CACHED_LAYOUTS {
            self.layouts.clear();
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        if style.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(style.max_width_px);
        layout.align(
            style.max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let layout = Arc::new(layout);
        self.layouts.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    /// `vello_cpu` handle for the font Parley picked for a glyph run.
    pub(crate) fn vello_font(&mut self, font: &parley::FontData) -> vello_cpu::peniko::FontData {
        self.fonts
            .entry((font.data.id(), font.index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                    font.index,
                )
            })
            .clone()
    }
}

fn layout_key(text: &str, style: TextStyle) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(text.as_bytes());
    h.write_u32(style.size_px.to_bits());
    h.write_u32(u32::from(style.bold));
    h.write_u32(style.max_width_px.map_or(u32::MAX, f32::to_bits));
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
