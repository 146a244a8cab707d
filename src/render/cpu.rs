use crate::animation::timeline::FrameState;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::render::backend::FrameRGBA;
use crate::render::target::RenderTarget;
use crate::render::text::{TextBrushRgba8, TextLayoutEngine, TextStyle};
use crate::scene::model::Scene;
use crate::scene::options::RenderOptions;
use std::collections::HashMap;
use std::sync::Arc;
use vello_cpu::kurbo::Shape as _;

const TEXT_PRIMARY: Rgba8 = Rgba8::rgb(0xf8, 0xfa, 0xfc);
const TEXT_MUTED: Rgba8 = Rgba8::rgb(0xe2, 0xe8, 0xf0);

/// Positions of every scene element at rest, in target pixels.
///
/// Derived from the 1920x1080 reference layout scaled uniformly to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLayout {
    /// Uniform scale relative to the reference layout.
    pub scale: f64,
    /// Horizontal center of the title and top of its first line.
    pub title_anchor: Point,
    /// Maximum title line width.
    pub title_max_width: f64,
    /// Content panel box.
    pub panel: Rect,
    /// Inner padding of the panel.
    pub panel_padding: f64,
    /// Top-left of the first bullet marker.
    pub bullets_origin: Point,
    /// Vertical distance between bullets.
    pub bullet_step: f64,
    /// Maximum bullet text width.
    pub bullet_max_width: f64,
}

impl SceneLayout {
    /// Compute the layout for a `width x height` target.
    pub fn for_size(width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        let s = (w / 1920.0).min(h / 1080.0);

        let margin = 120.0 * s;
        let panel_top = 300.0 * s;
        let panel = Rect::new(margin, panel_top, margin + 960.0 * s, h - 140.0 * s);
        let bullets_x = panel.x1 + 80.0 * s;

        Self {
            scale: s,
            title_anchor: Point::new(w / 2.0, 110.0 * s),
            title_max_width: w - 2.0 * margin,
            panel,
            panel_padding: 40.0 * s,
            bullets_origin: Point::new(bullets_x, panel_top + 20.0 * s),
            bullet_step: 96.0 * s,
            bullet_max_width: (w - bullets_x - 44.0 * s - margin).max(1.0),
        }
    }

    fn title_size(&self) -> f32 {
        (72.0 * self.scale) as f32
    }

    fn visual_size(&self) -> f32 {
        (34.0 * self.scale) as f32
    }

    fn bullet_size(&self) -> f32 {
        (32.0 * self.scale) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    top: [u8; 4],
    bottom: [u8; 4],
    w: u32,
    h: u32,
}

/// CPU frame renderer: `(scene, progress) -> pixels` on an explicit [`RenderTarget`].
///
/// Output is a deterministic function of the scene, the progress fraction, the options and the
/// target size.
pub struct SceneRenderer {
    opts: RenderOptions,
    text: TextLayoutEngine,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
}

impl SceneRenderer {
    /// Create a renderer for `opts`, resolving its font once.
    pub fn new(opts: &RenderOptions) -> TrainreelResult<Self> {
        Ok(Self {
            opts: opts.clone(),
            text: TextLayoutEngine::new(&opts.font)?,
            gradient_cache: HashMap::new(),
        })
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.opts
    }

    /// Render `scene` at `progress` into `target`.
    pub fn render(
        &mut self,
        target: &mut RenderTarget,
        scene: &Scene,
        progress: f64,
    ) -> TrainreelResult<()> {
        let state = FrameState::at(progress, scene.on_screen_text.len());
        let layout = SceneLayout::for_size(target.width(), target.height());
        let (w, h) = (f64::from(target.width()), f64::from(target.height()));
        let background = self.gradient_paint(target.width(), target.height())?;

        target.begin();
        let ctx = &mut target.ctx;
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Fade-to-black base.
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        if state.frame_opacity > 0.0 {
            let faded = state.frame_opacity < 1.0;
            if faded {
                ctx.push_opacity_layer(state.frame_opacity as f32);
            }

            ctx.set_paint(background);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            self.draw_decorations(ctx, &layout, w, h);
            self.draw_title(ctx, &layout, scene, &state)?;
            self.draw_panel(ctx, &layout, scene, &state)?;
            self.draw_bullets(ctx, &layout, scene, &state)?;

            if faded {
                ctx.pop_layer();
            }
        }

        target.resolve();
        Ok(())
    }

    /// Render into `target` and copy the result out.
    pub fn render_frame(
        &mut self,
        target: &mut RenderTarget,
        scene: &Scene,
        progress: f64,
    ) -> TrainreelResult<FrameRGBA> {
        self.render(target, scene, progress)?;
        Ok(target.read_frame())
    }

    fn draw_decorations(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &SceneLayout,
        w: f64,
        h: f64,
    ) {
        let s = layout.scale;
        set_color(ctx, self.opts.primary_color.with_alpha(0.08));
        ctx.fill_path(
            &vello_cpu::kurbo::Circle::new((w - 160.0 * s, 120.0 * s), 320.0 * s).to_path(0.1),
        );
        set_color(ctx, self.opts.secondary_color.with_alpha(0.08));
        ctx.fill_path(
            &vello_cpu::kurbo::Circle::new((140.0 * s, h - 60.0 * s), 260.0 * s).to_path(0.1),
        );
    }

    fn draw_title(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &SceneLayout,
        scene: &Scene,
        state: &FrameState,
    ) -> TrainreelResult<()> {
        let title = state.title;
        if title.opacity <= 0.0 || scene.title.is_empty() {
            return Ok(());
        }
        let s = layout.scale;
        let text = self.text.layout(
            &scene.title,
            TextStyle {
                size_px: layout.title_size(),
                bold: true,
                max_width_px: Some(layout.title_max_width as f32),
            },
        )?;

        let anchor = layout.title_anchor;
        let pivot = Vec2::new(anchor.x, anchor.y + f64::from(text.height()) / 2.0);
        let tr = Affine::translate(Vec2::new(0.0, title.offset_y * s))
            * Affine::translate(pivot)
            * Affine::scale(title.scale)
            * Affine::translate(-pivot);

        push_opacity(ctx, title.opacity);
        let left = anchor.x - layout.title_max_width / 2.0;
        self.fill_text_lines(
            ctx,
            &text,
            tr,
            |line_advance| left + (layout.title_max_width - line_advance) / 2.0,
            anchor.y,
            TEXT_PRIMARY,
            |_| 1.0,
        );

        let bar_w = 120.0 * s;
        let bar_y = anchor.y + f64::from(text.height()) + 18.0 * s;
        let bar = Rect::new(anchor.x - bar_w / 2.0, bar_y, anchor.x + bar_w / 2.0, bar_y + 6.0 * s);
        ctx.set_transform(affine_to_cpu(tr));
        set_color(ctx, self.opts.primary_color);
        ctx.fill_path(&rounded_rect_to_cpu(bar, 3.0 * s));
        pop_opacity(ctx, title.opacity);
        Ok(())
    }

    fn draw_panel(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &SceneLayout,
        scene: &Scene,
        state: &FrameState,
    ) -> TrainreelResult<()> {
        let panel = state.panel;
        if panel.opacity <= 0.0 {
            return Ok(());
        }
        let s = layout.scale;
        let tr = Affine::translate(Vec2::new(0.0, panel.offset_y * s));
        let rect = layout.panel;

        push_opacity(ctx, panel.opacity);
        ctx.set_transform(affine_to_cpu(tr));
        set_color(ctx, Rgba8::rgb(255, 255, 255).with_alpha(0.06));
        ctx.fill_path(&rounded_rect_to_cpu(rect, 24.0 * s));
        set_color(ctx, self.opts.primary_color);
        ctx.fill_path(&rounded_rect_to_cpu(
            Rect::new(rect.x0, rect.y0 + 24.0 * s, rect.x0 + 6.0 * s, rect.y1 - 24.0 * s),
            3.0 * s,
        ));

        if !scene.visual.is_empty() {
            let pad = layout.panel_padding;
            let text = self.text.layout(
                &scene.visual,
                TextStyle {
                    size_px: layout.visual_size(),
                    bold: false,
                    max_width_px: Some((rect.width() - 2.0 * pad).max(1.0) as f32),
                },
            )?;
            let line_count = text.lines().count();
            self.fill_text_lines(
                ctx,
                &text,
                tr,
                |_| rect.x0 + pad,
                rect.y0 + pad,
                TEXT_MUTED,
                |i| state.panel_line_opacity(i, line_count),
            );
        }
        pop_opacity(ctx, panel.opacity);
        Ok(())
    }

    fn draw_bullets(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &SceneLayout,
        scene: &Scene,
        state: &FrameState,
    ) -> TrainreelResult<()> {
        let s = layout.scale;
        for (i, (item, b)) in scene.on_screen_text.iter().zip(&state.bullets).enumerate() {
            if b.opacity <= 0.0 {
                continue;
            }
            let origin = Point::new(
                layout.bullets_origin.x,
                layout.bullets_origin.y + layout.bullet_step * i as f64,
            );
            let tr = Affine::translate(Vec2::new(b.offset_x * s, 0.0));
            let marker = if i % 2 == 0 {
                self.opts.primary_color
            } else {
                self.opts.secondary_color
            };

            push_opacity(ctx, b.opacity);
            ctx.set_transform(affine_to_cpu(tr));
            set_color(ctx, marker);
            ctx.fill_path(
                &vello_cpu::kurbo::Circle::new((origin.x + 10.0 * s, origin.y + 22.0 * s), 10.0 * s)
                    .to_path(0.1),
            );

            if !item.is_empty() {
                let text = self.text.layout(
                    item,
                    TextStyle {
                        size_px: layout.bullet_size(),
                        bold: false,
                        max_width_px: Some(layout.bullet_max_width as f32),
                    },
                )?;
                self.fill_text_lines(
                    ctx,
                    &text,
                    tr,
                    |_| origin.x + 44.0 * s,
                    origin.y,
                    TEXT_PRIMARY,
                    |_| 1.0,
                );
            }
            pop_opacity(ctx, b.opacity);
        }
        Ok(())
    }

    /// Draw every line of `text`, placing line `i` at `x_for(advance)` and the layout top at `top`.
    #[allow(clippy::too_many_arguments)]
    fn fill_text_lines(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &Arc<parley::Layout<TextBrushRgba8>>,
        tr: Affine,
        x_for: impl Fn(f64) -> f64,
        top: f64,
        color: Rgba8,
        line_opacity: impl Fn(usize) -> f64,
    ) {
        for (i, line) in text.lines().enumerate() {
            let opacity = line_opacity(i);
            if opacity <= 0.0 {
                continue;
            }
            let x = x_for(f64::from(line.metrics().advance));
            ctx.set_transform(affine_to_cpu(tr * Affine::translate(Vec2::new(x, top))));
            set_color(ctx, color);
            push_opacity(ctx, opacity);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font = self.text.vello_font(run.run().font());
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
            pop_opacity(ctx, opacity);
        }
    }

    fn gradient_paint(&mut self, w: u32, h: u32) -> TrainreelResult<vello_cpu::Image> {
        let top = self.opts.background_color;
        let bottom = top.mix(self.opts.secondary_color, 0.25);
        let key = GradientKey {
            top: top.to_array(),
            bottom: bottom.to_array(),
            w,
            h,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }

        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        let h1 = (h.max(1) - 1) as f32;
        for y in 0..h {
            let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
            let c = top.mix(bottom, t).premultiplied().to_array();
            let row = (y as usize) * (w as usize) * 4;
            for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&c);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn push_opacity(ctx: &mut vello_cpu::RenderContext, opacity: f64) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity.clamp(0.0, 1.0) as f32);
    }
}

fn pop_opacity(ctx: &mut vello_cpu::RenderContext, opacity: f64) {
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rounded_rect_to_cpu(r: Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::RoundedRect::new(r.x0, r.y0, r.x1, r.y1, radius).to_path(0.1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> TrainreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TrainreelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TrainreelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(TrainreelError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> TrainreelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
