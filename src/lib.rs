// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
[gradpaint](https://github.com/RazrFalcon/gradpaint) is a gradient
painting library.

It pairs the [`gradramp`] gradient model with a
[tiny-skia](https://github.com/RazrFalcon/tiny-skia) backend:
a gradient is converted into a shader once, cached on the gradient as
its platform resource and reused by later renders until a stop mutation
drops it.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::uninlined_format_args)]

pub use gradramp;
pub use tiny_skia;

mod shader;

pub use shader::{to_shader, ShaderGradient};

use gradramp::Gradient;

/// Fills the whole pixmap with a gradient.
///
/// On the first call a [`ShaderGradient`] is built and cached on the
/// gradient as its platform resource. Later calls reuse it, so an
/// unchanged gradient renders without rebuilding the shader.
///
/// Opaque gradients are written without blending. A gradient without
/// stops leaves the pixmap unchanged.
///
/// Returns `None` when the gradient geometry is degenerate or when the
/// cached platform resource was installed by some other backend.
pub fn render(gradient: &mut Gradient, pixmap: &mut tiny_skia::PixmapMut) -> Option<()> {
    if !gradient.has_platform_resource() {
        let resource = ShaderGradient::new(gradient, 1.0)
            .log_none(|| log::warn!("Failed to build a gradient shader."))?;
        gradient.set_platform_resource(Box::new(resource));
    }

    // A gradient without stops resolves to transparent black and must
    // not overwrite the backdrop.
    let blend_mode = if gradient.has_alpha() || gradient.stops().is_empty() {
        tiny_skia::BlendMode::SourceOver
    } else {
        tiny_skia::BlendMode::Source
    };

    let shader = gradient
        .platform_resource()?
        .as_any()
        .downcast_ref::<ShaderGradient>()
        .log_none(|| log::warn!("The cached gradient resource is not a shader."))?;

    let rect =
        tiny_skia::Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)?;

    let mut paint = tiny_skia::Paint::default();
    paint.shader = shader.shader().clone();
    paint.blend_mode = blend_mode;
    paint.anti_alias = false;

    pixmap.fill_rect(rect, &paint, tiny_skia::Transform::default(), None);

    Some(())
}

/// Fills the pixmap by tiling a gradient patch of `tile_size`.
///
/// The patch is collapsed to a one pixel strip first whenever the
/// gradient allows it, see [`Gradient::adjust_for_tiled_drawing`].
/// The strip is rendered into a scratch pixmap and repeated over the
/// target through a pattern shader that stretches it back to
/// `tile_size`.
///
/// Returns `None` when the gradient geometry is degenerate or the
/// scratch pixmap cannot be allocated.
pub fn render_tiled(
    gradient: &mut Gradient,
    tile_size: tiny_skia::IntSize,
    pixmap: &mut tiny_skia::PixmapMut,
) -> Option<()> {
    let tile_rect = tiny_skia::Rect::from_xywh(
        0.0,
        0.0,
        tile_size.width() as f32,
        tile_size.height() as f32,
    )?;

    let mut size = tile_size;
    let mut src_rect = tile_rect;
    gradient.adjust_for_tiled_drawing(&mut size, &mut src_rect);

    let mut tile = tiny_skia::Pixmap::new(size.width(), size.height()).log_none(|| {
        log::warn!(
            "Failed to allocate a {}x{} gradient tile.",
            size.width(),
            size.height()
        )
    })?;
    render(gradient, &mut tile.as_mut())?;

    // Stretch the possibly collapsed strip back to the requested size.
    let pattern_transform = tiny_skia::Transform::from_scale(
        tile_rect.width() / src_rect.width(),
        tile_rect.height() / src_rect.height(),
    );

    let mut paint = tiny_skia::Paint::default();
    paint.shader = tiny_skia::Pattern::new(
        tile.as_ref(),
        tiny_skia::SpreadMode::Repeat,
        tiny_skia::FilterQuality::Nearest,
        1.0,
        pattern_transform,
    );
    paint.anti_alias = false;

    let rect =
        tiny_skia::Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)?;
    pixmap.fill_rect(rect, &paint, tiny_skia::Transform::default(), None);

    Some(())
}

pub(crate) trait OptionLog {
    fn log_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn log_none<F: FnOnce()>(self, f: F) -> Self {
        self.or_else(|| {
            f();
            None
        })
    }
}
