// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use gradramp::{ColorStop, Gradient, GradientKind, PlatformGradient, SpreadMethod};

use crate::OptionLog;

/// Converts a gradient into a tiny-skia shader.
///
/// `opacity` is multiplied into every stop alpha and must be in the
/// 0..=1 range. The range is checked only in debug builds.
///
/// A gradient without stops converts into a fully transparent solid
/// color shader and a gradient with a single stop into a solid color
/// one. Returns `None` when the gradient geometry is degenerate.
pub fn to_shader(gradient: &Gradient, opacity: f32) -> Option<tiny_skia::Shader<'static>> {
    debug_assert!((0.0..=1.0).contains(&opacity));

    build_shader(
        gradient.kind(),
        gradient.spread_method(),
        gradient.transform(),
        &gradient.stops(),
        opacity,
    )
}

fn build_shader(
    kind: GradientKind,
    spread_method: SpreadMethod,
    transform: tiny_skia::Transform,
    stops: &[ColorStop],
    opacity: f32,
) -> Option<tiny_skia::Shader<'static>> {
    if stops.is_empty() {
        return Some(tiny_skia::Shader::SolidColor(tiny_skia::Color::TRANSPARENT));
    }

    let mode = match spread_method {
        SpreadMethod::Pad => tiny_skia::SpreadMode::Pad,
        SpreadMethod::Reflect => tiny_skia::SpreadMode::Reflect,
        SpreadMethod::Repeat => tiny_skia::SpreadMode::Repeat,
    };

    let stops = convert_stops(stops, opacity)?;

    match kind {
        GradientKind::Linear { start, end } => {
            // A zero length axis is not a renderable gradient.
            // tiny-skia itself would fall back to a solid fill here.
            if start == end {
                return None;
            }

            tiny_skia::LinearGradient::new(start, end, stops, mode, transform)
        }
        GradientKind::Radial {
            start,
            start_radius,
            end,
            end_radius,
            aspect_ratio,
        } => {
            if start_radius.get() > 0.0 {
                log::warn!("Gradient start radius is not supported and will be ignored.");
            }

            let mut transform = transform;
            if aspect_ratio.get() != 1.0 {
                // Squash gradient space vertically around the end
                // circle's center, turning the circles into ellipses.
                let ts = tiny_skia::Transform::from_translate(end.x, end.y)
                    .pre_scale(1.0, 1.0 / aspect_ratio.get())
                    .pre_translate(-end.x, -end.y);
                transform = transform.pre_concat(ts);
            }

            tiny_skia::RadialGradient::new(start, end, end_radius.get(), stops, mode, transform)
        }
    }
}

fn convert_stops(stops: &[ColorStop], opacity: f32) -> Option<Vec<tiny_skia::GradientStop>> {
    let mut converted = Vec::with_capacity(stops.len());
    for stop in stops {
        let color = tiny_skia::Color::from_rgba(
            stop.color.red(),
            stop.color.green(),
            stop.color.blue(),
            stop.color.alpha() * opacity,
        )?;
        // `GradientStop::new` clamps out of range positions.
        converted.push(tiny_skia::GradientStop::new(stop.position, color));
    }

    Some(converted)
}

/// A gradient materialized as a tiny-skia shader.
///
/// This is the platform resource [`render`](crate::render) caches on
/// gradients: it keeps the inputs the shader was built from and
/// rebuilds it when the gradient space transform changes.
pub struct ShaderGradient {
    kind: GradientKind,
    spread_method: SpreadMethod,
    transform: tiny_skia::Transform,
    stops: Vec<ColorStop>,
    opacity: f32,
    shader: tiny_skia::Shader<'static>,
}

impl ShaderGradient {
    /// Builds a shader for `gradient`.
    ///
    /// `opacity` is folded into the stop colors, see [`to_shader`].
    /// Returns `None` when the gradient geometry is degenerate.
    pub fn new(gradient: &Gradient, opacity: f32) -> Option<Self> {
        let kind = gradient.kind();
        let spread_method = gradient.spread_method();
        let transform = gradient.transform();
        let stops = gradient.stops().to_vec();
        let shader = build_shader(kind, spread_method, transform, &stops, opacity)?;

        Some(ShaderGradient {
            kind,
            spread_method,
            transform,
            stops,
            opacity,
            shader,
        })
    }

    /// Returns the underlying shader.
    pub fn shader(&self) -> &tiny_skia::Shader<'static> {
        &self.shader
    }
}

impl PlatformGradient for ShaderGradient {
    fn set_gradient_space_transform(&mut self, transform: tiny_skia::Transform) {
        self.transform = transform;

        // A non-invertible transform fails the rebuild. The previous
        // shader is kept in that case.
        let shader = build_shader(
            self.kind,
            self.spread_method,
            self.transform,
            &self.stops,
            self.opacity,
        )
        .log_none(|| log::warn!("Failed to rebuild a gradient shader."));

        if let Some(shader) = shader {
            self.shader = shader;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl std::fmt::Debug for ShaderGradient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderGradient")
            .field("kind", &self.kind)
            .field("spread_method", &self.spread_method)
            .field("transform", &self.transform)
            .field("stops", &self.stops)
            .field("opacity", &self.opacity)
            .finish()
    }
}
