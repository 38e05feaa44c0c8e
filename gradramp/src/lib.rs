// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`gradramp` is a color gradient representation used by
[gradpaint](https://github.com/RazrFalcon/gradpaint).

A [`Gradient`] stores the gradient geometry, a spread method, a gradient
space transform and a list of color stops. Its main query,
[`Gradient::color_at`], resolves the color at a position along the
gradient axis by interpolating between the two closest stops.

Stops are kept in insertion order and are stable-sorted by position
right before the first read. Color resolution also caches the last
matched stop interval, so a sequence of queries with non-decreasing
positions, like a rasterizer sweep, runs in amortized constant time
per call.

A rendering backend can cache its own paint object on the gradient
via [`Gradient::set_platform_resource`]. The cache is dropped whenever
the stop list changes.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
#![allow(clippy::derivable_impls)]

use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::cmp::Ordering;

pub use strict_num::{self, NonZeroPositiveF32, PositiveF32};

pub use tiny_skia;
pub use tiny_skia::{Color, IntSize, Point, Rect, Transform};

/// A spread method.
///
/// Defines how a gradient is extrapolated outside the 0..=1 range
/// of its axis.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

impl Default for SpreadMethod {
    fn default() -> Self {
        Self::Pad
    }
}

impl std::str::FromStr for SpreadMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" => Ok(SpreadMethod::Pad),
            "reflect" => Ok(SpreadMethod::Reflect),
            "repeat" => Ok(SpreadMethod::Repeat),
            _ => Err("invalid"),
        }
    }
}

/// A gradient stop.
///
/// Pins a color at a position along the gradient axis.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ColorStop {
    /// Position along the gradient axis.
    ///
    /// Usually in the 0..=1 range, but any finite value is accepted.
    /// Out of range positions are resolved via clamping.
    pub position: f32,

    /// Stop color.
    pub color: Color,
}

impl ColorStop {
    /// Creates a new stop.
    pub fn new(position: f32, color: Color) -> Self {
        ColorStop { position, color }
    }
}

/// A gradient geometry.
///
/// Selected at construction time. A gradient is either linear or radial
/// for its whole lifetime.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GradientKind {
    /// A linear gradient.
    Linear {
        /// Start of the gradient axis.
        start: Point,
        /// End of the gradient axis.
        end: Point,
    },
    /// A radial gradient.
    Radial {
        /// Center of the start circle.
        start: Point,
        /// Radius of the start circle.
        start_radius: PositiveF32,
        /// Center of the end circle.
        end: Point,
        /// Radius of the end circle.
        end_radius: PositiveF32,
        /// Ratio between the horizontal and vertical radii.
        ///
        /// Values other than 1 turn the gradient circles into ellipses.
        aspect_ratio: NonZeroPositiveF32,
    },
}

/// A platform gradient resource.
///
/// A rendering backend maps a [`Gradient`] onto some native paint
/// object and caches it on the gradient itself via
/// [`Gradient::set_platform_resource`]. The gradient owns the resource
/// and drops it whenever its stop list changes, after which the backend
/// is expected to build a new one.
pub trait PlatformGradient {
    /// Called when the owning gradient's space transform changes.
    fn set_gradient_space_transform(&mut self, transform: Transform);

    /// Returns `self` as `&dyn Any`.
    ///
    /// Allows a backend to downcast the cached resource back into its
    /// concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A color gradient.
///
/// Stores the geometry, the spread method, the gradient space transform
/// and the stop list, and resolves colors along the gradient axis.
pub struct Gradient {
    kind: GradientKind,
    spread_method: SpreadMethod,
    transform: Transform,
    stops: RefCell<Vec<ColorStop>>,
    stops_sorted: Cell<bool>,
    last_stop: Cell<usize>,
    platform: Option<Box<dyn PlatformGradient>>,
}

impl Gradient {
    /// Creates a linear gradient with the axis running from `start` to `end`.
    pub fn new_linear(start: Point, end: Point) -> Self {
        Gradient::new(GradientKind::Linear { start, end })
    }

    /// Creates a radial gradient.
    ///
    /// The gradient axis runs from the circle at `start` with
    /// `start_radius` to the circle at `end` with `end_radius`.
    /// `aspect_ratio` is the ratio between the horizontal and vertical
    /// radii.
    ///
    /// Returns `None` when a radius is negative or not finite,
    /// or when `aspect_ratio` is not a positive finite number.
    pub fn new_radial(
        start: Point,
        start_radius: f32,
        end: Point,
        end_radius: f32,
        aspect_ratio: f32,
    ) -> Option<Self> {
        let kind = GradientKind::Radial {
            start,
            start_radius: PositiveF32::new(start_radius)?,
            end,
            end_radius: PositiveF32::new(end_radius)?,
            aspect_ratio: NonZeroPositiveF32::new(aspect_ratio)?,
        };

        Some(Gradient::new(kind))
    }

    fn new(kind: GradientKind) -> Self {
        Gradient {
            kind,
            spread_method: SpreadMethod::default(),
            transform: Transform::default(),
            stops: RefCell::new(Vec::new()),
            stops_sorted: Cell::new(false),
            last_stop: Cell::new(0),
            platform: None,
        }
    }

    /// Returns the gradient geometry.
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Returns the current spread method.
    pub fn spread_method(&self) -> SpreadMethod {
        self.spread_method
    }

    /// Returns the gradient space transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Returns the stops sorted by position.
    ///
    /// Stops with equal positions keep their insertion order.
    /// The returned guard borrows the gradient.
    pub fn stops(&self) -> Ref<'_, [ColorStop]> {
        self.sort_stops_if_needed();
        Ref::map(self.stops.borrow(), |stops| stops.as_slice())
    }

    /// Adds a stop built from `position` and `color`.
    ///
    /// Stops can be added in any order. `position` is not validated,
    /// see [`ColorStop::position`].
    ///
    /// Drops the cached platform resource, if any.
    pub fn add_color_stop(&mut self, position: f32, color: Color) {
        self.add_stop(ColorStop::new(position, color));
    }

    /// Adds a prebuilt stop.
    ///
    /// Same as [`Gradient::add_color_stop`].
    pub fn add_stop(&mut self, stop: ColorStop) {
        debug_assert!(stop.position.is_finite());

        self.stops.borrow_mut().push(stop);
        self.stops_sorted.set(false);
        self.invalidate_platform_resource();
    }

    /// Resolves the gradient color at `value`.
    ///
    /// `value` is a position along the gradient axis and must be in the
    /// 0..=1 range. The range is checked only in debug builds; in
    /// release builds an out of range value produces an unspecified,
    /// but memory safe, result.
    ///
    /// Positions outside the stop list are clamped to the closest
    /// endpoint stop. A gradient without stops resolves to transparent
    /// black.
    pub fn color_at(&self, value: f32) -> Color {
        debug_assert!((0.0..=1.0).contains(&value));

        if self.stops.borrow().is_empty() {
            return Color::TRANSPARENT;
        }

        self.sort_stops_if_needed();
        let stops = self.stops.borrow();

        let first = stops[0];
        if value <= 0.0 || value <= first.position {
            return first.color;
        }

        let last = stops[stops.len() - 1];
        if value >= 1.0 || value >= last.position {
            return last.color;
        }

        // Neither clamp matched, so there are at least two stops and
        // `value` lies strictly inside the stop range.
        let i = self.find_stop(&stops, value);
        let lo = stops[i];
        let hi = stops[i + 1];

        // `find_stop` guarantees `lo.position <= value < hi.position`,
        // so the denominator is nonzero and `k` is in 0..1.
        let k = (value - lo.position) / (hi.position - lo.position);

        let lerp = |a: f32, b: f32| a + (b - a) * k;
        // Can't fail, because each channel is a mix of two valid channels.
        Color::from_rgba(
            lerp(lo.color.red(), hi.color.red()),
            lerp(lo.color.green(), hi.color.green()),
            lerp(lo.color.blue(), hi.color.blue()),
            lerp(lo.color.alpha(), hi.color.alpha()),
        )
        .unwrap()
    }

    /// Checks if the gradient has at least one translucent stop.
    ///
    /// A stop counts as opaque only when its alpha is exactly 1.
    pub fn has_alpha(&self) -> bool {
        self.stops.borrow().iter().any(|stop| stop.color.alpha() < 1.0)
    }

    /// Sets the spread method.
    ///
    /// Must not be called once a platform resource exists, since
    /// backends do not re-apply the spread method to an already built
    /// resource. Checked only in debug builds.
    pub fn set_spread_method(&mut self, method: SpreadMethod) {
        debug_assert!(
            self.platform.is_none(),
            "the spread method must be set before a platform resource is created"
        );

        self.spread_method = method;
    }

    /// Sets the gradient space transform.
    ///
    /// The transform is forwarded to the platform resource right away,
    /// if one exists. Otherwise the stored value is picked up when the
    /// backend builds the resource.
    pub fn set_gradient_space_transform(&mut self, transform: Transform) {
        self.transform = transform;
        if let Some(ref mut platform) = self.platform {
            platform.set_gradient_space_transform(transform);
        }
    }

    /// Shrinks a tile to a one pixel strip when the gradient is
    /// constant along one of the axes.
    ///
    /// An axis aligned linear gradient produces the same color along
    /// every line orthogonal to its axis. A backend about to tile
    /// `src_rect` out of a `size` sized buffer can therefore paint and
    /// tile a one pixel strip instead: if the gradient runs vertically,
    /// the width collapses to 1, if it runs horizontally, the height
    /// does.
    ///
    /// Radial gradients, diagonal gradients and empty source rects are
    /// left untouched.
    pub fn adjust_for_tiled_drawing(&self, size: &mut IntSize, src_rect: &mut Rect) {
        let (start, end) = match self.kind {
            GradientKind::Linear { start, end } => (start, end),
            GradientKind::Radial { .. } => return,
        };

        if src_rect.width() == 0.0 || src_rect.height() == 0.0 {
            return;
        }

        if start.x == end.x {
            // Can't fail, because the current height/width is already valid.
            *size = IntSize::from_wh(1, size.height()).unwrap();
            *src_rect = Rect::from_xywh(0.0, src_rect.y(), 1.0, src_rect.height()).unwrap();
            return;
        }

        if start.y != end.y {
            return;
        }

        // Can't fail, because the current height/width is already valid.
        *size = IntSize::from_wh(size.width(), 1).unwrap();
        *src_rect = Rect::from_xywh(src_rect.x(), 0.0, src_rect.width(), 1.0).unwrap();
    }

    /// Checks if a platform resource is currently cached.
    pub fn has_platform_resource(&self) -> bool {
        self.platform.is_some()
    }

    /// Returns the cached platform resource.
    pub fn platform_resource(&self) -> Option<&dyn PlatformGradient> {
        self.platform.as_deref()
    }

    /// Returns the cached platform resource.
    // Mutable references are invariant, so the `'static` bound
    // cannot be elided here.
    pub fn platform_resource_mut(&mut self) -> Option<&mut (dyn PlatformGradient + 'static)> {
        self.platform.as_deref_mut()
    }

    /// Caches a platform resource on the gradient.
    ///
    /// The resource stays cached until the stop list changes.
    pub fn set_platform_resource(&mut self, resource: Box<dyn PlatformGradient>) {
        self.platform = Some(resource);
    }

    fn invalidate_platform_resource(&mut self) {
        self.platform = None;
    }

    fn sort_stops_if_needed(&self) {
        if self.stops_sorted.get() {
            return;
        }

        // The sort is stable, so stops with equal positions keep
        // their insertion order.
        self.stops
            .borrow_mut()
            .sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap_or(Ordering::Equal));
        self.stops_sorted.set(true);
    }

    /// Returns the index of the sorted stop interval containing `value`.
    ///
    /// The scan resumes from the interval found by the previous call
    /// when `value` did not move backwards, which makes a monotonic
    /// query sequence amortized O(1) per call and any other sequence
    /// O(n) in the worst case. The cursor never affects results, only
    /// the scan cost.
    fn find_stop(&self, stops: &[ColorStop], value: f32) -> usize {
        debug_assert!(stops.len() >= 2);
        debug_assert!(self.last_stop.get() < stops.len() - 1);

        let cursor = self.last_stop.get();
        let mut i = if value < stops[cursor].position {
            // The cursor is ahead of `value`. Restart from the front.
            1
        } else {
            cursor + 1
        };

        while i < stops.len() - 1 && value >= stops[i].position {
            i += 1;
        }

        self.last_stop.set(i - 1);
        i - 1
    }
}

impl PartialEq for Gradient {
    /// Gradients are equal when they paint the same: same geometry,
    /// spread method, transform and stops. The lookup caches and a
    /// cached platform resource do not participate.
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind
            || self.spread_method != other.spread_method
            || self.transform != other.transform
        {
            return false;
        }

        // Both sides are sorted first, so the stop insertion order
        // does not affect the result.
        self.sort_stops_if_needed();
        other.sort_stops_if_needed();
        *self.stops.borrow() == *other.stops.borrow()
    }
}

impl std::fmt::Debug for Gradient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gradient")
            .field("kind", &self.kind)
            .field("spread_method", &self.spread_method)
            .field("transform", &self.transform)
            .field("stops", &self.stops)
            .field("has_platform_resource", &self.platform.is_some())
            .finish()
    }
}
