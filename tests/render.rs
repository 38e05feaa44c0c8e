use once_cell::sync::Lazy;

use gradramp::{Color, ColorStop, Gradient, IntSize, Point, Transform};
use tiny_skia::Pixmap;

static RED_TO_BLUE: Lazy<Vec<ColorStop>> = Lazy::new(|| {
    vec![
        ColorStop::new(0.0, Color::from_rgba8(255, 0, 0, 255)),
        ColorStop::new(1.0, Color::from_rgba8(0, 0, 255, 255)),
    ]
});

fn vertical_gradient(height: f32) -> Gradient {
    let mut gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(0.0, height));
    for stop in RED_TO_BLUE.iter() {
        gradient.add_stop(*stop);
    }
    gradient
}

fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let p = pixmap.pixel(x, y).unwrap();
    (p.red(), p.green(), p.blue(), p.alpha())
}

#[test]
fn fills_a_vertical_gradient() {
    let mut gradient = vertical_gradient(8.0);
    let mut pixmap = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();

    for y in 0..8 {
        let left = rgba(&pixmap, 0, y);
        for x in 1..8 {
            assert_eq!(rgba(&pixmap, x, y), left, "row {} is not uniform", y);
        }
    }

    let top = rgba(&pixmap, 0, 0);
    let bottom = rgba(&pixmap, 0, 7);
    assert!(top.0 > top.2);
    assert!(bottom.2 > bottom.0);

    // The ramp is monotone from red to blue.
    for y in 1..8 {
        assert!(rgba(&pixmap, 0, y).2 > rgba(&pixmap, 0, y - 1).2);
        assert!(rgba(&pixmap, 0, y).0 < rgba(&pixmap, 0, y - 1).0);
    }
}

#[test]
fn rendering_caches_a_platform_resource() {
    let mut gradient = vertical_gradient(8.0);
    assert!(!gradient.has_platform_resource());

    let mut pixmap = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();
    assert!(gradient.has_platform_resource());

    // The second pass goes through the cached shader and must
    // produce identical pixels.
    let mut second = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut second.as_mut()).unwrap();
    assert_eq!(pixmap.data(), second.data());
}

#[test]
fn stop_edits_invalidate_the_cached_resource() {
    let mut gradient = vertical_gradient(8.0);
    let mut pixmap = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();

    gradient.add_color_stop(0.5, Color::from_rgba8(0, 255, 0, 255));
    assert!(!gradient.has_platform_resource());

    let mut second = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut second.as_mut()).unwrap();
    assert!(gradient.has_platform_resource());

    // The middle is now dominated by the new green stop.
    assert_eq!(rgba(&pixmap, 4, 4).1, 0);
    assert!(rgba(&second, 4, 4).1 > 128);
}

#[test]
fn transform_updates_reach_the_cached_shader() {
    let mut gradient = vertical_gradient(8.0);
    let mut original = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut original.as_mut()).unwrap();

    gradient.set_gradient_space_transform(Transform::from_translate(0.0, 2.0));
    assert!(gradient.has_platform_resource());

    let mut shifted = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut shifted.as_mut()).unwrap();

    // The ramp moved two rows down.
    for y in 2..8 {
        assert_eq!(rgba(&shifted, 0, y), rgba(&original, 0, y - 2), "row {}", y);
    }
    assert_ne!(shifted.data(), original.data());
}

#[test]
fn empty_gradient_leaves_the_pixmap_unchanged() {
    let mut gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(0.0, 8.0));

    let mut pixmap = Pixmap::new(8, 8).unwrap();
    pixmap.fill(Color::from_rgba8(255, 255, 255, 255));
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();

    assert!(pixmap.data().iter().all(|&b| b == 255));
}

#[test]
fn opaque_gradients_overwrite_the_backdrop() {
    let mut gradient = vertical_gradient(8.0);

    let mut plain = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut plain.as_mut()).unwrap();

    let mut gradient = vertical_gradient(8.0);
    let mut prefilled = Pixmap::new(8, 8).unwrap();
    prefilled.fill(Color::from_rgba8(0, 255, 0, 255));
    gradpaint::render(&mut gradient, &mut prefilled.as_mut()).unwrap();

    assert_eq!(plain.data(), prefilled.data());
}

#[test]
fn translucent_stops_blend_with_the_backdrop() {
    let mut gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(0.0, 8.0));
    gradient.add_color_stop(0.0, Color::from_rgba(1.0, 0.0, 0.0, 0.5).unwrap());
    gradient.add_color_stop(1.0, Color::from_rgba(1.0, 0.0, 0.0, 0.5).unwrap());
    assert!(gradient.has_alpha());

    let mut pixmap = Pixmap::new(8, 8).unwrap();
    pixmap.fill(Color::from_rgba8(255, 255, 255, 255));
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();

    // Half red over white: red saturates, the other channels halve.
    let (r, g, b, a) = rgba(&pixmap, 4, 4);
    assert_eq!(r, 255);
    assert_eq!(a, 255);
    assert!((120..=136).contains(&g));
    assert!((120..=136).contains(&b));
}

#[test]
fn unrenderable_geometry_reports_failure() {
    let mut gradient = Gradient::new_linear(Point::from_xy(3.0, 3.0), Point::from_xy(3.0, 3.0));
    for stop in RED_TO_BLUE.iter() {
        gradient.add_stop(*stop);
    }

    let mut pixmap = Pixmap::new(4, 4).unwrap();
    assert!(gradpaint::render(&mut gradient, &mut pixmap.as_mut()).is_none());
    assert!(!gradient.has_platform_resource());
}

#[test]
fn tiled_rendering_matches_direct_rendering() {
    let mut gradient = vertical_gradient(8.0);
    let mut direct = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut direct.as_mut()).unwrap();

    let mut gradient = vertical_gradient(8.0);
    let mut tiled = Pixmap::new(8, 8).unwrap();
    let tile_size = IntSize::from_wh(8, 8).unwrap();
    gradpaint::render_tiled(&mut gradient, tile_size, &mut tiled.as_mut()).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let a = rgba(&direct, x, y);
            let b = rgba(&tiled, x, y);
            let close = |p: u8, q: u8| (i32::from(p) - i32::from(q)).abs() <= 1;
            assert!(
                close(a.0, b.0) && close(a.1, b.1) && close(a.2, b.2) && close(a.3, b.3),
                "pixel {},{}: {:?} vs {:?}",
                x,
                y,
                a,
                b
            );
        }
    }
}

#[test]
fn tiles_repeat_across_the_target() {
    let center = Point::from_xy(2.0, 2.0);
    let mut gradient = Gradient::new_radial(center, 0.0, center, 2.0, 1.0).unwrap();
    gradient.add_color_stop(0.0, Color::from_rgba8(255, 255, 255, 255));
    gradient.add_color_stop(1.0, Color::from_rgba8(0, 0, 0, 255));

    let mut pixmap = Pixmap::new(8, 8).unwrap();
    let tile_size = IntSize::from_wh(4, 4).unwrap();
    gradpaint::render_tiled(&mut gradient, tile_size, &mut pixmap.as_mut()).unwrap();

    for y in 0..4 {
        for x in 0..4 {
            let base = rgba(&pixmap, x, y);
            assert_eq!(base, rgba(&pixmap, x + 4, y));
            assert_eq!(base, rgba(&pixmap, x, y + 4));
            assert_eq!(base, rgba(&pixmap, x + 4, y + 4));
        }
    }

    // Each tile is a radial ramp: bright at the center, dark in the
    // corners.
    assert!(rgba(&pixmap, 2, 2).0 > 140);
    assert!(rgba(&pixmap, 0, 0).0 < 40);
}

#[test]
fn radial_aspect_ratio_squashes_the_vertical_axis() {
    let center = Point::from_xy(4.0, 4.0);
    let mut gradient = Gradient::new_radial(center, 0.0, center, 3.0, 2.0).unwrap();
    gradient.add_color_stop(0.0, Color::from_rgba8(255, 255, 255, 255));
    gradient.add_color_stop(1.0, Color::from_rgba8(0, 0, 0, 255));

    let mut pixmap = Pixmap::new(8, 8).unwrap();
    gradpaint::render(&mut gradient, &mut pixmap.as_mut()).unwrap();

    // Equidistant probes: the horizontal one stays inside the ramp
    // while the vertical one is pushed past the end radius.
    let horizontal = rgba(&pixmap, 5, 4);
    let vertical = rgba(&pixmap, 4, 5);
    assert!(horizontal.0 > 60);
    assert!(vertical.0 < 5);
}

#[test]
fn empty_gradient_becomes_a_transparent_shader() {
    let gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(1.0, 0.0));

    match gradpaint::to_shader(&gradient, 1.0) {
        Some(tiny_skia::Shader::SolidColor(color)) => assert_eq!(color, Color::TRANSPARENT),
        _ => panic!("expected a solid transparent shader"),
    }
}

#[test]
fn a_single_stop_becomes_a_solid_shader() {
    let color = Color::from_rgba8(10, 20, 30, 255);
    let mut gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(1.0, 0.0));
    gradient.add_color_stop(0.5, color);

    match gradpaint::to_shader(&gradient, 1.0) {
        Some(tiny_skia::Shader::SolidColor(c)) => assert_eq!(c, color),
        _ => panic!("expected a solid shader"),
    }
}

#[test]
fn opacity_scales_stop_alpha() {
    let mut gradient = Gradient::new_linear(Point::from_xy(0.0, 0.0), Point::from_xy(1.0, 0.0));
    gradient.add_color_stop(0.5, Color::from_rgba(0.0, 0.0, 1.0, 1.0).unwrap());

    match gradpaint::to_shader(&gradient, 0.5) {
        Some(tiny_skia::Shader::SolidColor(color)) => assert_eq!(color.alpha(), 0.5),
        _ => panic!("expected a solid shader"),
    }
}

#[test]
fn zero_length_linear_geometry_is_rejected() {
    let point = Point::from_xy(3.0, 3.0);
    let mut gradient = Gradient::new_linear(point, point);
    for stop in RED_TO_BLUE.iter() {
        gradient.add_stop(*stop);
    }

    assert!(gradpaint::to_shader(&gradient, 1.0).is_none());
}

#[test]
fn zero_radius_radial_geometry_is_rejected() {
    let center = Point::from_xy(3.0, 3.0);
    let mut gradient = Gradient::new_radial(center, 0.0, center, 0.0, 1.0).unwrap();
    for stop in RED_TO_BLUE.iter() {
        gradient.add_stop(*stop);
    }

    assert!(gradpaint::to_shader(&gradient, 1.0).is_none());
}
