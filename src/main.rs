// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(clippy::uninlined_format_args)]

use gradramp::{ColorStop, Gradient, Point, SpreadMethod};

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process() -> Result<(), String> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    let mut gradient = build_gradient(&args)?;

    let mut pixmap = tiny_skia::Pixmap::new(args.width, args.height)
        .ok_or_else(|| "the output size is too large".to_string())?;

    let rendered = if args.tile {
        // Can't fail, because both lengths are non-zero.
        let tile_size = tiny_skia::IntSize::from_wh(args.width, args.height).unwrap();
        gradpaint::render_tiled(&mut gradient, tile_size, &mut pixmap.as_mut())
    } else {
        gradpaint::render(&mut gradient, &mut pixmap.as_mut())
    };

    if rendered.is_none() {
        return Err("failed to render the gradient".to_string());
    }

    pixmap.save_png(&args.output).map_err(|e| e.to_string())?;

    Ok(())
}

const HELP: &str = "\
gradpaint renders a color gradient into a PNG image.

USAGE:
  gradpaint [OPTIONS] <out-png>

  gradpaint --stop 0:red --stop 1:blue out.png
  gradpaint --radial 128,128,120 --stop 0:white --stop 1:seagreen out.png
  gradpaint --linear 0,0,256,0 --spread reflect --stop '0.5:#fff000' out.png

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version

  -w, --width LENGTH            Sets the output width in pixels
                                [default: 256]
  -h, --height LENGTH           Sets the output height in pixels
                                [default: 256]
  --linear X0,Y0,X1,Y1          Places the gradient axis
                                [default: a vertical axis over the whole image]
  --radial CX,CY,R              Uses a radial gradient with the provided
                                center and radius instead of a linear one
  --stop POS:COLOR              Adds a color stop; can be set multiple times.
                                POS is a number, COLOR is an SVG color
                                Examples: '0:red', '0.25:#fff000', '1:seagreen'
  --spread METHOD               Sets the spread method
                                [default: pad] [possible values: pad, reflect,
                                repeat]
  --tile                        Paints by tiling a one pixel strip when
                                the gradient is axis aligned
  --quiet                       Disables warnings

ARGS:
  <out-png>                     Output file
";

#[derive(Debug)]
struct CliArgs {
    width: u32,
    height: u32,
    linear: Option<(Point, Point)>,
    radial: Option<(Point, f32)>,
    stops: Vec<ColorStop>,
    spread: SpreadMethod,
    tile: bool,
    quiet: bool,
    output: String,
}

fn collect_args() -> Result<CliArgs, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    Ok(CliArgs {
        width: input
            .opt_value_from_fn(["-w", "--width"], parse_length)?
            .unwrap_or(256),
        height: input
            .opt_value_from_fn(["-h", "--height"], parse_length)?
            .unwrap_or(256),
        linear: input.opt_value_from_fn("--linear", parse_axis)?,
        radial: input.opt_value_from_fn("--radial", parse_circle)?,
        stops: input.values_from_fn("--stop", parse_stop)?,
        spread: input.opt_value_from_str("--spread")?.unwrap_or_default(),
        tile: input.contains("--tile"),
        quiet: input.contains("--quiet"),
        output: input.free_from_str()?,
    })
}

fn parse_length(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid length")?;

    if n > 0 {
        Ok(n)
    } else {
        Err("LENGTH cannot be zero".to_string())
    }
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f32>, String> {
    let mut numbers = Vec::with_capacity(count);
    for part in s.split(',') {
        let n: f32 = part.trim().parse().map_err(|_| "invalid number")?;
        if !n.is_finite() {
            return Err("invalid number".to_string());
        }
        numbers.push(n);
    }

    if numbers.len() != count {
        return Err(format!("expected {} comma-separated numbers", count));
    }

    Ok(numbers)
}

fn parse_axis(s: &str) -> Result<(Point, Point), String> {
    let n = parse_numbers(s, 4)?;
    Ok((Point::from_xy(n[0], n[1]), Point::from_xy(n[2], n[3])))
}

fn parse_circle(s: &str) -> Result<(Point, f32), String> {
    let n = parse_numbers(s, 3)?;

    if n[2] <= 0.0 {
        return Err("R must be positive".to_string());
    }

    Ok((Point::from_xy(n[0], n[1]), n[2]))
}

fn parse_stop(s: &str) -> Result<ColorStop, String> {
    let mut parts = s.splitn(2, ':');

    let position: f32 = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|_| "invalid stop position")?;
    if !position.is_finite() {
        return Err("invalid stop position".to_string());
    }

    let color: svgtypes::Color = parts
        .next()
        .ok_or("expected a POS:COLOR pair")?
        .trim()
        .parse()
        .map_err(|_| "invalid stop color")?;

    Ok(ColorStop::new(position, svg_to_skia_color(color)))
}

struct Args {
    width: u32,
    height: u32,
    kind: Kind,
    stops: Vec<ColorStop>,
    spread: SpreadMethod,
    tile: bool,
    quiet: bool,
    output: String,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Kind {
    Linear(Point, Point),
    Radial(Point, f32),
}

fn parse_args() -> Result<Args, String> {
    let args = collect_args().map_err(|e| e.to_string())?;

    if args.linear.is_some() && args.radial.is_some() {
        return Err("--linear and --radial cannot be set at the same time".to_string());
    }

    if args.stops.is_empty() {
        return Err("at least one --stop must be set".to_string());
    }

    let kind = if let Some((center, radius)) = args.radial {
        Kind::Radial(center, radius)
    } else if let Some((start, end)) = args.linear {
        Kind::Linear(start, end)
    } else {
        Kind::Linear(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(0.0, args.height as f32),
        )
    };

    Ok(Args {
        width: args.width,
        height: args.height,
        kind,
        stops: args.stops,
        spread: args.spread,
        tile: args.tile,
        quiet: args.quiet,
        output: args.output,
    })
}

fn build_gradient(args: &Args) -> Result<Gradient, String> {
    let mut gradient = match args.kind {
        Kind::Linear(start, end) => Gradient::new_linear(start, end),
        Kind::Radial(center, radius) => Gradient::new_radial(center, 0.0, center, radius, 1.0)
            .ok_or_else(|| "invalid radial geometry".to_string())?,
    };

    gradient.set_spread_method(args.spread);

    for stop in &args.stops {
        gradient.add_stop(*stop);
    }

    Ok(gradient)
}

fn svg_to_skia_color(color: svgtypes::Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.red, color.green, color.blue, color.alpha)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
