//! Motion effect compiler.
//!
//! Turns a [`MotionSpec`] into a `zoompan` chain for a still image. The
//! source is cover-scaled to twice the output size, panned/zoomed there,
//! and scaled back down, which hides the sub-pixel stepping `zoompan`
//! shows at the ends of slow ramps.
//!
//! Every expression is closed-form over the normalised frame index
//! `on/frames`, so the clip is exactly `frames` long regardless of speed.

use storyreel_common::error::StoryreelResult;
use storyreel_common::timecode::frame_count;
use storyreel_media_model::{validate_clip_params, MotionSpec, MotionType};

use crate::filter_graph::{Filter, FilterChain};

/// Share of `basePan` used horizontally by the Ken Burns family.
const KENBURNS_PAN_X: f64 = 0.3;
/// Share of `basePan` used vertically by the Ken Burns family.
const KENBURNS_PAN_Y: f64 = 0.2;

/// A compiled per-clip video filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPlan {
    pub filter: FilterChain,
    pub frame_count: u64,
    pub fps: u32,
    /// Whether the chain contains `zoompan` (false for the static loop).
    pub animated: bool,
}

impl MotionPlan {
    /// Length of the rendered clip in seconds.
    pub fn output_duration(&self) -> f64 {
        self.frame_count as f64 / self.fps as f64
    }
}

/// Peak zoom delta for a speed, `0.04 + speed * 0.16`.
pub fn max_zoom_delta(speed: f64) -> f64 {
    0.04 + speed * 0.16
}

/// Pixel travel of a pan over `dimension`, `5% + 15% * speed` of it.
pub fn base_pan(dimension: f64, speed: f64) -> f64 {
    0.05 * dimension + 0.15 * dimension * speed
}

/// Compile `spec` for a clip of `duration` seconds at `fps`.
pub fn compile_motion(
    spec: &MotionSpec,
    duration: f64,
    fps: u32,
    width: u32,
    height: u32,
) -> StoryreelResult<MotionPlan> {
    validate_clip_params(width, height, fps, duration)?;

    let frames = frame_count(duration, fps);
    let speed = spec.effective_speed();
    let (up_w, up_h) = (width as f64 * 2.0, height as f64 * 2.0);
    let (z, x, y) = motion_expressions(spec.kind, speed, frames, up_w, up_h);

    tracing::debug!(
        motion = spec.kind.as_str(),
        speed,
        frames,
        fps,
        "Compiled motion expression"
    );

    let filter = FilterChain::new()
        .then(cover_scale(width * 2, height * 2))
        .then(Filter::new("crop").arg(width * 2).arg(height * 2))
        .then(
            Filter::new("zoompan")
                .expr("z", z)
                .expr("x", x)
                .expr("y", y)
                .opt("d", frames)
                .opt("s", format!("{}x{}", width * 2, height * 2))
                .opt("fps", fps),
        )
        .then(Filter::new("scale").arg(width).arg(height))
        .then(Filter::new("setsar").arg(1))
        .then(Filter::new("format").arg("yuv420p"));

    Ok(MotionPlan {
        filter,
        frame_count: frames,
        fps,
        animated: true,
    })
}

/// Plan for a clip without motion: the image looped and scaled to target.
pub fn static_loop(duration: f64, fps: u32, width: u32, height: u32) -> StoryreelResult<MotionPlan> {
    validate_clip_params(width, height, fps, duration)?;

    let filter = FilterChain::new()
        .then(cover_scale(width, height))
        .then(Filter::new("crop").arg(width).arg(height))
        .then(Filter::new("setsar").arg(1))
        .then(Filter::new("fps").arg(fps))
        .then(Filter::new("format").arg("yuv420p"));

    Ok(MotionPlan {
        filter,
        frame_count: frame_count(duration, fps),
        fps,
        animated: false,
    })
}

/// Scale so the frame covers `width`x`height`, keeping aspect.
fn cover_scale(width: u32, height: u32) -> Filter {
    Filter::new("scale")
        .arg(width)
        .arg(height)
        .opt("force_original_aspect_ratio", "increase")
}

/// `(z, x, y)` zoompan expressions for one motion family.
fn motion_expressions(
    kind: MotionType,
    speed: f64,
    frames: u64,
    up_w: f64,
    up_h: f64,
) -> (String, String, String) {
    let t = format!("on/{frames}");
    let centre_x = "iw/2-(iw/zoom/2)".to_string();
    let centre_y = "ih/2-(ih/zoom/2)".to_string();
    let delta = num(max_zoom_delta(speed));
    let pan_x = base_pan(up_w, speed);
    let pan_y = base_pan(up_h, speed);

    match kind {
        MotionType::ZoomIn => (format!("1+{delta}*{t}"), centre_x, centre_y),
        MotionType::ZoomOut => (format!("1+{delta}*(1-{t})"), centre_x, centre_y),
        MotionType::PanLeft => (
            fixed_zoom(up_w, pan_x),
            format!("{}*(1-{t})", num(pan_x)),
            centre_y,
        ),
        MotionType::PanRight => (fixed_zoom(up_w, pan_x), format!("{}*{t}", num(pan_x)), centre_y),
        MotionType::PanUp => (
            fixed_zoom(up_h, pan_y),
            centre_x,
            format!("{}*(1-{t})", num(pan_y)),
        ),
        MotionType::PanDown => (fixed_zoom(up_h, pan_y), centre_x, format!("{}*{t}", num(pan_y))),
        MotionType::KenburnsIn => (
            format!("1+{delta}*{t}"),
            clamp_x(format!("{}*{t}", num(pan_x * KENBURNS_PAN_X))),
            clamp_y(format!("{}*{t}", num(pan_y * KENBURNS_PAN_Y))),
        ),
        MotionType::KenburnsOut => (
            format!("1+{delta}*(1-{t})"),
            clamp_x(format!("{}*(1-{t})", num(pan_x * KENBURNS_PAN_X))),
            clamp_y(format!("{}*(1-{t})", num(pan_y * KENBURNS_PAN_Y))),
        ),
        MotionType::Static => ("1".to_string(), "0".to_string(), "0".to_string()),
    }
}

/// Zoom that leaves exactly `pan` pixels of slack along `dimension`.
fn fixed_zoom(dimension: f64, pan: f64) -> String {
    // rounded up so the window never runs past the frame edge
    let zoom = dimension / (dimension - pan);
    num((zoom * 1e6).ceil() / 1e6)
}

fn clamp_x(expr: String) -> String {
    format!("max(0,min({expr},iw-iw/zoom))")
}

fn clamp_y(expr: String) -> String {
    format!("max(0,min({expr},ih-ih/zoom))")
}

/// Expression number: up to six decimals, trailing zeros trimmed.
fn num(value: f64) -> String {
    let rendered = format!("{value:.6}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
