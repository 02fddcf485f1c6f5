//! Coordinate and color-space helpers
//!
//! Pure functions shared by the transform geometry and the palette algorithms:
//! - Rectangular <-> polar conversion (angles in degrees)
//! - RGB <-> HLS and RGB <-> HSV conversion (components in `0.0..=1.0`)
//! - Clamping and wrapping helpers
//! - Number formatting for the genome text format

/// An RGB byte triple.
pub type Rgb = [u8; 3];

/// Convert a rectangular point into `(radius, angle_degrees)`.
pub fn polar((x, y): (f64, f64)) -> (f64, f64) {
    (x.hypot(y), y.atan2(x).to_degrees())
}

/// Convert `(radius, angle_degrees)` back into a rectangular point.
pub fn rect((r, deg): (f64, f64)) -> (f64, f64) {
    let theta = deg.to_radians();
    (r * theta.cos(), r * theta.sin())
}

/// Clamp `value` into `[min, max]`.
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Wrap `value` into `[0, 1)`, used for hue rotation.
pub fn wrap_unit(value: f64) -> f64 {
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Round a `0.0..=255.0` channel to a byte, saturating out-of-range values.
pub fn to_byte(channel: f64) -> u8 {
    clip(channel.round(), 0.0, 255.0) as u8
}

/// Hue computation shared by HLS and HSV.
fn hue(r: f64, g: f64, b: f64, maxc: f64, minc: f64) -> f64 {
    let span = maxc - minc;
    let rc = (maxc - r) / span;
    let gc = (maxc - g) / span;
    let bc = (maxc - b) / span;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    (h / 6.0).rem_euclid(1.0)
}

/// Convert an RGB byte triple into `(hue, lightness, saturation)`.
pub fn rgb_to_hls(rgb: Rgb) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let l = (minc + maxc) / 2.0;
    if minc == maxc {
        return (0.0, l, 0.0);
    }
    let s = if l <= 0.5 {
        (maxc - minc) / (maxc + minc)
    } else {
        (maxc - minc) / (2.0 - maxc - minc)
    };
    (hue(r, g, b, maxc, minc), l, s)
}

fn hls_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

/// Convert `(hue, lightness, saturation)` into RGB channels in `0.0..=255.0`.
///
/// The hue wraps, so values outside `[0, 1)` are valid input.
pub fn hls_to_rgb((h, l, s): (f64, f64, f64)) -> [f64; 3] {
    if s == 0.0 {
        return [l * 255.0; 3];
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    [
        hls_channel(m1, m2, h + 1.0 / 3.0) * 255.0,
        hls_channel(m1, m2, h) * 255.0,
        hls_channel(m1, m2, h - 1.0 / 3.0) * 255.0,
    ]
}

/// Convert an RGB byte triple into `(hue, saturation, value)`.
pub fn rgb_to_hsv(rgb: Rgb) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    if minc == maxc {
        return (0.0, 0.0, maxc);
    }
    ((hue(r, g, b, maxc, minc)), (maxc - minc) / maxc, maxc)
}

/// Convert `(hue, saturation, value)` into RGB channels in `0.0..=255.0`.
pub fn hsv_to_rgb((h, s, v): (f64, f64, f64)) -> [f64; 3] {
    if s == 0.0 {
        return [v * 255.0; 3];
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let rgb = match (sector as i64).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    };
    rgb.map(|c| c * 255.0)
}

/// Format a number for the genome text format.
///
/// Integral values are written without a decimal point (`4.0` -> `4`), everything
/// else uses the shortest representation that parses back to the same `f64`.
pub fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}
