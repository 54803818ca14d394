use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scales
// ---------------------------------------------------------------------------

/// Diverging blue → grey → red, for correlation coefficients.
const COOLWARM: [(f32, f32, f32); 3] = [
    (0.230, 0.299, 0.754),
    (0.865, 0.865, 0.865),
    (0.706, 0.016, 0.150),
];

/// Perceptually uniform purple → green → yellow, for humidity.
const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.231, 0.322, 0.545),
    (0.129, 0.569, 0.549),
    (0.369, 0.788, 0.384),
    (0.993, 0.906, 0.144),
];

/// Colour for a coefficient in `[-1, 1]`.
pub fn coolwarm(r: f64) -> Color32 {
    sample(&COOLWARM, ((r + 1.0) / 2.0) as f32)
}

/// Colour for a position `t` in `[0, 1]`.
pub fn viridis(t: f64) -> Color32 {
    sample(&VIRIDIS, t as f32)
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Piecewise-linear interpolation between evenly spaced stops, mixed in
/// linear light.
fn sample(stops: &[(f32, f32, f32)], t: f32) -> Color32 {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (stops.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - i as f32;

    let to_linear = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
    let mixed = to_linear(stops[i]).mix(to_linear(stops[i + 1]), frac);
    let rgb: Srgb = Srgb::from_linear(mixed);

    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}
