use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

/// Single bar colour of the rent chart (`#1f77b4`).
pub const RENT_BAR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous colour scale: value → Color32
// ---------------------------------------------------------------------------

/// Maps a numeric range onto a blue → yellow gradient, so larger bars stand out.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    min: f64,
    max: f64,
    low: Hsl,
    high: Hsl,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale {
            min,
            max,
            low: Hsl::new(250.0, 0.75, 0.35),
            high: Hsl::new(55.0, 0.9, 0.6),
        }
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let hsl = self.low.mix(self.high, self.fraction(value));
        let rgb: Srgb = hsl.into_color();
        to_color32(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        let scale = ColorScale::new(10.0, 20.0);
        assert_eq!(scale.fraction(10.0), 0.0);
        assert_eq!(scale.fraction(15.0), 0.5);
        assert_eq!(scale.fraction(99.0), 1.0);
        assert_eq!(scale.fraction(-5.0), 0.0);
    }

    #[test]
    fn single_value_range_uses_high_end() {
        let scale = ColorScale::new(7.0, 7.0);
        assert_eq!(scale.color_for(7.0), scale.color_for(100.0));
    }

    #[test]
    fn ends_of_the_range_differ() {
        let scale = ColorScale::new(0.0, 1.0);
        assert_ne!(scale.color_for(0.0), scale.color_for(1.0));
    }
}
