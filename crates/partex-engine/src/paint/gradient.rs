use serde::{Deserialize, Serialize};

use super::Color;

/// How a gradient fills the space between stops.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    /// Linear interpolation between neighboring stops.
    #[default]
    Blend,
    /// Each stop's color holds up to and including its position.
    Fixed,
}

/// A single gradient stop.
///
/// `t` is expected in [0, 1]. Configuration validation rejects anything
/// else; the gradient itself clamps queries, not stops.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// 1-D color gradient evaluated over `[0, 1]`.
///
/// Semantics:
/// - stops are kept sorted by position
/// - queries are clamped to `[0, 1]`
/// - before the first stop the first color holds, after the last the last
/// - no stops evaluates to opaque white, one stop to that stop's color
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
    mode: GradientMode,
}

impl Default for Gradient {
    /// White fading to transparent, the usual starting point for a particle.
    fn default() -> Self {
        Gradient::two_stop(Color::WHITE, Color::new(1.0, 1.0, 1.0, 0.0))
    }
}

impl Gradient {
    pub fn new(mut stops: Vec<ColorStop>, mode: GradientMode) -> Self {
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { stops, mode }
    }

    /// Blend gradient from `start` at 0 to `end` at 1.
    pub fn two_stop(start: Color, end: Color) -> Self {
        Self::new(
            vec![ColorStop::new(0.0, start), ColorStop::new(1.0, end)],
            GradientMode::Blend,
        )
    }

    /// Single-color gradient.
    pub fn solid(color: Color) -> Self {
        Self::new(vec![ColorStop::new(0.0, color)], GradientMode::Blend)
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    #[inline]
    pub fn mode(&self) -> GradientMode {
        self.mode
    }

    /// Evaluates the gradient at `t`.
    pub fn evaluate(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::WHITE,
        };
        if t <= first.t {
            return first.color;
        }
        if t >= last.t {
            return last.color;
        }

        // First stop at or after t; exists because t < last.t.
        let hi = self.stops.partition_point(|s| s.t < t);
        let upper = self.stops[hi];

        match self.mode {
            GradientMode::Fixed => upper.color,
            GradientMode::Blend => {
                let lower = self.stops[hi - 1];
                let span = upper.t - lower.t;
                if span <= f32::EPSILON {
                    return upper.color;
                }
                lower.color.lerp(upper.color, (t - lower.t) / span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);

    // ── degenerate stop sets ───────────────────────────────────────────────

    #[test]
    fn empty_gradient_is_white() {
        let g = Gradient::new(Vec::new(), GradientMode::Blend);
        assert_eq!(g.evaluate(0.3), Color::WHITE);
    }

    #[test]
    fn single_stop_is_constant() {
        let g = Gradient::solid(GREEN);
        assert_eq!(g.evaluate(0.0), GREEN);
        assert_eq!(g.evaluate(1.0), GREEN);
    }

    // ── blend ──────────────────────────────────────────────────────────────

    #[test]
    fn blend_endpoints_and_midpoint() {
        let g = Gradient::two_stop(RED, BLUE);
        assert_eq!(g.evaluate(0.0), RED);
        assert_eq!(g.evaluate(1.0), BLUE);
        assert_eq!(g.evaluate(0.5), Color::new(0.5, 0.0, 0.5, 1.0));
    }

    #[test]
    fn queries_are_clamped() {
        let g = Gradient::two_stop(RED, BLUE);
        assert_eq!(g.evaluate(-3.0), RED);
        assert_eq!(g.evaluate(7.0), BLUE);
        assert_eq!(g.evaluate(f32::NAN), RED);
    }

    #[test]
    fn stops_are_sorted_on_construction() {
        let g = Gradient::new(
            vec![ColorStop::new(1.0, BLUE), ColorStop::new(0.0, RED)],
            GradientMode::Blend,
        );
        assert_eq!(g.stops()[0].color, RED);
        assert_eq!(g.evaluate(0.0), RED);
    }

    #[test]
    fn colors_hold_outside_inner_stops() {
        let g = Gradient::new(
            vec![ColorStop::new(0.25, RED), ColorStop::new(0.75, BLUE)],
            GradientMode::Blend,
        );
        assert_eq!(g.evaluate(0.1), RED);
        assert_eq!(g.evaluate(0.9), BLUE);
        assert_eq!(g.evaluate(0.5), Color::new(0.5, 0.0, 0.5, 1.0));
    }

    // ── fixed ──────────────────────────────────────────────────────────────

    #[test]
    fn fixed_steps_to_next_stop() {
        let g = Gradient::new(
            vec![
                ColorStop::new(0.0, RED),
                ColorStop::new(0.5, GREEN),
                ColorStop::new(1.0, BLUE),
            ],
            GradientMode::Fixed,
        );
        assert_eq!(g.evaluate(0.2), GREEN);
        assert_eq!(g.evaluate(0.5), GREEN);
        assert_eq!(g.evaluate(0.51), BLUE);
    }
}
