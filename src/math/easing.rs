//! Easing curves used by the tween scheduler

/// Overshoot amount for the back-out curve.
const BACK_C1: f32 = 1.70158;
const BACK_C3: f32 = BACK_C1 + 1.0;

/// How to map normalized animation time into interpolation progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ease {
    Linear,
    InOutQuad,
    OutCubic,
    InOutCubic,
    /// Overshoots past 1.0 and settles back ("bounce" landing).
    OutBackCubic,
}

impl Ease {
    /// Sample the curve at `x`, clamped to [0, 1].
    #[inline]
    pub fn sample(self, x: f32) -> f32 {
        let t = x.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
            Ease::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
            Ease::OutBackCubic => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 5] = [
        Ease::Linear,
        Ease::InOutQuad,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::OutBackCubic,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for ease in ALL {
            assert!(ease.sample(0.0).abs() < 1e-6, "{ease:?} at 0");
            assert!((ease.sample(1.0) - 1.0).abs() < 1e-6, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Ease::Linear.sample(-1.0), 0.0);
        assert_eq!(Ease::Linear.sample(3.0), 1.0);
    }

    #[test]
    fn test_back_cubic_overshoots() {
        let peak = (1..100)
            .map(|i| Ease::OutBackCubic.sample(i as f32 / 100.0))
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(peak > 1.05);
    }

    #[test]
    fn test_in_out_quad_midpoint() {
        assert!((Ease::InOutQuad.sample(0.5) - 0.5).abs() < 1e-6);
        assert!(Ease::InOutQuad.sample(0.25) < 0.25);
        assert!(Ease::InOutQuad.sample(0.75) > 0.75);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    }
}
