// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves for tweens and smooth scrolling.

use crate::timeline::Interpolation;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Error returned when an easing name cannot be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EasingParseError {
    /// Name does not match any known curve
    #[error("Unknown easing: {0}")]
    Unknown(String),

    /// Curve parameters could not be parsed
    #[error("Invalid easing parameters in {0}")]
    InvalidParameters(String),
}

/// Easing curve mapping linear progress to eased progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Easing {
    /// No easing
    #[default]
    Linear,
    /// Quadratic ease-in
    Power1In,
    /// Quadratic ease-out
    Power1Out,
    /// Quadratic ease-in-out
    Power1InOut,
    /// Cubic ease-in
    Power2In,
    /// Cubic ease-out
    Power2Out,
    /// Cubic ease-in-out
    Power2InOut,
    /// Quartic ease-in
    Power3In,
    /// Quartic ease-out
    Power3Out,
    /// Quartic ease-in-out
    Power3InOut,
    /// Quintic ease-out
    Power4Out,
    /// Exponential ease-out used by the smooth scroll engine
    ExpoOut,
    /// Ease-out with a slight overshoot
    BackOut {
        /// Overshoot amount (1.70158 is the classic value)
        overshoot: f32,
    },
    /// Damped oscillation settling on 1
    ElasticOut {
        /// Peak amplitude, at least 1
        amplitude: f32,
        /// Oscillation period in progress units
        period: f32,
    },
    /// Hermite smoothstep
    Smoothstep,
    /// CSS-style cubic bezier with control points (x1, y1, x2, y2)
    CubicBezier([f32; 4]),
}

impl Easing {
    /// Apply the curve. Input is clamped to [0, 1] and the endpoints are exact.
    pub fn apply(&self, t: f32) -> f32 {
        if !(t > 0.0) {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::Power1In => power_in(t, 2),
            Easing::Power1Out => power_out(t, 2),
            Easing::Power1InOut => power_in_out(t, 2),
            Easing::Power2In => power_in(t, 3),
            Easing::Power2Out => power_out(t, 3),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3In => power_in(t, 4),
            Easing::Power3Out => power_out(t, 4),
            Easing::Power3InOut => power_in_out(t, 4),
            Easing::Power4Out => power_out(t, 5),
            Easing::ExpoOut => (1.001 - 2f32.powf(-10.0 * t)).min(1.0),
            Easing::BackOut { overshoot } => {
                let u = t - 1.0;
                u * u * ((overshoot + 1.0) * u + overshoot) + 1.0
            }
            Easing::ElasticOut { amplitude, period } => {
                let amplitude = amplitude.max(1.0);
                let period = if period > 0.0 { period } else { 0.3 };
                let shift = period / TAU * (1.0 / amplitude).asin();
                amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
            }
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                let s = solve_bezier_x(x1, x2, t);
                Interpolation::bezier(0.0, y1, y2, 1.0, s)
            }
        }
    }

    /// Parse a named curve such as `power2.out`, `back.out(1.7)` or `elastic.out(1, 0.3)`
    pub fn from_name(name: &str) -> Result<Self, EasingParseError> {
        let trimmed = name.trim();
        let (base, args) = match trimmed.find('(') {
            Some(open) => {
                let close = trimmed
                    .rfind(')')
                    .filter(|close| *close > open)
                    .ok_or_else(|| EasingParseError::InvalidParameters(trimmed.to_string()))?;
                (&trimmed[..open], Some(&trimmed[open + 1..close]))
            }
            None => (trimmed, None),
        };

        let params = match args {
            Some(args) => args
                .split(',')
                .map(|a| a.trim().parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| EasingParseError::InvalidParameters(trimmed.to_string()))?,
            None => Vec::new(),
        };

        let easing = match base {
            "none" | "linear" => Easing::Linear,
            "power1.in" => Easing::Power1In,
            "power1.out" | "power1" => Easing::Power1Out,
            "power1.inOut" => Easing::Power1InOut,
            "power2.in" => Easing::Power2In,
            "power2.out" | "power2" => Easing::Power2Out,
            "power2.inOut" => Easing::Power2InOut,
            "power3.in" => Easing::Power3In,
            "power3.out" | "power3" => Easing::Power3Out,
            "power3.inOut" => Easing::Power3InOut,
            "power4.out" | "power4" => Easing::Power4Out,
            "expo.out" => Easing::ExpoOut,
            "smoothstep" => Easing::Smoothstep,
            "back.out" => Easing::BackOut {
                overshoot: params.first().copied().unwrap_or(1.70158),
            },
            "elastic.out" => Easing::ElasticOut {
                amplitude: params.first().copied().unwrap_or(1.0),
                period: params.get(1).copied().unwrap_or(0.3),
            },
            "cubic-bezier" => match params.as_slice() {
                [x1, y1, x2, y2] => Easing::CubicBezier([*x1, *y1, *x2, *y2]),
                _ => return Err(EasingParseError::InvalidParameters(trimmed.to_string())),
            },
            _ => return Err(EasingParseError::Unknown(trimmed.to_string())),
        };

        Ok(easing)
    }

    /// Classic `back.out(1.7)` curve
    pub fn back_out() -> Self {
        Easing::BackOut { overshoot: 1.7 }
    }

    /// Classic `elastic.out(1, 0.3)` curve
    pub fn elastic_out() -> Self {
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.3,
        }
    }

    /// Whether the curve can leave the [0, 1] range between its endpoints
    pub fn overshoots(&self) -> bool {
        matches!(self, Easing::BackOut { .. } | Easing::ElasticOut { .. })
            || matches!(self, Easing::CubicBezier([_, y1, _, y2]) if !(0.0..=1.0).contains(y1) || !(0.0..=1.0).contains(y2))
    }
}

fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exp - 1) * t.powi(exp)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exp) / 2.0
    }
}

/// Find the curve parameter whose x coordinate equals `x`
fn solve_bezier_x(x1: f32, x2: f32, x: f32) -> f32 {
    // Newton first, bisection if the slope flattens out
    let mut s = x;
    for _ in 0..8 {
        let err = Interpolation::bezier(0.0, x1, x2, 1.0, s) - x;
        if err.abs() < 1e-6 {
            return s;
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x;
    for _ in 0..32 {
        let value = Interpolation::bezier(0.0, x1, x2, 1.0, s);
        if (value - x).abs() < 1e-6 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    s
}

fn bezier_slope(p1: f32, p2: f32, s: f32) -> f32 {
    let mt = 1.0 - s;
    3.0 * mt * mt * p1 + 6.0 * mt * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 16] = [
        Easing::Linear,
        Easing::Power1In,
        Easing::Power1Out,
        Easing::Power1InOut,
        Easing::Power2In,
        Easing::Power2Out,
        Easing::Power2InOut,
        Easing::Power3In,
        Easing::Power3Out,
        Easing::Power3InOut,
        Easing::Power4Out,
        Easing::ExpoOut,
        Easing::BackOut { overshoot: 1.7 },
        Easing::ElasticOut { amplitude: 1.0, period: 0.3 },
        Easing::Smoothstep,
        Easing::CubicBezier([0.645, 0.045, 0.355, 1.0]),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-3.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(7.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_non_overshooting_curves_are_monotonic() {
        for easing in ALL.iter().filter(|e| !e.overshoots()) {
            let mut previous = 0.0;
            for step in 1..=100 {
                let value = easing.apply(step as f32 / 100.0);
                assert!(value + 1e-5 >= previous, "{easing:?} at step {step}");
                assert!(value <= 1.0);
                previous = value;
            }
        }
    }

    #[test]
    fn test_elastic_out_rings_past_one() {
        let elastic = Easing::elastic_out();
        assert!(elastic.overshoots());
        assert_eq!(elastic.apply(0.0), 0.0);
        assert_eq!(elastic.apply(1.0), 1.0);
        assert!((1..100).any(|i| elastic.apply(i as f32 / 100.0) > 1.0));
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::back_out().apply(i as f32 / 100.0))
            .fold(0.0, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_midpoints() {
        assert!((Easing::Power1InOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::Power2Out.apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::Smoothstep.apply(0.5) - 0.5).abs() < 1e-6);
        let bezier = Easing::CubicBezier([0.645, 0.045, 0.355, 1.0]);
        assert!((bezier.apply(0.5) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Easing::from_name("power2.out"), Ok(Easing::Power2Out));
        assert_eq!(Easing::from_name("none"), Ok(Easing::Linear));
        assert_eq!(Easing::from_name("power1.inOut"), Ok(Easing::Power1InOut));
        assert_eq!(
            Easing::from_name("back.out(1.7)"),
            Ok(Easing::BackOut { overshoot: 1.7 })
        );
        assert_eq!(
            Easing::from_name("elastic.out(1, 0.3)"),
            Ok(Easing::ElasticOut { amplitude: 1.0, period: 0.3 })
        );
        assert_eq!(Easing::from_name("elastic.out"), Ok(Easing::elastic_out()));
        assert!(matches!(
            Easing::from_name("bounce.out"),
            Err(EasingParseError::Unknown(_))
        ));
        assert!(matches!(
            Easing::from_name("back.out(abc)"),
            Err(EasingParseError::InvalidParameters(_))
        ));
    }
}
