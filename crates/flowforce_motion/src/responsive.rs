// SPDX-License-Identifier: MIT OR Apache-2.0
//! Responsive animation policy.
//!
//! Every section resolves its animation parameters here before building a
//! timeline: simpler, faster animations on small screens, and minimal motion
//! whenever the reduced-motion preference is set. Resolution is a pure
//! function of [`Environment`] and is safe without a viewport (server
//! rendering), where it falls back to desktop defaults.

use crate::easing::Easing;
use serde::{Deserialize, Serialize};

/// Viewport width below which a device is a phone
pub const MOBILE_BREAKPOINT: f32 = 640.0;
/// Viewport width below which a device is a tablet
pub const TABLET_BREAKPOINT: f32 = 1024.0;

/// Device class derived from viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Narrower than 640px
    Mobile,
    /// 640px up to 1024px
    Tablet,
    /// 1024px and wider
    Desktop,
}

impl DeviceClass {
    /// Classify a viewport width
    pub fn from_width(width: f32) -> Self {
        if width < MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else if width < TABLET_BREAKPOINT {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// What the policy knows about the rendering environment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Environment {
    /// Viewport width, `None` outside a rendering context
    pub viewport_width: Option<f32>,
    /// OS/browser reduced-motion preference
    pub reduced_motion: bool,
}

impl Environment {
    /// Environment of a browser viewport
    pub fn browser(viewport_width: f32, reduced_motion: bool) -> Self {
        Self {
            viewport_width: Some(viewport_width),
            reduced_motion,
        }
    }

    /// Environment with no rendering surface
    pub fn server() -> Self {
        Self::default()
    }

    /// Device class; desktop when there is no viewport
    pub fn device_class(&self) -> DeviceClass {
        self.viewport_width
            .map(DeviceClass::from_width)
            .unwrap_or(DeviceClass::Desktop)
    }
}

/// Animation parameters resolved for an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveAnimationConfig {
    /// Base duration in seconds
    pub duration: f32,
    /// Base easing
    pub easing: Easing,
    /// Total stagger spread in seconds
    pub stagger_amount: f32,
    /// Number of strips for slat reveals (0 disables them)
    pub slat_count: usize,
    /// Parallax multiplier (0 disables parallax)
    pub parallax_intensity: f32,
    /// Prefer plain fades over compound effects
    pub use_simple_animations: bool,
    /// Reduced-motion preference was applied
    pub reduced_motion: bool,
}

impl ResponsiveAnimationConfig {
    /// Minimal motion
    pub fn reduced() -> Self {
        Self {
            duration: 0.3,
            easing: Easing::Power1Out,
            stagger_amount: 0.1,
            slat_count: 0,
            parallax_intensity: 0.0,
            use_simple_animations: true,
            reduced_motion: true,
        }
    }

    /// Fast, simple animations for phones
    pub fn mobile() -> Self {
        Self {
            duration: 0.6,
            easing: Easing::Power2Out,
            stagger_amount: 0.4,
            slat_count: 6,
            parallax_intensity: 0.0,
            use_simple_animations: true,
            reduced_motion: false,
        }
    }

    /// Moderate animations for tablets
    pub fn tablet() -> Self {
        Self {
            duration: 0.9,
            easing: Easing::Power2Out,
            stagger_amount: 0.6,
            slat_count: 12,
            parallax_intensity: 0.5,
            use_simple_animations: false,
            reduced_motion: false,
        }
    }

    /// Full animations
    pub fn desktop() -> Self {
        Self {
            duration: 1.2,
            easing: Easing::Power3Out,
            stagger_amount: 0.8,
            slat_count: 20,
            parallax_intensity: 1.0,
            use_simple_animations: false,
            reduced_motion: false,
        }
    }
}

/// Resolve animation parameters. Reduced motion wins over any device class.
pub fn resolve(env: &Environment) -> ResponsiveAnimationConfig {
    if env.reduced_motion {
        return ResponsiveAnimationConfig::reduced();
    }
    match env.device_class() {
        DeviceClass::Mobile => ResponsiveAnimationConfig::mobile(),
        DeviceClass::Tablet => ResponsiveAnimationConfig::tablet(),
        DeviceClass::Desktop => ResponsiveAnimationConfig::desktop(),
    }
}

/// Scale a desktop translation distance for the device
pub fn responsive_y_offset(env: &Environment, desktop_value: f32) -> f32 {
    match env.device_class() {
        DeviceClass::Mobile => desktop_value * 0.4,
        DeviceClass::Tablet => desktop_value * 0.7,
        DeviceClass::Desktop => desktop_value,
    }
}

/// Scale a desktop delay for the device
pub fn responsive_delay(env: &Environment, desktop_delay: f32) -> f32 {
    match env.device_class() {
        DeviceClass::Mobile => desktop_delay * 0.6,
        DeviceClass::Tablet => desktop_delay * 0.8,
        DeviceClass::Desktop => desktop_delay,
    }
}

/// Parallax runs on desktop only, and never with reduced motion
pub fn should_use_parallax(env: &Environment) -> bool {
    env.device_class() == DeviceClass::Desktop && !env.reduced_motion
}

/// Scrubbed animations are skipped on phones and with reduced motion
pub fn should_use_scrub(env: &Environment) -> bool {
    env.viewport_width.is_some_and(|w| w >= MOBILE_BREAKPOINT) && !env.reduced_motion
}

/// Trailing-edge debounce for resize notifications, driven by host timestamps
#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    delay_ms: f64,
    pending_since: Option<f64>,
}

impl ResizeDebounce {
    /// Create a debounce with a delay in milliseconds
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending_since: None,
        }
    }

    /// Record a resize at `now_ms`; restarts the wait
    pub fn notify(&mut self, now_ms: f64) {
        self.pending_since = Some(now_ms);
    }

    /// Returns true once, when the wait since the last resize has elapsed
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.pending_since {
            Some(since) if now_ms - since >= self.delay_ms => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a resize is waiting to settle
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

impl Default for ResizeDebounce {
    fn default() -> Self {
        Self::new(250.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_thresholds() {
        assert_eq!(DeviceClass::from_width(639.0), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_width(640.0), DeviceClass::Tablet);
        assert_eq!(DeviceClass::from_width(1023.0), DeviceClass::Tablet);
        assert_eq!(DeviceClass::from_width(1024.0), DeviceClass::Desktop);
    }

    #[test]
    fn test_reduced_motion_dominates_every_device() {
        for width in [Some(320.0), Some(800.0), Some(1920.0), None] {
            let env = Environment {
                viewport_width: width,
                reduced_motion: true,
            };
            assert_eq!(resolve(&env), ResponsiveAnimationConfig::reduced());
        }
    }

    #[test]
    fn test_server_defaults_to_desktop() {
        assert_eq!(resolve(&Environment::server()), ResponsiveAnimationConfig::desktop());
        assert!(should_use_parallax(&Environment::server()));
        assert!(!should_use_scrub(&Environment::server()));
    }

    #[test]
    fn test_device_configs() {
        let mobile = resolve(&Environment::browser(375.0, false));
        assert_eq!(mobile.slat_count, 6);
        assert_eq!(mobile.parallax_intensity, 0.0);
        let tablet = resolve(&Environment::browser(800.0, false));
        assert_eq!(tablet.parallax_intensity, 0.5);
        assert_eq!(tablet.easing, Easing::Power2Out);
    }

    #[test]
    fn test_scaling_helpers() {
        let phone = Environment::browser(375.0, false);
        assert!((responsive_y_offset(&phone, 50.0) - 20.0).abs() < 1e-5);
        assert!((responsive_delay(&phone, 1.0) - 0.6).abs() < 1e-6);
        assert!(!should_use_scrub(&phone));
        assert!(!should_use_parallax(&Environment::browser(800.0, false)));
        assert!(!should_use_parallax(&Environment::browser(1440.0, true)));
    }

    #[test]
    fn test_config_ron_keeps_easing_parameters() {
        let config = ResponsiveAnimationConfig {
            easing: Easing::back_out(),
            ..ResponsiveAnimationConfig::desktop()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: ResponsiveAnimationConfig = ron::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_resize_debounce_fires_once_after_quiet_period() {
        let mut debounce = ResizeDebounce::default();
        debounce.notify(0.0);
        debounce.notify(100.0);
        assert!(!debounce.poll(300.0));
        assert!(debounce.poll(350.0));
        assert!(!debounce.poll(400.0));
        assert!(!debounce.is_pending());
    }
}
