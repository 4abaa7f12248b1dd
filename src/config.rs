use std::ops::Range;

use crate::error::ConfigError;

/// Coarse capability classification. Hosts probe it once and inject it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub is_constrained: bool,
}

impl DeviceProfile {
    pub const DESKTOP: DeviceProfile = DeviceProfile { is_constrained: false };
    pub const HANDHELD: DeviceProfile = DeviceProfile { is_constrained: true };

    /// Classify from a user-agent-like string.
    pub fn from_user_agent(agent: &str) -> Self {
        const HANDHELD_MARKERS: [&str; 8] = [
            "android", "iphone", "ipad", "ipod", "mobile", "blackberry", "iemobile", "opera mini",
        ];
        let agent = agent.to_ascii_lowercase();
        let is_constrained = HANDHELD_MARKERS.iter().any(|marker| agent.contains(marker));
        Self { is_constrained }
    }

    /// Best guess for the platform this binary was built for.
    pub fn for_target() -> Self {
        Self { is_constrained: cfg!(any(target_os = "android", target_os = "ios")) }
    }
}

/// Signals the host reads once before the engine starts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub reduced_motion: bool,
    pub device: DeviceProfile,
}

impl Environment {
    /// Whether a decorative animation may run at all.
    pub fn motion_allowed(&self) -> bool {
        !self.reduced_motion
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeStyle {
    /// Thin banknote rectangles.
    Bills,
    /// Thick bevelled ingots.
    Bars,
}

impl std::str::FromStr for ShapeStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bills" | "bill" => Ok(ShapeStyle::Bills),
            "bars" | "bar" => Ok(ShapeStyle::Bars),
            other => Err(ConfigError::UnknownStyle(other.to_string())),
        }
    }
}

/// Linear RGBA colour ramp shared by every particle of a style.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    pub face_light: [f32; 4],
    pub face_dark: [f32; 4],
    pub bevel_top: [f32; 4],
    pub bevel_side: [f32; 4],
    pub sheen: [f32; 4],
}

/// Aspect family of a style: height and depth as fractions of width.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeProfile {
    pub height_ratio: f32,
    pub depth_ratio: f32,
    pub corner_ratio: f32,
}

impl ShapeStyle {
    pub fn shape(self) -> ShapeProfile {
        match self {
            ShapeStyle::Bills => ShapeProfile { height_ratio: 0.46, depth_ratio: 0.05, corner_ratio: 0.06 },
            ShapeStyle::Bars => ShapeProfile { height_ratio: 0.38, depth_ratio: 0.22, corner_ratio: 0.1 },
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ShapeStyle::Bills => Palette {
                face_light: [0.62, 0.82, 0.55, 1.0],
                face_dark: [0.22, 0.45, 0.24, 1.0],
                bevel_top: [0.74, 0.90, 0.66, 1.0],
                bevel_side: [0.14, 0.30, 0.16, 1.0],
                sheen: [0.95, 1.0, 0.9, 0.55],
            },
            ShapeStyle::Bars => Palette {
                face_light: [1.0, 0.86, 0.42, 1.0],
                face_dark: [0.78, 0.52, 0.12, 1.0],
                bevel_top: [1.0, 0.93, 0.62, 1.0],
                bevel_side: [0.55, 0.35, 0.06, 1.0],
                sheen: [1.0, 0.98, 0.85, 0.7],
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Particles per pixel of scroll travel.
    pub rate: f32,
    pub baseline_top: f32,
    pub baseline_scrolled: f32,
    /// Scroll offset past which the higher baseline applies.
    pub threshold: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub style: ShapeStyle,
    pub capacity: usize,
    pub initial_burst: usize,
    /// Probability of spawning in the centre column.
    pub center_bias: f32,
    pub center_spread_ratio: f32,
    pub center_spread_max: f32,
    pub spawn_height: Range<f32>,
    pub width: Range<f32>,
    pub fall_speed: Range<f32>,
    pub drift_speed: Range<f32>,
    pub spin_speed: Range<f32>,
    pub roll_speed: Range<f32>,
    pub time_to_live: Range<f32>,
    /// Horizontal velocity multiplier applied once per update call.
    pub drag: f32,
    pub appear_ms: f32,
    pub sheen_period_ms: f32,
    pub scroll: ScrollConfig,
    pub burst_interval_ms: f32,
    pub burst_size: Range<u32>,
    pub burst_multiplier: f32,
    pub section_threshold: f32,
    pub section_burst: Range<u32>,
}

impl EngineConfig {
    pub fn for_device(device: DeviceProfile, style: ShapeStyle) -> Self {
        let constrained = device.is_constrained;
        Self {
            style,
            capacity: if constrained { 70 } else { 160 },
            initial_burst: if constrained { 10 } else { 24 },
            center_bias: 0.58,
            center_spread_ratio: 0.18,
            center_spread_max: 260.0,
            spawn_height: 20.0..140.0,
            width: if constrained { 24.0..42.0 } else { 36.0..64.0 },
            fall_speed: 70.0..150.0,
            drift_speed: -30.0..30.0,
            spin_speed: -0.02..0.02,
            roll_speed: -0.035..0.035,
            time_to_live: 6_000.0..11_000.0,
            drag: 0.985,
            appear_ms: 350.0,
            sheen_period_ms: 1_800.0,
            scroll: ScrollConfig {
                rate: 0.035,
                baseline_top: 0.02,
                baseline_scrolled: 0.08,
                threshold: 120.0,
            },
            burst_interval_ms: if constrained { 3_200.0 } else { 2_600.0 },
            burst_size: 2..6,
            burst_multiplier: 1.0,
            section_threshold: 0.35,
            section_burst: 6..13,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_device(DeviceProfile::DESKTOP, ShapeStyle::Bills)
    }
}

/// Host settings taken from `BILLFALL_*` environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct HostSettings {
    pub style: ShapeStyle,
    pub environment: Environment,
    pub seed: Option<u64>,
}

impl HostSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let style = match lookup("BILLFALL_STYLE") {
            Some(value) => value.parse()?,
            None => ShapeStyle::Bills,
        };
        let reduced_motion = match lookup("BILLFALL_REDUCED_MOTION") {
            Some(value) => parse_flag("BILLFALL_REDUCED_MOTION", &value)?,
            None => false,
        };
        let device = match lookup("BILLFALL_USER_AGENT") {
            Some(agent) => DeviceProfile::from_user_agent(&agent),
            None => DeviceProfile::for_target(),
        };
        let seed = match lookup("BILLFALL_SEED") {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "BILLFALL_SEED",
                value,
            })?),
            None => None,
        };
        Ok(Self { style, environment: Environment { reduced_motion, device }, seed })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn handheld_agents_are_constrained() {
        let phone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
        assert!(DeviceProfile::from_user_agent(phone).is_constrained);
        assert!(!DeviceProfile::from_user_agent(desktop).is_constrained);
    }

    #[test]
    fn constrained_devices_get_smaller_numbers() {
        let desktop = EngineConfig::for_device(DeviceProfile::DESKTOP, ShapeStyle::Bills);
        let phone = EngineConfig::for_device(DeviceProfile::HANDHELD, ShapeStyle::Bills);
        assert!(phone.capacity < desktop.capacity);
        assert!(phone.initial_burst < desktop.initial_burst);
        assert!(phone.width.end < desktop.width.end);
        assert!(phone.burst_interval_ms > desktop.burst_interval_ms);
    }

    #[test]
    fn styles_differ_only_in_data() {
        let bills = EngineConfig::for_device(DeviceProfile::DESKTOP, ShapeStyle::Bills);
        let bars = EngineConfig::for_device(DeviceProfile::DESKTOP, ShapeStyle::Bars);
        assert_eq!(bills.capacity, bars.capacity);
        assert!(ShapeStyle::Bars.shape().depth_ratio > ShapeStyle::Bills.shape().depth_ratio);
    }

    #[test]
    fn settings_from_lookup() {
        let settings = HostSettings::from_lookup(lookup(&[
            ("BILLFALL_STYLE", "Bars"),
            ("BILLFALL_REDUCED_MOTION", "yes"),
            ("BILLFALL_USER_AGENT", "Mozilla/5.0 (Linux; Android 14)"),
            ("BILLFALL_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(settings.style, ShapeStyle::Bars);
        assert!(settings.environment.reduced_motion);
        assert!(settings.environment.device.is_constrained);
        assert_eq!(settings.seed, Some(42));
    }

    #[test]
    fn reduced_motion_disallows_animation() {
        let settings = HostSettings::from_lookup(lookup(&[("BILLFALL_REDUCED_MOTION", "1")])).unwrap();
        assert!(!settings.environment.motion_allowed());
        assert!(Environment::default().motion_allowed());
    }

    #[test]
    fn settings_defaults_when_unset() {
        let settings = HostSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.style, ShapeStyle::Bills);
        assert!(!settings.environment.reduced_motion);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = HostSettings::from_lookup(lookup(&[("BILLFALL_STYLE", "coins")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStyle(ref s) if s == "coins"));
        let err = HostSettings::from_lookup(lookup(&[("BILLFALL_REDUCED_MOTION", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "BILLFALL_REDUCED_MOTION", .. }));
    }
}
