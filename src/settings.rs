/// Tunable simulation parameters.
///
/// Every field has a default, so a config file only needs to name the values
/// it overrides.  Durations are given in seconds and converted to ticks with
/// the configured tick rate; the simulation itself only ever counts ticks.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable the binary reads the config path from.
pub const CONFIG_ENV_VAR: &str = "MINI_SHOOTER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world_width: f32,
    pub world_height: f32,
    /// Simulation steps per second.
    pub tick_rate: u32,

    // ── Speeds (world units per tick) ────────────────────────────────────────
    pub player_speed: f32,
    pub projectile_speed: f32,
    pub pickup_speed: f32,
    /// Hazard speeds are drawn uniformly from `hazard_speed_min..=hazard_speed_max`.
    pub hazard_speed_min: u32,
    pub hazard_speed_max: u32,

    // ── Spawning & timers ────────────────────────────────────────────────────
    pub initial_hazards: usize,
    pub pickup_interval_secs: u32,
    pub invulnerability_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: 1080.0,
            world_height: 720.0,
            tick_rate: 60,

            player_speed: 5.0,
            projectile_speed: 7.0,
            pickup_speed: 3.0,
            hazard_speed_min: 2,
            hazard_speed_max: 5,

            initial_hazards: 5,
            pickup_interval_secs: 5,
            invulnerability_secs: 2,
        }
    }
}

impl Settings {
    /// Pickup spawn threshold in ticks.
    pub fn pickup_interval_ticks(&self) -> u32 {
        self.pickup_interval_secs.saturating_mul(self.tick_rate)
    }

    /// Invulnerability window after a hit, in ticks.
    pub fn invulnerability_ticks(&self) -> u32 {
        self.invulnerability_secs.saturating_mul(self.tick_rate)
    }

    /// Read settings from a JSON file and validate them.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text).map_err(SettingsError::Parse)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` if given, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("No config file given, using default settings");
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        use crate::entities::{HAZARD_WIDTH, PICKUP_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH};

        if self.tick_rate == 0 {
            return Err(SettingsError::Invalid("tick_rate must be positive".into()));
        }
        let min_width = PLAYER_WIDTH.max(HAZARD_WIDTH).max(PICKUP_WIDTH);
        if self.world_width < min_width || self.world_height <= PLAYER_HEIGHT {
            return Err(SettingsError::Invalid(format!(
                "world {}x{} is smaller than the player",
                self.world_width, self.world_height
            )));
        }
        for (name, speed) in [
            ("player_speed", self.player_speed),
            ("projectile_speed", self.projectile_speed),
            ("pickup_speed", self.pickup_speed),
        ] {
            if speed <= 0.0 {
                return Err(SettingsError::Invalid(format!("{} must be positive", name)));
            }
        }
        if self.hazard_speed_min == 0 || self.hazard_speed_min > self.hazard_speed_max {
            return Err(SettingsError::Invalid(format!(
                "hazard speed range {}..={} is empty",
                self.hazard_speed_min, self.hazard_speed_max
            )));
        }
        if self.pickup_interval_secs == 0 {
            return Err(SettingsError::Invalid(
                "pickup_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Errors raised while loading a config file.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "cannot read config: {}", e),
            SettingsError::Parse(e) => write!(f, "malformed config: {}", e),
            SettingsError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}
