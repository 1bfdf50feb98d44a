//! TOML Configuration File Support
//!
//! Every timing, distance and layout constant the sequence uses lives in
//! [`ChoreographyConfig`]. Values are opaque to the sequencing logic; they
//! only shape what the engine is asked to do.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at
//! `$XDG_CONFIG_HOME/checkout-conductor/choreography.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! time_scale = 1.0
//!
//! [timing]
//! text_swap_secs = 0.35
//! panel_slide_secs = 0.6
//! panel_slide_delay_secs = 0.1
//!
//! [spring]
//! damping = 0.8
//! initial_velocity = 0.5
//!
//! [distances]
//! checkmark_upward = 60.0
//! panel_start_offset = 300.0
//!
//! [layout]
//! button_width = 327.0
//! horizontal_padding = 24.0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{Offset, SpringMotion, MAX_TIME_SCALE};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Per-phase durations and delays
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Phase 1
    pub text_swap: Duration,
    /// Phase 2
    pub button_to_white: Duration,
    /// Phase 2 start delay
    pub button_to_white_delay: Duration,
    /// Phase 3
    pub text_mask: Duration,
    /// Phase 4
    pub checkmark_up: Duration,
    /// Phase 4 start delay
    pub checkmark_up_delay: Duration,
    /// Phase 5 label and floating checkmark fades
    pub labels_fade: Duration,
    /// Phase 5 panel entry, shared with phase 6
    pub panel_slide: Duration,
    /// Phase 5 panel entry delay, shared with phase 6
    pub panel_slide_delay: Duration,
    /// Phase 7
    pub spread: Duration,
    /// Phase 7 start delay
    pub spread_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            text_swap: Duration::from_millis(350),
            button_to_white: Duration::from_millis(250),
            button_to_white_delay: Duration::from_millis(100),
            text_mask: Duration::from_millis(500),
            checkmark_up: Duration::from_millis(400),
            checkmark_up_delay: Duration::from_millis(50),
            labels_fade: Duration::from_millis(200),
            panel_slide: Duration::from_millis(600),
            panel_slide_delay: Duration::from_millis(100),
            spread: Duration::from_millis(400),
            spread_delay: Duration::from_millis(100),
        }
    }
}

/// Spring parameters for the reveal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Damping ratio
    pub damping: f32,
    /// Initial velocity
    pub initial_velocity: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 0.8,
            initial_velocity: 0.5,
        }
    }
}

/// Pixel distances and resting values per phase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// How far the floating checkmark rises in phase 4
    pub checkmark_upward: f32,
    /// Opacity the floating checkmark settles at after rising
    pub checkmark_lift_opacity: f32,
    /// How far "Place Order" travels right in phase 1
    pub place_order_exit: f32,
    /// How far below its resting place the success panel starts
    pub panel_start_offset: f32,
    /// Where "Order placed" waits before phase 1 (negative = left)
    pub order_placed_entry_offset: f32,
    /// How far below centre "Continue Shopping" waits before phase 6
    pub continue_label_slide_offset: f32,
    /// Where the chevron waits before phase 6
    pub chevron_parked: Offset,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            checkmark_upward: 60.0,
            checkmark_lift_opacity: 0.6,
            place_order_exit: 150.0,
            panel_start_offset: 300.0,
            order_placed_entry_offset: -200.0,
            continue_label_slide_offset: 40.0,
            chevron_parked: Offset::new(-20.0, -40.0),
        }
    }
}

/// Layout metrics used by the built-in geometry provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Button width in points
    pub button_width: f32,
    /// Inset from the button edges in phase 7
    pub horizontal_padding: f32,
    /// Average advance of one button-text character
    pub glyph_advance: f32,
    /// Width of the chevron glyph
    pub chevron_width: f32,
    /// Side of the small checkmark
    pub checkmark_size: f32,
    /// Gap between "Order placed" and its checkmark
    pub checkmark_spacing: f32,
    /// Side of the floating checkmark
    pub floating_checkmark_size: f32,
    /// Border width while the surface is white
    pub border_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            button_width: 327.0,
            horizontal_padding: 24.0,
            glyph_advance: 8.5,
            chevron_width: 8.0,
            checkmark_size: 20.0,
            checkmark_spacing: 8.0,
            floating_checkmark_size: 24.0,
            border_width: 1.0,
        }
    }
}

/// Button copy (affects measured widths)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Initial label
    pub place_order: String,
    /// Confirmation label
    pub order_placed: String,
    /// Final label
    pub continue_shopping: String,
    /// Trailing glyph
    pub chevron: String,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            place_order: "Place Order".to_string(),
            order_placed: "Order placed".to_string(),
            continue_shopping: "Continue Shopping".to_string(),
            chevron: "\u{203a}".to_string(),
        }
    }
}

/// Centralized configuration for the choreography
#[derive(Clone, Debug)]
pub struct ChoreographyConfig {
    /// Durations and delays
    pub timing: TimingConfig,
    /// Reveal spring
    pub spring: SpringConfig,
    /// Distances and resting values
    pub distances: DistanceConfig,
    /// Layout metrics
    pub layout: LayoutConfig,
    /// Button copy
    pub copy: CopyConfig,
    /// Multiplier applied by real-time engines (1.0 = as designed)
    pub time_scale: f32,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            spring: SpringConfig::default(),
            distances: DistanceConfig::default(),
            layout: LayoutConfig::default(),
            copy: CopyConfig::default(),
            time_scale: 1.0,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ChoreographyConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The one spring timing shared by the panel entry and phase 6
    #[must_use]
    pub fn reveal_motion(&self) -> SpringMotion {
        SpringMotion {
            duration: self.timing.panel_slide,
            delay: self.timing.panel_slide_delay,
            damping: self.spring.damping,
            initial_velocity: self.spring.initial_velocity,
        }
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values the sequence cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spring.damping > 0.0 && self.spring.damping <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "spring damping must be in (0, 1], got {}",
                self.spring.damping
            )));
        }
        if !(self.layout.button_width > 0.0 && self.layout.button_width.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "button width must be positive and finite, got {}",
                self.layout.button_width
            )));
        }
        if !(0.0..=MAX_TIME_SCALE).contains(&self.time_scale) {
            return Err(ConfigError::ValidationError(format!(
                "time scale must be in [0, {MAX_TIME_SCALE}], got {}",
                self.time_scale
            )));
        }
        let opacity = self.distances.checkmark_lift_opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ConfigError::ValidationError(format!(
                "checkmark lift opacity must be in [0, 1], got {opacity}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration (seconds)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Phase 1 duration
    pub text_swap_secs: Option<f64>,
    /// Phase 2 duration
    pub button_to_white_secs: Option<f64>,
    /// Phase 2 delay
    pub button_to_white_delay_secs: Option<f64>,
    /// Phase 3 duration
    pub text_mask_secs: Option<f64>,
    /// Phase 4 duration
    pub checkmark_up_secs: Option<f64>,
    /// Phase 4 delay
    pub checkmark_up_delay_secs: Option<f64>,
    /// Phase 5 fades
    pub labels_fade_secs: Option<f64>,
    /// Phase 5/6 spring duration
    pub panel_slide_secs: Option<f64>,
    /// Phase 5/6 spring delay
    pub panel_slide_delay_secs: Option<f64>,
    /// Phase 7 duration
    pub spread_secs: Option<f64>,
    /// Phase 7 delay
    pub spread_delay_secs: Option<f64>,
}

/// Spring section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringToml {
    /// Damping ratio
    pub damping: Option<f32>,
    /// Initial velocity
    pub initial_velocity: Option<f32>,
}

/// Distances section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceToml {
    /// Phase 4 rise
    pub checkmark_upward: Option<f32>,
    /// Phase 4 resting opacity
    pub checkmark_lift_opacity: Option<f32>,
    /// Phase 1 exit travel
    pub place_order_exit: Option<f32>,
    /// Panel start offset
    pub panel_start_offset: Option<f32>,
    /// "Order placed" entry offset
    pub order_placed_entry_offset: Option<f32>,
    /// "Continue Shopping" slide offset
    pub continue_label_slide_offset: Option<f32>,
}

/// Layout section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutToml {
    /// Button width
    pub button_width: Option<f32>,
    /// Edge inset
    pub horizontal_padding: Option<f32>,
    /// Character advance
    pub glyph_advance: Option<f32>,
    /// Chevron width
    pub chevron_width: Option<f32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyToml {
    /// Real-time playback multiplier
    pub time_scale: Option<f32>,
    /// Timing section
    pub timing: TimingToml,
    /// Spring section
    pub spring: SpringToml,
    /// Distances section
    pub distances: DistanceToml,
    /// Layout section
    pub layout: LayoutToml,
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values supplied on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Override the time scale
    pub time_scale: Option<f32>,
    /// Override the button width
    pub button_width: Option<f32>,
}

impl ConfigOverrides {
    /// Apply the overrides (highest priority)
    pub fn apply(&self, config: &mut ChoreographyConfig) {
        if let Some(scale) = self.time_scale {
            config.time_scale = scale;
            config.set_source(ConfigSource::Cli);
        }
        if let Some(width) = self.button_width {
            config.layout.button_width = width;
            config.set_source(ConfigSource::Cli);
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/checkout-conductor/choreography.toml` or
/// `~/.config/checkout-conductor/choreography.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("checkout-conductor").join("choreography.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<ChoreographyConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then apply the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ChoreographyConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    env: F,
) -> Result<ChoreographyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ChoreographyConfig::new();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ChoreographyToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.set_source(ConfigSource::File);

            tracing::info!(
                path = %config_path.display(),
                "Loaded choreography configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn secs(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::ValidationError(format!("{field}: {e} ({value})")))
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(
    config: &mut ChoreographyConfig,
    toml: &ChoreographyToml,
) -> Result<(), ConfigError> {
    if let Some(scale) = toml.time_scale {
        config.time_scale = scale;
    }

    let t = &toml.timing;
    let timing = &mut config.timing;
    let durations = [
        ("text_swap_secs", t.text_swap_secs, &mut timing.text_swap),
        ("button_to_white_secs", t.button_to_white_secs, &mut timing.button_to_white),
        (
            "button_to_white_delay_secs",
            t.button_to_white_delay_secs,
            &mut timing.button_to_white_delay,
        ),
        ("text_mask_secs", t.text_mask_secs, &mut timing.text_mask),
        ("checkmark_up_secs", t.checkmark_up_secs, &mut timing.checkmark_up),
        (
            "checkmark_up_delay_secs",
            t.checkmark_up_delay_secs,
            &mut timing.checkmark_up_delay,
        ),
        ("labels_fade_secs", t.labels_fade_secs, &mut timing.labels_fade),
        ("panel_slide_secs", t.panel_slide_secs, &mut timing.panel_slide),
        (
            "panel_slide_delay_secs",
            t.panel_slide_delay_secs,
            &mut timing.panel_slide_delay,
        ),
        ("spread_secs", t.spread_secs, &mut timing.spread),
        ("spread_delay_secs", t.spread_delay_secs, &mut timing.spread_delay),
    ];
    for (field, value, slot) in durations {
        if let Some(value) = value {
            *slot = secs(field, value)?;
        }
    }

    if let Some(damping) = toml.spring.damping {
        config.spring.damping = damping;
    }
    if let Some(velocity) = toml.spring.initial_velocity {
        config.spring.initial_velocity = velocity;
    }

    let d = &toml.distances;
    if let Some(v) = d.checkmark_upward {
        config.distances.checkmark_upward = v;
    }
    if let Some(v) = d.checkmark_lift_opacity {
        config.distances.checkmark_lift_opacity = v;
    }
    if let Some(v) = d.place_order_exit {
        config.distances.place_order_exit = v;
    }
    if let Some(v) = d.panel_start_offset {
        config.distances.panel_start_offset = v;
    }
    if let Some(v) = d.order_placed_entry_offset {
        config.distances.order_placed_entry_offset = v;
    }
    if let Some(v) = d.continue_label_slide_offset {
        config.distances.continue_label_slide_offset = v;
    }

    let l = &toml.layout;
    if let Some(v) = l.button_width {
        config.layout.button_width = v;
    }
    if let Some(v) = l.horizontal_padding {
        config.layout.horizontal_padding = v;
    }
    if let Some(v) = l.glyph_advance {
        config.layout.glyph_advance = v;
    }
    if let Some(v) = l.chevron_width {
        config.layout.chevron_width = v;
    }

    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ChoreographyConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(scale) = env("CHECKOUT_TIME_SCALE") {
        if let Ok(scale) = scale.parse::<f32>() {
            config.time_scale = scale;
            config.set_source(ConfigSource::Env);
        }
    }
    if let Some(width) = env("CHECKOUT_BUTTON_WIDTH") {
        if let Ok(width) = width.parse::<f32>() {
            config.layout.button_width = width;
            config.set_source(ConfigSource::Env);
        }
    }
    if let Some(damping) = env("CHECKOUT_SPRING_DAMPING") {
        if let Ok(damping) = damping.parse::<f32>() {
            config.spring.damping = damping;
            config.set_source(ConfigSource::Env);
        }
    }
}
