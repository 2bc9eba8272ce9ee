#![forbid(unsafe_code)]

//! Overlay configuration.
//!
//! [`SpotlightConfig`] is a plain record with defaults and chainable setters.
//! Hosts may also read overrides from the environment:
//!
//! | Variable | Field | Unit |
//! |----------|-------|------|
//! | `SPOTLIGHT_BACKGROUND_FADE_MS` | `background_fade` | ms |
//! | `SPOTLIGHT_CAPTION_FADE_MS` | `caption_fade` | ms |
//! | `SPOTLIGHT_GROW_MS` | `grow` | ms |
//! | `SPOTLIGHT_PULSE_MS` | `pulse` | ms |
//! | `SPOTLIGHT_MOVE_MS` | `move_duration` | ms |
//! | `SPOTLIGHT_CLOSE_MS` | `close` | ms |
//! | `SPOTLIGHT_GROW_SEED_RATIO` | `grow_seed_ratio` | ratio |
//! | `SPOTLIGHT_PULSE_AMOUNT` | `pulse_amount` | surface units |
//! | `SPOTLIGHT_TARGET_PADDING` | `target_padding` | surface units |
//! | `SPOTLIGHT_CORNER_RADIUS` | `corner_radius` | surface units |
//! | `SPOTLIGHT_BORDER_WIDTH` | `border_width` | surface units |
//! | `SPOTLIGHT_BACKGROUND_ALPHA` | `max_background_alpha` | 0-255 |
//!
//! Bad values never fail the parse: they are collected as [`ConfigError`]s
//! and the default is kept.

use std::env;
use std::fmt;
use std::time::Duration;

use spotlight_text::{BlockMetrics, FitMetrics};

use crate::render::Rgba;

const ENV_BACKGROUND_FADE_MS: &str = "SPOTLIGHT_BACKGROUND_FADE_MS";
const ENV_CAPTION_FADE_MS: &str = "SPOTLIGHT_CAPTION_FADE_MS";
const ENV_GROW_MS: &str = "SPOTLIGHT_GROW_MS";
const ENV_PULSE_MS: &str = "SPOTLIGHT_PULSE_MS";
const ENV_MOVE_MS: &str = "SPOTLIGHT_MOVE_MS";
const ENV_CLOSE_MS: &str = "SPOTLIGHT_CLOSE_MS";
const ENV_GROW_SEED_RATIO: &str = "SPOTLIGHT_GROW_SEED_RATIO";
const ENV_PULSE_AMOUNT: &str = "SPOTLIGHT_PULSE_AMOUNT";
const ENV_TARGET_PADDING: &str = "SPOTLIGHT_TARGET_PADDING";
const ENV_CORNER_RADIUS: &str = "SPOTLIGHT_CORNER_RADIUS";
const ENV_BORDER_WIDTH: &str = "SPOTLIGHT_BORDER_WIDTH";
const ENV_BACKGROUND_ALPHA: &str = "SPOTLIGHT_BACKGROUND_ALPHA";

/// Timings, geometry, and colors for the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightConfig {
    /// Background fade-in at tour start.
    pub background_fade: Duration,
    /// Caption fade-in after each pulse.
    pub caption_fade: Duration,
    /// Hole growth from the seed rectangle.
    pub grow: Duration,
    /// One out-and-back pulse.
    pub pulse: Duration,
    /// Hole travel between pages.
    pub move_duration: Duration,
    /// Hole expansion to the full overlay on close.
    pub close: Duration,
    /// Size of the grow seed relative to the target, scaled about its center.
    pub grow_seed_ratio: f32,
    /// How far each edge moves out during a pulse.
    pub pulse_amount: f32,
    /// Gap between a host element and its hole.
    pub target_padding: f32,
    pub corner_radius: f32,
    pub border_width: f32,
    /// Glow stroke width as a multiple of `border_width`.
    pub glow_factor: f32,
    /// Background alpha once the fade-in completes.
    pub max_background_alpha: u8,
    pub overlay_color: Rgba,
    pub border_color: Rgba,
    pub text_color: Rgba,
    /// Caption cell metrics and paddings.
    pub fit_metrics: FitMetrics,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            background_fade: Duration::from_millis(800),
            caption_fade: Duration::from_millis(600),
            grow: Duration::from_millis(300),
            pulse: Duration::from_millis(1200),
            move_duration: Duration::from_millis(600),
            close: Duration::from_millis(220),
            grow_seed_ratio: 0.5,
            pulse_amount: 11.0,
            target_padding: 8.0,
            corner_radius: 8.0,
            border_width: 2.0,
            glow_factor: 1.4,
            max_background_alpha: 235,
            overlay_color: Rgba::BLACK,
            border_color: Rgba::WHITE,
            text_color: Rgba::WHITE,
            fit_metrics: FitMetrics::default(),
        }
    }
}

impl SpotlightConfig {
    #[must_use]
    pub fn background_fade(mut self, duration: Duration) -> Self {
        self.background_fade = duration;
        self
    }

    #[must_use]
    pub fn caption_fade(mut self, duration: Duration) -> Self {
        self.caption_fade = duration;
        self
    }

    #[must_use]
    pub fn grow(mut self, duration: Duration) -> Self {
        self.grow = duration;
        self
    }

    #[must_use]
    pub fn pulse(mut self, duration: Duration) -> Self {
        self.pulse = duration;
        self
    }

    #[must_use]
    pub fn move_duration(mut self, duration: Duration) -> Self {
        self.move_duration = duration;
        self
    }

    #[must_use]
    pub fn close(mut self, duration: Duration) -> Self {
        self.close = duration;
        self
    }

    /// Set every duration at once. Zero makes each phase finish on the
    /// tick after it starts.
    #[must_use]
    pub fn all_durations(self, duration: Duration) -> Self {
        self.background_fade(duration)
            .caption_fade(duration)
            .grow(duration)
            .pulse(duration)
            .move_duration(duration)
            .close(duration)
    }

    #[must_use]
    pub fn grow_seed_ratio(mut self, ratio: f32) -> Self {
        self.grow_seed_ratio = ratio;
        self
    }

    #[must_use]
    pub fn pulse_amount(mut self, amount: f32) -> Self {
        self.pulse_amount = amount;
        self
    }

    #[must_use]
    pub fn target_padding(mut self, padding: f32) -> Self {
        self.target_padding = padding;
        self
    }

    #[must_use]
    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    #[must_use]
    pub fn border_width(mut self, width: f32) -> Self {
        self.border_width = width;
        self
    }

    #[must_use]
    pub fn max_background_alpha(mut self, alpha: u8) -> Self {
        self.max_background_alpha = alpha;
        self
    }

    #[must_use]
    pub fn colors(mut self, overlay: Rgba, border: Rgba, text: Rgba) -> Self {
        self.overlay_color = overlay;
        self.border_color = border;
        self.text_color = text;
        self
    }

    #[must_use]
    pub fn fit_metrics(mut self, metrics: FitMetrics) -> Self {
        self.fit_metrics = metrics;
        self
    }

    /// Parse config from environment variables.
    ///
    /// Diagnostics are logged at warn level and otherwise dropped.
    #[must_use]
    pub fn from_env() -> SpotlightConfig {
        let parsed = Self::from_env_with_diagnostics();
        for error in &parsed.errors {
            tracing::warn!(
                target: spotlight_core::logging::TARGET,
                field = error.field,
                value = %error.value,
                "{}",
                error.message
            );
        }
        parsed.config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> SpotlightConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config from an arbitrary key lookup.
    pub fn from_env_with<F>(mut get: F) -> SpotlightConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = SpotlightConfig::default();
        let mut errors = Vec::new();

        read_duration(
            &mut get,
            ENV_BACKGROUND_FADE_MS,
            "background_fade",
            &mut config.background_fade,
            &mut errors,
        );
        read_duration(
            &mut get,
            ENV_CAPTION_FADE_MS,
            "caption_fade",
            &mut config.caption_fade,
            &mut errors,
        );
        read_duration(
            &mut get,
            ENV_GROW_MS,
            "grow",
            &mut config.grow,
            &mut errors,
        );
        read_duration(
            &mut get,
            ENV_PULSE_MS,
            "pulse",
            &mut config.pulse,
            &mut errors,
        );
        read_duration(
            &mut get,
            ENV_MOVE_MS,
            "move_duration",
            &mut config.move_duration,
            &mut errors,
        );
        read_duration(
            &mut get,
            ENV_CLOSE_MS,
            "close",
            &mut config.close,
            &mut errors,
        );

        read_f32(
            &mut get,
            ENV_GROW_SEED_RATIO,
            "grow_seed_ratio",
            &mut config.grow_seed_ratio,
            &mut errors,
        );
        read_f32(
            &mut get,
            ENV_PULSE_AMOUNT,
            "pulse_amount",
            &mut config.pulse_amount,
            &mut errors,
        );
        read_f32(
            &mut get,
            ENV_TARGET_PADDING,
            "target_padding",
            &mut config.target_padding,
            &mut errors,
        );
        read_f32(
            &mut get,
            ENV_CORNER_RADIUS,
            "corner_radius",
            &mut config.corner_radius,
            &mut errors,
        );
        read_f32(
            &mut get,
            ENV_BORDER_WIDTH,
            "border_width",
            &mut config.border_width,
            &mut errors,
        );

        if let Some(value) = get(ENV_BACKGROUND_ALPHA) {
            match value.trim().parse::<u8>() {
                Ok(parsed) => config.max_background_alpha = parsed,
                Err(_) => errors.push(ConfigError::new(
                    "max_background_alpha",
                    value,
                    "expected integer 0-255",
                )),
            }
        }

        if let Err(mut validation) = config.validate() {
            errors.append(&mut validation);
            // Keep the parse usable: fall back field by field.
            config.repair();
        }

        SpotlightConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_non_negative("grow_seed_ratio", self.grow_seed_ratio, &mut errors);
        validate_non_negative("pulse_amount", self.pulse_amount, &mut errors);
        validate_non_negative("target_padding", self.target_padding, &mut errors);
        validate_non_negative("corner_radius", self.corner_radius, &mut errors);
        validate_non_negative("border_width", self.border_width, &mut errors);
        validate_non_negative("glow_factor", self.glow_factor, &mut errors);

        let metrics = &self.fit_metrics;
        validate_non_negative("fit_metrics.padding", metrics.padding, &mut errors);
        validate_non_negative("fit_metrics.padding_left", metrics.padding_left, &mut errors);
        for (field, block) in [
            ("fit_metrics.title", metrics.title),
            ("fit_metrics.subtitle", metrics.subtitle),
            ("fit_metrics.page_label", metrics.page_label),
        ] {
            if !block_is_valid(&block) {
                errors.push(ConfigError::new(
                    field,
                    format!("{}x{}", block.cell_width, block.line_height),
                    "cell width and line height must be positive",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset every field that fails validation to its default.
    fn repair(&mut self) {
        let defaults = SpotlightConfig::default();
        for (value, default) in [
            (&mut self.grow_seed_ratio, defaults.grow_seed_ratio),
            (&mut self.pulse_amount, defaults.pulse_amount),
            (&mut self.target_padding, defaults.target_padding),
            (&mut self.corner_radius, defaults.corner_radius),
            (&mut self.border_width, defaults.border_width),
            (&mut self.glow_factor, defaults.glow_factor),
        ] {
            if !is_non_negative(*value) {
                *value = default;
            }
        }
        let metrics = &self.fit_metrics;
        let metrics_ok = is_non_negative(metrics.padding)
            && is_non_negative(metrics.padding_left)
            && [metrics.title, metrics.subtitle, metrics.page_label]
                .iter()
                .all(block_is_valid);
        if !metrics_ok {
            self.fit_metrics = defaults.fit_metrics;
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct SpotlightConfigParse {
    pub config: SpotlightConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[inline]
fn is_non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn block_is_valid(block: &BlockMetrics) -> bool {
    let positive = |v: f32| v.is_finite() && v > 0.0;
    positive(block.cell_width) && positive(block.line_height)
}

fn validate_non_negative(field: &'static str, value: f32, errors: &mut Vec<ConfigError>) {
    if !is_non_negative(value) {
        errors.push(ConfigError::new(
            field,
            value.to_string(),
            "must be finite and >= 0",
        ));
    }
}

fn read_duration<F>(
    get: &mut F,
    key: &str,
    field: &'static str,
    slot: &mut Duration,
    errors: &mut Vec<ConfigError>,
) where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(value) = get(key) {
        match parse_millis(&value) {
            Some(parsed) => *slot = parsed,
            None => errors.push(ConfigError::new(
                field,
                value,
                "expected duration in whole milliseconds",
            )),
        }
    }
}

fn read_f32<F>(
    get: &mut F,
    key: &str,
    field: &'static str,
    slot: &mut f32,
    errors: &mut Vec<ConfigError>,
) where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(value) = get(key) {
        match parse_f32(&value) {
            Some(parsed) => *slot = parsed,
            None => errors.push(ConfigError::new(field, value, "expected a finite number")),
        }
    }
}

#[inline]
fn parse_millis(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[inline]
fn parse_f32(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}
