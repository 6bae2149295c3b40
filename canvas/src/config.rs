//! Engine configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    AI_EDIT_COST, AI_GENERATE_COST, AI_RESULT_OFFSET, ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, DEFAULT_FONT_SIZE,
    DEFAULT_STROKE_WIDTH, DIALOG_GAP_PX, HANDLE_RADIUS_PX, HIT_TOLERANCE_PX, MAX_SCALE, MIN_SCALE,
    OVERLAY_INSET_PX, WHEEL_ZOOM_BASE,
};

/// Errors produced while building a [`CanvasConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Parse { var: &'static str, value: String },

    /// The zoom limits are not a positive, ordered range.
    #[error("invalid zoom range: min {min} must be positive and not exceed max {max}")]
    ZoomRange { min: f64, max: f64 },

    /// A size or tolerance that must be strictly positive was not.
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

/// Tunables for viewport limits, hit-testing, arrow geometry, overlays and AI placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Thin-stroke fallback tolerance in screen pixels (converted to scene units at the current zoom).
    pub hit_tolerance_px: f64,
    pub handle_radius_px: f64,
    pub arrow_head_length: f64,
    /// Arrowhead half-angle in radians.
    pub arrow_head_angle: f64,
    pub overlay_inset_px: f64,
    pub dialog_gap_px: f64,
    pub ai_result_offset: f64,
    pub wheel_zoom_base: f64,
    pub default_stroke_width: f64,
    pub default_font_size: f64,
    pub ai_edit_cost: u32,
    pub ai_generate_cost: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            hit_tolerance_px: HIT_TOLERANCE_PX,
            handle_radius_px: HANDLE_RADIUS_PX,
            arrow_head_length: ARROW_HEAD_LENGTH,
            arrow_head_angle: ARROW_HEAD_ANGLE,
            overlay_inset_px: OVERLAY_INSET_PX,
            dialog_gap_px: DIALOG_GAP_PX,
            ai_result_offset: AI_RESULT_OFFSET,
            wheel_zoom_base: WHEEL_ZOOM_BASE,
            default_stroke_width: DEFAULT_STROKE_WIDTH,
            default_font_size: DEFAULT_FONT_SIZE,
            ai_edit_cost: AI_EDIT_COST,
            ai_generate_cost: AI_GENERATE_COST,
        }
    }
}

impl CanvasConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional; defaults come from [`crate::consts`]:
    /// - `CANVAS_MIN_SCALE`, `CANVAS_MAX_SCALE`
    /// - `CANVAS_HIT_TOLERANCE_PX`, `CANVAS_HANDLE_RADIUS_PX`
    /// - `CANVAS_ARROW_HEAD_LENGTH`, `CANVAS_ARROW_HEAD_ANGLE_DEG`
    /// - `CANVAS_OVERLAY_INSET_PX`, `CANVAS_DIALOG_GAP_PX`
    /// - `CANVAS_AI_RESULT_OFFSET`, `CANVAS_WHEEL_ZOOM_BASE`
    /// - `CANVAS_STROKE_WIDTH`, `CANVAS_FONT_SIZE`
    /// - `CANVAS_AI_EDIT_COST`, `CANVAS_AI_GENERATE_COST`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed, or if the
    /// resulting values fail [`CanvasConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            min_scale: env_parse("CANVAS_MIN_SCALE", defaults.min_scale)?,
            max_scale: env_parse("CANVAS_MAX_SCALE", defaults.max_scale)?,
            hit_tolerance_px: env_parse("CANVAS_HIT_TOLERANCE_PX", defaults.hit_tolerance_px)?,
            handle_radius_px: env_parse("CANVAS_HANDLE_RADIUS_PX", defaults.handle_radius_px)?,
            arrow_head_length: env_parse("CANVAS_ARROW_HEAD_LENGTH", defaults.arrow_head_length)?,
            arrow_head_angle: env_parse("CANVAS_ARROW_HEAD_ANGLE_DEG", defaults.arrow_head_angle.to_degrees())?
                .to_radians(),
            overlay_inset_px: env_parse("CANVAS_OVERLAY_INSET_PX", defaults.overlay_inset_px)?,
            dialog_gap_px: env_parse("CANVAS_DIALOG_GAP_PX", defaults.dialog_gap_px)?,
            ai_result_offset: env_parse("CANVAS_AI_RESULT_OFFSET", defaults.ai_result_offset)?,
            wheel_zoom_base: env_parse("CANVAS_WHEEL_ZOOM_BASE", defaults.wheel_zoom_base)?,
            default_stroke_width: env_parse("CANVAS_STROKE_WIDTH", defaults.default_stroke_width)?,
            default_font_size: env_parse("CANVAS_FONT_SIZE", defaults.default_font_size)?,
            ai_edit_cost: env_parse("CANVAS_AI_EDIT_COST", defaults.ai_edit_cost)?,
            ai_generate_cost: env_parse("CANVAS_AI_GENERATE_COST", defaults.ai_generate_cost)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the zoom range is empty or non-positive, or a size is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(ConfigError::ZoomRange { min: self.min_scale, max: self.max_scale });
        }
        for (name, value) in [
            ("hit_tolerance_px", self.hit_tolerance_px),
            ("handle_radius_px", self.handle_radius_px),
            ("arrow_head_length", self.arrow_head_length),
            ("wheel_zoom_base", self.wheel_zoom_base),
            ("default_font_size", self.default_font_size),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Parse { var, value: raw.clone() })
}
