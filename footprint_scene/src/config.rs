//! Environment-driven settings.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::geometry::DEFAULT_SCENE_SCALE;
use crate::scene::{FitSettings, PipelineSettings};

const DATA_VAR: &str = "FOOTPRINTS_DATA";
const PADDING_VAR: &str = "FOOTPRINTS_FIT_PADDING";
const DURATION_VAR: &str = "FOOTPRINTS_FIT_DURATION_MS";
const SCALE_VAR: &str = "FOOTPRINTS_SCENE_SCALE";

const DEFAULT_FIT_PADDING: f32 = 1.2;
const DEFAULT_FIT_DURATION_MS: u64 = 800;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// GeoJSON or record-array file replayed once at startup.
    pub data_path: Option<PathBuf>,
    pub fit_padding: f32,
    /// Zero disables the animated fit.
    pub fit_duration: Duration,
    pub scene_scale: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            fit_padding: DEFAULT_FIT_PADDING,
            fit_duration: Duration::from_millis(DEFAULT_FIT_DURATION_MS),
            scene_scale: DEFAULT_SCENE_SCALE,
        }
    }
}

impl SceneConfig {
    /// Read settings from the environment. Invalid values are reported and
    /// replaced by their defaults.
    pub fn from_env() -> Self {
        let data_path = std::env::var_os(DATA_VAR)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let fit_padding = positive_var(PADDING_VAR, DEFAULT_FIT_PADDING);
        let fit_duration = env_var(DURATION_VAR).map_or(DEFAULT_FIT_DURATION_MS, |raw| {
            parse_or_default(DURATION_VAR, &raw, DEFAULT_FIT_DURATION_MS)
        });
        let scene_scale = positive_var(SCALE_VAR, DEFAULT_SCENE_SCALE);

        Self {
            data_path,
            fit_padding,
            fit_duration: Duration::from_millis(fit_duration),
            scene_scale,
        }
    }

    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            padding: self.fit_padding,
            duration: self.fit_duration,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            scene_scale: self.scene_scale,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_or_default<T: FromStr + Copy>(key: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        eprintln!("footprints: invalid value in {key}: {raw:?}, using default");
        default
    })
}

fn positive_var<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + PartialOrd + Default + Into<f64>,
{
    let Some(raw) = env_var(key) else {
        return default;
    };
    let value = parse_or_default(key, &raw, default);
    if value > T::default() && value.into().is_finite() {
        value
    } else {
        eprintln!("footprints: {key} must be positive and finite, got {raw:?}, using default");
        default
    }
}
