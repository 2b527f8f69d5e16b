use std::env;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{BoundaryRect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::gameplay::{BodyTuning, CameraFollowSettings, MotionTuning, PopupSettings};

pub(crate) const CONFIG_ENV_VAR: &str = "PLATFORMER_CONFIG";
pub(crate) const CONFIG_FILE_NAME: &str = "gameplay.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlatformConfig {
    pub waypoints: Vec<Vec2>,
    pub speed: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameplayConfig {
    pub motion: MotionTuning,
    pub body: BodyTuning,
    pub camera: CameraFollowSettings,
    pub popup: PopupSettings,
    pub platforms: Vec<PlatformConfig>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            motion: MotionTuning::default(),
            body: BodyTuning::default(),
            camera: CameraFollowSettings::default(),
            popup: PopupSettings::default(),
            platforms: vec![
                PlatformConfig {
                    waypoints: vec![Vec2::new(6.0, 2.5), Vec2::new(12.0, 2.5)],
                    speed: 2.0,
                },
                PlatformConfig {
                    waypoints: vec![
                        Vec2::new(18.0, 1.5),
                        Vec2::new(18.0, 5.0),
                        Vec2::new(22.0, 5.0),
                    ],
                    speed: 2.0,
                },
            ],
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}' at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: String,
        message: String,
    },
}

/// `PLATFORMER_CONFIG` when set, otherwise `gameplay.json` in `config_dir`.
pub(crate) fn resolve_config_path(config_dir: &Path) -> PathBuf {
    config_path_from(env::var_os(CONFIG_ENV_VAR).map(PathBuf::from), config_dir)
}

fn config_path_from(override_path: Option<PathBuf>, config_dir: &Path) -> PathBuf {
    match override_path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => config_dir.join(CONFIG_FILE_NAME),
    }
}

/// Reads and validates the config file. A missing file is `Ok(None)`.
pub(crate) fn load_config_file(path: &Path) -> Result<Option<GameplayConfig>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config = parse_config(&raw, path)?;
    validate_config(&config).map_err(|(field, message)| ConfigError::Invalid {
        path: path.to_path_buf(),
        field,
        message,
    })?;
    Ok(Some(config))
}

fn parse_config(raw: &str, path: &Path) -> Result<GameplayConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameplayConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field: if field.is_empty() { ".".to_string() } else { field },
            source: error.into_inner(),
        }
    })
}

type FieldError = (String, String);

fn expected_actual(field: &str, expected: impl Display, actual: impl Display) -> FieldError {
    (field.to_string(), format!("expected {expected}, got {actual}"))
}

fn finite(field: &str, value: f32) -> Result<(), FieldError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(expected_actual(field, "finite number", value))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), FieldError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(expected_actual(field, "value >= 0", value));
    }
    Ok(())
}

fn positive(field: &str, value: f32) -> Result<(), FieldError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(expected_actual(field, "value > 0", value));
    }
    Ok(())
}

fn finite_vec(field: &str, value: Vec2) -> Result<(), FieldError> {
    finite(&format!("{field}.x"), value.x)?;
    finite(&format!("{field}.y"), value.y)
}

fn ordered_range(field: &str, min: f32, max: f32) -> Result<(), FieldError> {
    if min > max {
        return Err(expected_actual(field, format!("min <= max ({max})"), min));
    }
    Ok(())
}

fn validate_boundary(field: &str, boundary: &BoundaryRect) -> Result<(), FieldError> {
    finite(&format!("{field}.min_x"), boundary.min_x)?;
    finite(&format!("{field}.max_x"), boundary.max_x)?;
    finite(&format!("{field}.min_y"), boundary.min_y)?;
    finite(&format!("{field}.max_y"), boundary.max_y)?;
    ordered_range(&format!("{field}.min_x"), boundary.min_x, boundary.max_x)?;
    ordered_range(&format!("{field}.min_y"), boundary.min_y, boundary.max_y)
}

pub(crate) fn validate_config(config: &GameplayConfig) -> Result<(), FieldError> {
    let motion = &config.motion;
    non_negative("motion.acceleration", motion.acceleration)?;
    non_negative("motion.deceleration", motion.deceleration)?;
    non_negative("motion.max_speed", motion.max_speed)?;
    non_negative("motion.vehicle_max_speed", motion.vehicle_max_speed)?;
    non_negative("motion.jump_impulse", motion.jump_impulse)?;
    non_negative("motion.slide_friction", motion.slide_friction)?;
    finite_vec("motion.hurt_impulse", motion.hurt_impulse)?;
    non_negative(
        "motion.moving_animation_threshold",
        motion.moving_animation_threshold,
    )?;

    let body = &config.body;
    positive("body.mass", body.mass)?;
    finite("body.gravity", body.gravity)?;
    finite("body.gravity_scale", body.gravity_scale)?;
    finite("body.ground_y", body.ground_y)?;
    non_negative("body.ground_friction", body.ground_friction)?;

    let camera = &config.camera;
    finite_vec("camera.offset", camera.offset)?;
    non_negative("camera.smooth_speed", camera.smooth_speed)?;
    non_negative("camera.smooth_time", camera.smooth_time)?;
    positive("camera.ortho_half_height", camera.ortho_half_height)?;
    validate_boundary("camera.boundary", &camera.boundary)?;

    let popup = &config.popup;
    non_negative("popup.min_check_interval", popup.min_check_interval)?;
    positive("popup.max_check_interval", popup.max_check_interval)?;
    ordered_range(
        "popup.min_check_interval",
        popup.min_check_interval,
        popup.max_check_interval,
    )?;
    if popup.random_min > popup.random_max {
        return Err(expected_actual(
            "popup.random_min",
            format!("min <= max ({})", popup.random_max),
            popup.random_min,
        ));
    }
    non_negative("popup.auto_close_delay", popup.auto_close_delay)?;

    for (index, platform) in config.platforms.iter().enumerate() {
        let prefix = format!("platforms[{index}]");
        if platform.waypoints.is_empty() {
            return Err(expected_actual(
                &format!("{prefix}.waypoints"),
                "at least one waypoint",
                0,
            ));
        }
        for (point_index, point) in platform.waypoints.iter().enumerate() {
            finite_vec(&format!("{prefix}.waypoints[{point_index}]"), *point)?;
        }
        non_negative(&format!("{prefix}.speed"), platform.speed)?;
    }
    Ok(())
}
