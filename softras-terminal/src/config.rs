/// Viewer configuration, built once at startup from an optional JSON file
/// plus command-line flags and handed to the app by value
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use softras_core::math::Vec3f;

/// How the mesh is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Solid,
    Wireframe,
}

/// How frame buffer pixels become terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Two pixels per cell via `▀` with 24-bit colors
    #[default]
    TrueColor,
    /// One pixel per cell from a luminosity ramp
    Ascii,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// OBJ file to show; a cube when absent
    #[serde(default)]
    pub model: Option<PathBuf>,
    #[serde(default = "default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    /// Direction towards the light, in model space
    #[serde(default = "default_light_direction")]
    pub light_direction: [f32; 3],
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Log destination; the terminal itself is busy with the frame
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_fov_y_degrees() -> f32 {
    60.0
}

fn default_light_direction() -> [f32; 3] {
    [0.3, 0.5, 0.8]
}

fn default_target_fps() -> u32 {
    30
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("snapshot.tga")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("softras.log")
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: None,
            fov_y_degrees: default_fov_y_degrees(),
            light_direction: default_light_direction(),
            target_fps: default_target_fps(),
            mode: RenderMode::default(),
            palette: Palette::default(),
            snapshot_path: default_snapshot_path(),
            log_file: default_log_file(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// Unknown flag or missing flag value
    Usage(String),
    /// Value outside its accepted range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid config JSON: {err}"),
            ConfigError::Usage(msg) => write!(f, "{msg}\n{USAGE}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

pub const USAGE: &str =
    "usage: softras [--config FILE] [--fov DEG] [--fps N] [--wireframe] [--ascii] [MODEL.obj]";

impl ViewerConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    /// Build from command-line arguments (program name excluded).
    ///
    /// `--config` is applied first wherever it appears; the other flags
    /// override what the file sets.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut config = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| ConfigError::Usage("--config needs a file".to_string()))?;
                Self::load(path)?
            }
            None => Self::default(),
        };

        let mut i = 0;
        while i < args.len() {
            let value = |name: &str| {
                args.get(i + 1)
                    .ok_or_else(|| ConfigError::Usage(format!("{name} needs a value")))
            };
            match args[i].as_str() {
                "--config" => i += 2,
                "--fov" => {
                    config.fov_y_degrees = value("--fov")?
                        .parse()
                        .map_err(|_| ConfigError::Usage("--fov expects degrees".to_string()))?;
                    i += 2;
                }
                "--fps" => {
                    config.target_fps = value("--fps")?
                        .parse()
                        .map_err(|_| ConfigError::Usage("--fps expects an integer".to_string()))?;
                    i += 2;
                }
                "--wireframe" => {
                    config.mode = RenderMode::Wireframe;
                    i += 1;
                }
                "--ascii" => {
                    config.palette = Palette::Ascii;
                    i += 1;
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::Usage(format!("unknown flag {flag}")));
                }
                path => {
                    config.model = Some(PathBuf::from(path));
                    i += 1;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view {} is outside (0, 180)",
                self.fov_y_degrees
            )));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target fps must be positive".to_string()));
        }
        if Vec3f::from(self.light_direction).norm() <= f32::EPSILON {
            return Err(ConfigError::Invalid("light direction must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Unit light direction
    pub fn light_dir(&self) -> Vec3f {
        Vec3f::from(self.light_direction).normalize()
    }
}
