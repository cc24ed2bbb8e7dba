use crate::video::StreamKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source descriptor to load at startup: a file path, URL, or device
    /// string, passed through to the capture backend unmodified.
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "default_stream_kind")]
    pub stream_kind: StreamKind,
    /// Start playback as soon as the startup source is set.
    #[serde(default)]
    pub auto_play: bool,
    /// Tick rate used when a source reports no usable frame rate.
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f64,
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
    /// Input format forced on the capture backend with `-f`, e.g. "v4l2"
    /// for camera devices. None lets the backend autodetect.
    #[serde(default)]
    pub input_format: Option<String>,
    /// Image shown before any source is set. A built-in pattern is used
    /// when unset or unreadable.
    #[serde(default)]
    pub placeholder_image: Option<PathBuf>,
}

fn default_stream_kind() -> StreamKind {
    StreamKind::Offline
}

fn default_fallback_fps() -> f64 {
    20.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            stream_kind: StreamKind::Offline,
            auto_play: false,
            fallback_fps: default_fallback_fps(),
            ffmpeg_path: None,
            ffprobe_path: None,
            input_format: None,
            placeholder_image: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to read config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;

            // Try to parse the config, but if it fails, create a new one
            match serde_json::from_str::<Self>(&content) {
                Ok(config) => {
                    log::info!("Loaded existing config from {}", config_path.display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!(
                        "Config file exists but has issues ({}), creating new one with defaults",
                        e
                    );
                    let new_config = Self::default();
                    new_config
                        .save()
                        .map_err(|save_err| anyhow::anyhow!("Failed to save new config: {}", save_err))?;
                    log::info!("Created new config file at {}", config_path.display());
                    Ok(new_config)
                }
            }
        } else {
            log::info!("No config file found, creating default config");
            let config = Self::default();
            config
                .save()
                .map_err(|e| anyhow::anyhow!("Failed to save default config: {}", e))?;
            log::info!("Created new config file at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("video-box")
            .join("config.json")
    }
}
