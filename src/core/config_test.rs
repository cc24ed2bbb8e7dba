#[cfg(test)]
mod tests {
    use crate::core::AppConfig;
    use crate::video::StreamKind;
    use std::path::PathBuf;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.source_url.is_none());
        assert_eq!(config.stream_kind, StreamKind::Offline);
        assert!(!config.auto_play);
        assert_eq!(config.fallback_fps, 20.0);
        assert!(config.ffmpeg_path.is_none());
        assert!(config.ffprobe_path.is_none());
        assert!(config.input_format.is_none());
        assert!(config.placeholder_image.is_none());
    }

    #[test]
    fn test_app_config_serialization() {
        let mut config = AppConfig::default();
        config.source_url = Some("/dev/video0".to_string());
        config.stream_kind = StreamKind::Live;
        config.auto_play = true;
        config.fallback_fps = 25.0;
        config.input_format = Some("v4l2".to_string());
        config.placeholder_image = Some(PathBuf::from("/test/path/cat.jpeg"));

        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        let deserialized: AppConfig =
            serde_json::from_str(&serialized).expect("Failed to deserialize config");

        assert_eq!(config.source_url, deserialized.source_url);
        assert_eq!(config.stream_kind, deserialized.stream_kind);
        assert_eq!(config.auto_play, deserialized.auto_play);
        assert_eq!(config.fallback_fps, deserialized.fallback_fps);
        assert_eq!(config.input_format, deserialized.input_format);
        assert_eq!(config.placeholder_image, deserialized.placeholder_image);
    }

    #[test]
    fn test_stream_kind_uses_lowercase_tags() {
        let serialized = serde_json::to_string(&StreamKind::Live).unwrap();
        assert_eq!(serialized, "\"live\"");
        let parsed: StreamKind = serde_json::from_str("\"offline\"").unwrap();
        assert_eq!(parsed, StreamKind::Offline);
    }

    #[test]
    fn test_config_backward_compatibility() {
        // Test that old config files without new fields can still be loaded
        let old_config_json = r#"{
            "source_url": "resource/video.mp4",
            "stream_kind": "offline"
        }"#;

        let config: AppConfig =
            serde_json::from_str(old_config_json).expect("Failed to parse old config");

        assert_eq!(config.source_url, Some("resource/video.mp4".to_string()));
        // New fields should have default values
        assert!(!config.auto_play);
        assert_eq!(config.fallback_fps, 20.0);
        assert!(config.input_format.is_none());
    }
}
