//! Validation tests for persisted preferences

use drum_remap::Preferences;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("config.json"));
        assert_eq!(prefs, Preferences::default());
        assert!(prefs.use_same_folder);
        assert_eq!(prefs.filename_template, "{filename}_remap{ext}");
        assert!(!prefs.open_explorer);
    }

    #[test]
    fn defaults_apply_when_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Preferences::load(&path), Preferences::default());
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_mapping": "ssd5_to_musescore.xml"}"#).unwrap();

        let prefs = Preferences::load(&path);
        assert_eq!(prefs.last_mapping, "ssd5_to_musescore.xml");
        assert!(prefs.use_same_folder);
        assert_eq!(prefs.filename_template, "{filename}_remap{ext}");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let prefs = Preferences {
            last_mapping: "musescore_to_ssd5.xml".to_string(),
            use_same_folder: false,
            output_dir: "/tmp/out".to_string(),
            filename_template: "{filename}_converted{ext}".to_string(),
            open_explorer: true,
        };
        prefs.save(&path);

        assert_eq!(Preferences::load(&path), prefs);
    }

    #[test]
    fn save_to_unwritable_path_is_not_fatal() {
        let prefs = Preferences::default();
        // Only emits a warning
        prefs.save(std::path::Path::new("/definitely/not/a/real/dir/config.json"));
    }
}
