use std::collections::HashMap;

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_without_file_or_env() {
    let settings = settings_from(None, env_of(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(
        settings.density().expect("density"),
        DisplayDensity::BASELINE
    );
}

#[test]
fn file_values_fill_in_over_defaults() {
    let settings = settings_from(
        Some("display_density = 2.0\ndatabase_url = \"sqlite://./data/player.db\"\n"),
        env_of(&[]),
    );
    assert_eq!(settings.display_density, 2.0);
    assert_eq!(
        settings.database_url.as_deref(),
        Some("sqlite://./data/player.db")
    );
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn environment_overrides_file() {
    let settings = settings_from(
        Some("display_density = 2.0\nlog_filter = \"warn\"\n"),
        env_of(&[
            ("PLAYER_DISPLAY_DENSITY", "1.5"),
            ("APP__DISPLAY_DENSITY", "3.0"),
            ("APP__LOG_FILTER", "player_core=debug"),
        ]),
    );
    assert_eq!(settings.display_density, 3.0);
    assert_eq!(settings.log_filter, "player_core=debug");
}

#[test]
fn malformed_inputs_fall_back() {
    let settings = settings_from(
        Some("display_density = \"dense\""),
        env_of(&[("PLAYER_DISPLAY_DENSITY", "wide"), ("APP__DATABASE_URL", " ")]),
    );
    assert_eq!(settings.display_density, 1.0);
    assert_eq!(settings.database_url, None);
}

#[test]
fn non_positive_density_is_rejected() {
    let settings = Settings {
        display_density: 0.0,
        ..Settings::default()
    };
    assert!(settings.density().is_err());
}

#[test]
fn lesson_script_comes_from_file_or_env() {
    let from_file = settings_from(Some("lesson_script = \"scripts/a.json\"\n"), env_of(&[]));
    assert_eq!(
        from_file.lesson_script,
        Some(PathBuf::from("scripts/a.json"))
    );

    let from_env = settings_from(
        Some("lesson_script = \"scripts/a.json\"\n"),
        env_of(&[("PLAYER_LESSON_SCRIPT", "scripts/b.json")]),
    );
    assert_eq!(from_env.lesson_script, Some(PathBuf::from("scripts/b.json")));
}
