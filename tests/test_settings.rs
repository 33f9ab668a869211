use std::path::PathBuf;

use mini_shooter::settings::*;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "mini_shooter_{}_{}.json",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_match_the_classic_rules() {
    let s = Settings::default();
    assert_eq!((s.world_width, s.world_height), (1080.0, 720.0));
    assert_eq!(s.tick_rate, 60);
    assert_eq!(s.initial_hazards, 5);
    assert_eq!(s.pickup_interval_ticks(), 300);
    assert_eq!(s.invulnerability_ticks(), 120);
    assert!(s.validate().is_ok());
}

#[test]
fn partial_json_keeps_other_defaults() {
    let s = Settings::from_json(r#"{ "initial_hazards": 8, "pickup_interval_secs": 10 }"#).unwrap();
    assert_eq!(s.initial_hazards, 8);
    assert_eq!(s.pickup_interval_ticks(), 600);
    assert_eq!(s.world_width, 1080.0);
    assert_eq!(s.player_speed, 5.0);
}

#[test]
fn empty_object_is_the_default() {
    assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Settings::from_json("{ initial_hazards: ").unwrap_err();
    assert!(matches!(err, SettingsError::Parse(_)));
    assert!(err.to_string().starts_with("malformed config"));
}

#[test]
fn zero_tick_rate_is_rejected() {
    let err = Settings::from_json(r#"{ "tick_rate": 0 }"#).unwrap_err();
    assert!(matches!(err, SettingsError::Invalid(_)));
}

#[test]
fn inverted_hazard_speed_range_is_rejected() {
    let s = Settings {
        hazard_speed_min: 6,
        hazard_speed_max: 3,
        ..Settings::default()
    };
    assert!(matches!(s.validate(), Err(SettingsError::Invalid(_))));
}

#[test]
fn world_narrower_than_the_player_is_rejected() {
    let s = Settings {
        world_width: 30.0,
        ..Settings::default()
    };
    assert!(s.validate().is_err());
}

#[test]
fn non_positive_speed_is_rejected() {
    let s = Settings {
        projectile_speed: 0.0,
        ..Settings::default()
    };
    let err = s.validate().unwrap_err();
    assert!(err.to_string().contains("projectile_speed"));
}

#[test]
fn zero_pickup_interval_is_rejected() {
    let s = Settings {
        pickup_interval_secs: 0,
        ..Settings::default()
    };
    assert!(s.validate().is_err());
}

#[test]
fn load_reads_a_file() {
    let path = temp_config("load", r#"{ "player_speed": 8.0 }"#);
    let s = Settings::load(&path).unwrap();
    assert_eq!(s.player_speed, 8.0);
    let _ = std::fs::remove_file(path);
}

#[test]
fn load_missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("mini_shooter_definitely_missing.json");
    assert!(matches!(Settings::load(&path), Err(SettingsError::Io(_))));
}

#[test]
fn load_or_default_falls_back() {
    assert_eq!(Settings::load_or_default(None), Settings::default());

    let path = temp_config("bad", r#"{ "tick_rate": 0 }"#);
    assert_eq!(Settings::load_or_default(Some(path.as_path())), Settings::default());
    let _ = std::fs::remove_file(path);

    let missing = std::env::temp_dir().join("mini_shooter_also_missing.json");
    assert_eq!(Settings::load_or_default(Some(missing.as_path())), Settings::default());
}
