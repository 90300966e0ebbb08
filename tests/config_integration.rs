use std::path::PathBuf;

use marginalia::config::{
    ConfigFlags, ThemeMode, load_config_flags, parse_flag_tokens, save_config_flags,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".marginaliarc");
    let content = r"
# reading defaults
--watch

--theme light

--wrap-width 72 --render-debug-log=render.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.wrap_width, Some(72));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".marginaliarc");
    std::fs::write(&path, "--watch\n--theme light\n--render-debug-log file.log\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args: Vec<String> = ["marginalia", "--theme", "dark", "--no-toc"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.no_toc, "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.render_debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_saved_file_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    let flags = ConfigFlags {
        no_toc: true,
        wrap_width: Some(100),
        ..ConfigFlags::default()
    };
    save_config_flags(&path, &flags).unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("# marginalia defaults"));
    assert_eq!(load_config_flags(&path).unwrap(), flags);
}
