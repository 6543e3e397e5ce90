use term_overlay::appearance::{Appearance, Background, FilterMode};
use term_overlay::prefs::{KEY_BACKGROUND, KEY_FILTER, PreferenceStore};

#[test]
fn default_shell_nonempty() {
    let shell = term_overlay::content::terminal::default_shell();
    assert!(!shell.is_empty());
    let command = term_overlay::content::default_shell_command();
    assert_eq!(command.get_argv(), &vec![std::ffi::OsString::from(&shell)]);
    assert!(command.get_cwd().is_some());
}

#[test]
fn preferences_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = PreferenceStore::load(&path).unwrap();
    let mut appearance = Appearance::from_prefs(&prefs);
    assert_eq!(appearance, Appearance::default());
    appearance.cycle_filter(&mut prefs);
    appearance.cycle_filter(&mut prefs);
    appearance.cycle_background(&mut prefs);

    let reloaded = PreferenceStore::load(&path).unwrap();
    assert_eq!(reloaded.get(KEY_FILTER), Some("both"));
    assert_eq!(reloaded.get(KEY_BACKGROUND), Some("midnight"));
    let restored = Appearance::from_prefs(&reloaded);
    assert_eq!(restored.filter, FilterMode::Both);
    assert_eq!(restored.background, Background::Midnight);
}

#[test]
fn empty_filter_value_means_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r#"{"filter": "", "background": "slate"}"#).unwrap();
    let prefs = PreferenceStore::load(&path).unwrap();
    let appearance = Appearance::from_prefs(&prefs);
    assert_eq!(appearance.filter, FilterMode::Off);
    assert_eq!(appearance.background, Background::Slate);
}
