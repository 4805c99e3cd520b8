use super::*;

const ALL_OS: [Option<Theme>; 3] = [None, Some(Theme::Dark), Some(Theme::Light)];

#[test]
fn stored_choice_wins_over_every_os_signal() {
    for os in ALL_OS {
        assert_eq!(resolve(Some(Theme::Light), os, Theme::Dark), Theme::Light);
        assert_eq!(resolve(Some(Theme::Dark), os, Theme::Dark), Theme::Dark);
    }
}

#[test]
fn os_signal_governs_without_stored_choice() {
    assert_eq!(resolve(None, Some(Theme::Light), Theme::Dark), Theme::Light);
    assert_eq!(resolve(None, Some(Theme::Dark), Theme::Light), Theme::Dark);
}

#[test]
fn default_applies_when_nothing_else_resolves() {
    assert_eq!(resolve(None, None, Theme::Dark), Theme::Dark);
    assert_eq!(resolve(None, None, Theme::Light), Theme::Light);
}

#[test]
fn raw_valid_stored_value_is_used() {
    assert_eq!(resolve_raw(Some("light"), Some(Theme::Dark), Theme::Dark), Theme::Light);
}

#[test]
fn raw_invalid_stored_value_counts_as_absent() {
    assert_eq!(resolve_raw(Some("purple"), Some(Theme::Light), Theme::Dark), Theme::Light);
    assert_eq!(resolve_raw(Some(""), None, Theme::Dark), Theme::Dark);
}

#[test]
fn raw_absent_stored_value_falls_through() {
    for os in ALL_OS {
        assert_eq!(resolve_raw(None, os, Theme::Dark), os.unwrap_or(Theme::Dark));
    }
}
