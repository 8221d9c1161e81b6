use crate::Colors;

#[test]
fn off_paints_nothing() {
    let colors = Colors::new(false);
    assert!(!colors.is_enabled());
    assert_eq!(colors.paint(colors.red, "^^^"), "^^^");
}

#[test]
fn on_wraps_with_reset() {
    let colors = Colors::new(true);
    assert!(colors.is_enabled());
    assert_eq!(colors.paint(colors.blue, "JSON"), "\x1b[34mJSON\x1b[0m");
}

#[test]
fn default_is_off() {
    assert!(!Colors::default().is_enabled());
}
