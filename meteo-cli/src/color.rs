use crossterm::style::{Color, Stylize, style};

/// Terminal styling that collapses to plain text when disabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bold(&self, s: &str) -> String {
        if self.enabled {
            style(s).bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn paint(&self, s: &str, color: Color) -> String {
        if self.enabled {
            style(s).with(color).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(s, Color::Cyan)
    }
}

/// Whether color should be used, given the `--no-color` flag and the
/// `NO_COLOR` / `TERM` environment.
pub fn color_enabled(no_color: bool) -> bool {
    let no_color_env = std::env::var("NO_COLOR").ok();
    let term = std::env::var("TERM").ok();
    color_allowed(no_color, no_color_env.as_deref(), term.as_deref())
}

fn color_allowed(no_color: bool, no_color_env: Option<&str>, term: Option<&str>) -> bool {
    if no_color {
        return false;
    }
    if no_color_env.is_some_and(|v| !v.is_empty()) {
        return false;
    }
    term != Some("dumb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_palette_is_identity() {
        let p = Palette::plain();

        assert_eq!(p.bold("Berlin"), "Berlin");
        assert_eq!(p.cyan("Wind:"), "Wind:");
        assert_eq!(p.paint("31.0°C", Color::Red), "31.0°C");
    }

    #[test]
    fn enabled_palette_wraps_text() {
        let p = Palette::new(true);

        assert_eq!(p.paint("hot", Color::Red), style("hot").with(Color::Red).to_string());
        assert_eq!(p.bold("Berlin"), style("Berlin").bold().to_string());
        assert!(p.bold("Berlin").contains("Berlin"));
        assert_ne!(p.bold("Berlin"), "Berlin");
    }

    #[test]
    fn color_detection() {
        assert!(color_allowed(false, None, Some("xterm-256color")));
        assert!(color_allowed(false, Some(""), None));
        assert!(!color_allowed(true, None, None));
        assert!(!color_allowed(false, Some("1"), None));
        assert!(!color_allowed(false, None, Some("dumb")));
    }
}
