//! # Output
//!
//! Terminal styling for the bootstrap progress lines, and the colour policy
//! deciding whether styles are emitted at all.
//!
//! ## Colour policy
//!
//! - `--color=never|always|auto` - CLI flag
//! - `NO_COLOR` - disables colours when set (https://no-color.org/)
//! - `CLICOLOR=0` - disables colours
//! - `CLICOLOR_FORCE=1` - forces colours even without a TTY
//! - `TERM=dumb` - disables colours
//!
//! The policy is applied once at startup with
//! [`OutputConfig::apply`], which configures `console` globally; the style
//! helpers below then follow it.

use std::env;

use console::style;

/// Colour settings for one run.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the colour policy from the `--color` value and the
    /// environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Make `console` styles on stdout and stderr follow this policy.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `symbol` with colours on, `plain` otherwise.
pub fn symbol<'a>(config: &OutputConfig, symbol: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        symbol
    } else {
        plain
    }
}

/// Section headers, e.g. "Initializing the backend service:".
pub fn highlight(text: &str) -> String {
    style(text).cyan().bold().to_string()
}

/// Progress lines of the bootstrap steps.
pub fn info(text: &str) -> String {
    style(text).green().to_string()
}

pub fn warning(text: &str) -> String {
    style(text).yellow().to_string()
}

pub fn error(text: &str) -> String {
    style(text).red().bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let saved: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (k.to_string(), env::var(k).ok()))
            .collect();
        for (k, v) in vars {
            match v {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
        f();
        for (k, v) in saved {
            match v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    #[test]
    #[serial]
    fn test_auto_respects_no_color() {
        with_env(
            &[("NO_COLOR", Some("1")), ("CLICOLOR_FORCE", Some("1"))],
            || assert!(!OutputConfig::from_env_and_flag("auto").use_color),
        );
    }

    #[test]
    #[serial]
    fn test_auto_respects_clicolor_force() {
        with_env(
            &[
                ("NO_COLOR", None),
                ("CLICOLOR", None),
                ("CLICOLOR_FORCE", Some("1")),
            ],
            || assert!(OutputConfig::from_env_and_flag("auto").use_color),
        );
    }

    #[test]
    #[serial]
    fn test_auto_respects_clicolor_zero() {
        with_env(
            &[
                ("NO_COLOR", None),
                ("CLICOLOR", Some("0")),
                ("CLICOLOR_FORCE", Some("1")),
            ],
            || assert!(!OutputConfig::from_env_and_flag("auto").use_color),
        );
    }

    #[test]
    fn test_symbol_follows_color() {
        assert_eq!(symbol(&OutputConfig::with_color(), "✓", "[OK]"), "✓");
        assert_eq!(symbol(&OutputConfig::without_color(), "✓", "[OK]"), "[OK]");
    }

    #[test]
    fn test_styles_keep_text() {
        for styled in [
            highlight("Initializing"),
            info("...formatting"),
            warning("skipped"),
            error("failed"),
        ] {
            let plain = console::strip_ansi_codes(&styled);
            assert!(!plain.is_empty());
        }
        assert_eq!(console::strip_ansi_codes(&info("...done")), "...done");
    }
}
