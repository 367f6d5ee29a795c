//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Stratum scheduler command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "stratum", about = "Multi-frustum draw scheduler")]
pub struct CliArgs {
    /// Far-to-near ratio per depth slice.
    #[arg(long)]
    pub far_to_near_ratio: Option<f64>,

    /// Tint commands by slice overlap and collect statistics.
    #[arg(long)]
    pub show_frustums: Option<bool>,

    /// Tint each command a stable pseudo-random color.
    #[arg(long)]
    pub show_commands: Option<bool>,

    /// Redirect one slice's depth to the inspectable debug target.
    #[arg(long)]
    pub show_globe_depth: Option<bool>,

    /// Which slice to inspect with --show-globe-depth.
    #[arg(long)]
    pub show_globe_depth_frustum: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ratio) = args.far_to_near_ratio {
            self.scene.far_to_near_ratio = ratio;
        }
        if let Some(show) = args.show_frustums {
            self.debug.show_frustums = show;
        }
        if let Some(show) = args.show_commands {
            self.debug.show_commands = show;
        }
        if let Some(show) = args.show_globe_depth {
            self.debug.show_globe_depth = show;
        }
        if let Some(slice) = args.show_globe_depth_frustum {
            self.debug.show_globe_depth_frustum = slice;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            far_to_near_ratio: Some(500.0),
            show_frustums: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.scene.far_to_near_ratio, 500.0);
        assert!(config.debug.show_frustums);
        // Non-overridden fields retain defaults.
        assert!(!config.debug.show_commands);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "stratum",
            "--far-to-near-ratio",
            "200",
            "--show-globe-depth-frustum",
            "1",
        ]);
        assert_eq!(args.far_to_near_ratio, Some(200.0));
        assert_eq!(args.show_globe_depth_frustum, Some(1));
    }
}
