//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Flags may appear anywhere on the
//! command line; the first positional argument selects the command and the
//! rest are that command's arguments.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        dry_run: bool,
    },
    /// Print the upcoming schedule and exit
    ScheduleCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Execute one event's action immediately
    FireCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        dry_run: bool,
        event_name: String,
    },
    /// Run the loop against a fast-forwarded clock
    SimulateCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
    },
    /// Help for a specific command, or general help
    HelpCommand { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    ///
    /// # Returns
    /// ParsedArgs containing the determined action
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut dry_run = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();

        let mut iter = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--dry-run" | "-n" => dry_run = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) if !dir.starts_with('-') => config_dir = Some(dir),
                    _ => {
                        log_warning!("Missing directory for --config. Usage: --config <dir>");
                        return Self::error();
                    }
                },
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    log_warning!("Unknown argument: {}", flag);
                    return Self::error();
                }
                _ => positional.push(arg),
            }
        }

        // Version takes precedence over help, help over everything else
        if display_version {
            return Self::with(CliAction::ShowVersion);
        }
        if display_help {
            return Self::with(CliAction::ShowHelp);
        }

        let Some((command, rest)) = positional.split_first() else {
            return Self::with(CliAction::Run {
                debug_enabled,
                config_dir,
                dry_run,
            });
        };

        let action = match (command.as_str(), rest) {
            ("run", []) => CliAction::Run {
                debug_enabled,
                config_dir,
                dry_run,
            },
            ("schedule" | "s", []) => CliAction::ScheduleCommand {
                debug_enabled,
                config_dir,
            },
            ("fire" | "f", [event_name]) => CliAction::FireCommand {
                debug_enabled,
                config_dir,
                dry_run,
                event_name: event_name.clone(),
            },
            ("fire" | "f", _) => {
                log_warning!("Usage: dawnlight fire <event>");
                return Self::error();
            }
            ("simulate", [start_time, end_time]) => CliAction::SimulateCommand {
                debug_enabled,
                config_dir,
                start_time: start_time.clone(),
                end_time: end_time.clone(),
            },
            ("simulate", _) => {
                log_warning!(
                    "Usage: dawnlight simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\""
                );
                return Self::error();
            }
            ("help", []) => CliAction::HelpCommand { command: None },
            ("help", [topic]) => CliAction::HelpCommand {
                command: Some(topic.clone()),
            },
            ("run" | "schedule" | "s" | "help", [extra, ..]) => {
                log_warning!("Unexpected argument for '{}': {}", command, extra);
                return Self::error();
            }
            (unknown, _) => {
                log_warning!("Unknown command: {}", unknown);
                return Self::error();
            }
        };

        Self::with(action)
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }

    fn with(action: CliAction) -> ParsedArgs {
        ParsedArgs { action }
    }

    fn error() -> ParsedArgs {
        Self::with(CliAction::ShowHelpDueToError)
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::common::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("dawnlight [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-n, --dry-run          Log device calls instead of sending them");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Run the scheduler (default)");
    log_indented!("schedule, s            Print the upcoming schedule and exit");
    log_indented!("fire, f <event>        Run one event's action now");
    log_indented!("simulate <start> <end> Fast-forward the scheduler between two times");
    log_indented!("help [command]         Show help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        crate::common::logger::Log::set_enabled(false);
        ParsedArgs::parse(args.iter()).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(&["dawnlight"]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                dry_run: false,
            }
        );
    }

    #[test]
    fn test_parse_run_flags_in_any_order() {
        let expected = CliAction::Run {
            debug_enabled: true,
            config_dir: Some("/etc/dawnlight".to_string()),
            dry_run: true,
        };
        assert_eq!(
            parse(&["dawnlight", "-d", "--config", "/etc/dawnlight", "-n"]),
            expected
        );
        assert_eq!(
            parse(&["dawnlight", "run", "--dry-run", "-c", "/etc/dawnlight", "--debug"]),
            expected
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(&["dawnlight", "--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["dawnlight", "-h", "schedule"]), CliAction::ShowHelp);
        assert_eq!(parse(&["dawnlight", "-V"]), CliAction::ShowVersion);
        // Version takes precedence
        assert_eq!(parse(&["dawnlight", "-h", "--version"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(
            parse(&["dawnlight", "s", "-d"]),
            CliAction::ScheduleCommand {
                debug_enabled: true,
                config_dir: None,
            }
        );
    }

    #[test]
    fn test_parse_fire() {
        assert_eq!(
            parse(&["dawnlight", "fire", "morning-off", "-n"]),
            CliAction::FireCommand {
                debug_enabled: false,
                config_dir: None,
                dry_run: true,
                event_name: "morning-off".to_string(),
            }
        );
        assert_eq!(parse(&["dawnlight", "fire"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["dawnlight", "fire", "a", "b"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            parse(&[
                "dawnlight",
                "simulate",
                "2026-06-01 08:00:00",
                "2026-06-02 08:00:00"
            ]),
            CliAction::SimulateCommand {
                debug_enabled: false,
                config_dir: None,
                start_time: "2026-06-01 08:00:00".to_string(),
                end_time: "2026-06-02 08:00:00".to_string(),
            }
        );
        assert_eq!(
            parse(&["dawnlight", "simulate", "2026-06-01 08:00:00"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(
            parse(&["dawnlight", "help"]),
            CliAction::HelpCommand { command: None }
        );
        assert_eq!(
            parse(&["dawnlight", "help", "fire"]),
            CliAction::HelpCommand {
                command: Some("fire".to_string())
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(&["dawnlight", "--bogus"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["dawnlight", "explode"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["dawnlight", "run", "now"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["dawnlight", "--config"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["dawnlight", "-c", "--debug"]),
            CliAction::ShowHelpDueToError
        );
    }
}
