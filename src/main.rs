//! Main application entry point and command dispatch.
//!
//! Parses the command line, applies the global `--config` directory, and hands
//! control to the matching command or to the [`Dawnlight`] scheduler. Errors are
//! reported once, with their full context chain, before exiting non-zero.

use anyhow::Result;

use dawnlight::{
    Dawnlight,
    args::{self, CliAction, ParsedArgs},
    commands,
    common::constants::EXIT_FAILURE,
    config,
};

fn main() {
    if let Err(e) = run() {
        dawnlight::log_pipe!();
        dawnlight::log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn run() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
            dry_run,
        } => {
            config::set_config_dir(config_dir)?;
            let runner = Dawnlight::new(debug_enabled);
            if dry_run {
                runner.dry_run().run()
            } else {
                runner.run()
            }
        }
        CliAction::ScheduleCommand {
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            commands::schedule::handle_schedule_command(debug_enabled)
        }
        CliAction::FireCommand {
            debug_enabled,
            config_dir,
            dry_run,
            event_name,
        } => {
            config::set_config_dir(config_dir)?;
            commands::fire::handle_fire_command(&event_name, dry_run, debug_enabled)
        }
        CliAction::SimulateCommand {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
        } => {
            config::set_config_dir(config_dir)?;
            commands::simulate::handle_simulate_command(&start_time, &end_time, debug_enabled)
        }
    }
}
