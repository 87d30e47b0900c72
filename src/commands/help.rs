//! Help command implementation for dawnlight.
//!
//! This module provides a dispatcher for the help command that shows
//! command-specific help or general help based on the arguments provided.

use anyhow::Result;

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "run" => log_block_start!("Usage: dawnlight [OPTIONS] run"),
        "schedule" | "s" => log_block_start!("Usage: dawnlight [OPTIONS] schedule"),
        "fire" | "f" => log_block_start!("Usage: dawnlight [OPTIONS] fire <event>"),
        "simulate" => log_block_start!(
            "Usage: dawnlight [OPTIONS] simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\""
        ),
        _ => log_block_start!("Usage: dawnlight [OPTIONS] [COMMAND]"),
    }
}

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("run") => display_run_help(),
        Some("schedule") | Some("s") => display_schedule_help(),
        Some("fire") | Some("f") => display_fire_help(),
        Some("simulate") => display_simulate_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_version!();
            log_warning!("Unknown command: {}", unknown);
            display_command_list();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    display_command_list();
}

fn display_command_list() {
    log_block_start!("Available Commands:");
    log_indented!("run                     Run the scheduler (default)");
    log_indented!("schedule, s             Print the upcoming schedule and exit");
    log_indented!("fire, f <event>         Run one event's action now");
    log_indented!("simulate <start> <end>  Fast-forward the scheduler between two times");
    log_indented!("help [COMMAND]          Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'dawnlight help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'dawnlight --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Run the scheduler");
    show_command_usage("run");
    log_block_start!("Description:");
    log_indented!("Rebuilds the day's schedule, fires events that are due, and");
    log_indented!("sleeps until the next one. Events missed by more than the");
    log_indented!("grace window are skipped until the next day.");
    log_block_start!("Signals:");
    log_indented!("SIGHUP, SIGUSR2   Reload the configuration file");
    log_indented!("SIGINT, SIGTERM   Shut down");
    log_block_start!("Examples:");
    log_indented!("dawnlight");
    log_indented!("dawnlight --dry-run --debug run");
    log_end!();
}

fn display_schedule_help() {
    log_version!();
    log_block_start!("schedule - Print the upcoming schedule");
    show_command_usage("schedule");
    log_block_start!("Description:");
    log_indented!("Shows every pending event as the scheduler would see it now,");
    log_indented!("without touching the light. Nothing counts as fired yet.");
    log_block_start!("Examples:");
    log_indented!("dawnlight schedule");
    log_indented!("dawnlight -c ~/.config/dawnlight-test s");
    log_end!();
}

fn display_fire_help() {
    log_version!();
    log_block_start!("fire - Run one event's action now");
    show_command_usage("fire");
    log_block_start!("Arguments:");
    log_indented!("event  Name of an event in the catalog");
    log_block_start!("Description:");
    log_indented!("Sends the event's action to the light immediately, ignoring");
    log_indented!("its trigger time. Useful for checking device settings.");
    log_block_start!("Examples:");
    log_indented!("dawnlight fire morning-off");
    log_indented!("dawnlight fire sunrise-fade-in --dry-run");
    log_end!();
}

fn display_simulate_help() {
    log_version!();
    log_block_start!("simulate - Fast-forward the scheduler");
    show_command_usage("simulate");
    log_block_start!("Arguments:");
    log_indented!("start  First simulated instant, in the schedule timezone");
    log_indented!("end    Last simulated instant, after start");
    log_block_start!("Description:");
    log_indented!("Runs the scheduler loop against a simulated clock that jumps");
    log_indented!("ahead on every sleep. Device calls are logged, not sent.");
    log_block_start!("Examples:");
    log_indented!("dawnlight simulate \"2026-06-01 00:00:00\" \"2026-06-03 00:00:00\"");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: dawnlight help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("# Show general help");
    log_indented!("dawnlight help");
    log_pipe!();
    log_indented!("# Show help for specific commands");
    log_indented!("dawnlight help fire");
    log_indented!("dawnlight help simulate");
    log_end!();
}
