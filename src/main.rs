// Copyright (c) 2026 rezky_nightky

mod app;
mod cell;
mod charset;
mod config;
mod frame;
mod geometry;
mod logging;
mod palette;
mod rain;
mod runtime;
mod scheduler;
mod surface;
mod terminal;

use std::io;

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor, Color, Effects, Style};
use clap::builder::Styles;
use clap::{Command, CommandFactory, FromArgMatches};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, lang_is_ascii_only, print_bitcolor_check, print_list_charsets,
    print_list_colors, usage_for_help, Args, RunConfig,
};
use crate::logging::init_file_logging;
use crate::terminal::restore_terminal_best_effort;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn help_styles() -> Styles {
    let ansi = |c: AnsiColor| Some(Color::Ansi(c));
    Styles::styled()
        .header(Style::new().effects(Effects::BOLD).fg_color(ansi(AnsiColor::Cyan)))
        .usage(Style::new().effects(Effects::BOLD).fg_color(ansi(AnsiColor::Green)))
        .literal(Style::new().fg_color(ansi(AnsiColor::Yellow)))
        .placeholder(Style::new().fg_color(ansi(AnsiColor::Magenta)))
}

fn build_command() -> Command {
    let template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    let mut cmd = Args::command()
        .styles(help_styles())
        .before_help(usage_for_help())
        .help_template(template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd
}

/// Leaves the alternate screen before the process dies from a panic or a signal.
fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn print_info() {
    println!("Version: v{}", env!("CARGO_PKG_VERSION"));
    println!("Build: {}", env!("GLYPHRAIN_BUILD"));
    let sha = env!("GLYPHRAIN_GIT_SHA");
    if !sha.is_empty() {
        println!("Commit: {}", sha);
    }
    println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
}

fn main() -> io::Result<()> {
    install_exit_handlers();

    let matches = build_command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }
    if args.list_colors {
        print_list_colors();
        return Ok(());
    }
    if args.check_bitcolor {
        if let Err(e) = print_bitcolor_check(args.colormode) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.info {
        print_info();
        return Ok(());
    }

    if let Some(path) = &args.log_file {
        if let Err(e) = init_file_logging(path) {
            eprintln!("failed to open log file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    let cfg = RunConfig::from_args(&args, lang_is_ascii_only()).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    app::run(cfg)
}
