//-
// Copyright (c) 2024, Jason Lingle
//
// This file is part of Emailtrail.
//
// Emailtrail is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Emailtrail is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Emailtrail. If not, see <http://www.gnu.org/licenses/>.

use std::mem;
use std::path::PathBuf;

use structopt::StructOpt;

use super::report::ReportFormat;
use crate::support::config::AnalysisConfig;
use crate::support::sysexits::*;
use crate::trail::Analyser;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
struct Options {
    #[structopt(flatten)]
    common: CommonOptions,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Default)]
pub(super) struct CommonOptions {
    /// Read analysis settings from this TOML file.
    #[structopt(long, parse(from_os_str))]
    pub(super) config: Option<PathBuf>,

    /// Configure logging with this log4rs TOML file instead of logging to
    /// standard error.
    #[structopt(long, parse(from_os_str))]
    pub(super) log_config: Option<PathBuf>,

    /// Log more detail to standard error. Can be passed multiple times.
    #[structopt(short, long, parse(from_occurrences))]
    pub(super) verbose: u64,
}

#[derive(StructOpt)]
enum Command {
    Analyse(AnalyseSubcommand),
    Hop(HopSubcommand),
}

/// Reconstruct the relay path of one or more messages.
///
/// Each input is a complete message or just its header block. For each
/// input, the sender and recipients are printed along with every relay the
/// message passed through, oldest first, and the time it spent getting
/// there.
///
/// Trace headers which could not be understood can be collected for later
/// study with --label-errors and --delay-errors. Both files are appended to,
/// not replaced.
///
/// The counts of unreadable inputs, delay errors and label errors over all
/// inputs are printed at the end. If any input could not be read, the exit
/// status is 66 (EX_NOINPUT).
#[derive(StructOpt)]
pub(super) struct AnalyseSubcommand {
    /// The output format, either "text" or "toml".
    #[structopt(long, default_value = "text")]
    pub(super) format: ReportFormat,

    /// Append every trace header whose hosts could not be extracted to this
    /// file.
    #[structopt(long, parse(from_os_str))]
    pub(super) label_errors: Option<PathBuf>,

    /// Append every pair of trace headers between which no delay could be
    /// determined to this file.
    #[structopt(long, parse(from_os_str))]
    pub(super) delay_errors: Option<PathBuf>,

    /// The messages to analyse. "-" will read from stdin.
    #[structopt(parse(from_os_str), default_value = "-")]
    pub(super) inputs: Vec<PathBuf>,
}

/// Show how a single trace header is interpreted.
///
/// Literal "\n" and "\t" escapes in the header are treated as line breaks
/// and tabs.
#[derive(StructOpt)]
pub(super) struct HopSubcommand {
    /// The value of the trace header, without the `Received:` prefix.
    pub(super) header: String,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let options = Options::from_clap(&match Options::clap().get_matches_safe()
    {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    init_logging(&options.common);
    let analyser = Analyser::new(load_config(&options.common));

    match options.cmd {
        Command::Analyse(mut cmd) => {
            let inputs = mem::take(&mut cmd.inputs);
            super::analyse::analyse(&analyser, cmd, inputs)
        },
        Command::Hop(cmd) => super::analyse::hop(&analyser, cmd),
    }
}

fn init_logging(common: &CommonOptions) {
    if let Some(ref log_config_file) = common.log_config {
        if let Err(e) =
            log4rs::init_file(log_config_file, log_deserializers())
        {
            die!(
                EX_CONFIG,
                "Error in logging configuration at '{}': {}",
                log_config_file.display(),
                e
            );
        }
    } else {
        crate::init_simple_log(match common.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }
}

fn log_deserializers() -> log4rs::file::Deserializers {
    log4rs::file::Deserializers::default()
}

fn load_config(common: &CommonOptions) -> AnalysisConfig {
    match common.config {
        None => AnalysisConfig::default(),
        Some(ref path) => match AnalysisConfig::load(path) {
            Ok(config) => config,
            Err(e) => die!(
                EX_CONFIG,
                "Error in config file at '{}': {}",
                path.display(),
                e
            ),
        },
    }
}
