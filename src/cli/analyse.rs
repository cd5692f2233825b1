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

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::error;

use super::main::{AnalyseSubcommand, HopSubcommand};
use super::report::{self, Totals};
use crate::support::sysexits::*;
use crate::trail::{Analyser, DateParser, TimestringExtractor};

pub(super) fn analyse(
    analyser: &Analyser,
    cmd: AnalyseSubcommand,
    inputs: Vec<PathBuf>,
) {
    let stdout = io::stdout();
    match run_analysis(
        analyser,
        &cmd,
        inputs.into_iter(),
        io::stdin().lock(),
        &mut stdout.lock(),
    ) {
        Ok(totals) if totals.unreadable > 0 => EX_NOINPUT.exit(),
        Ok(_) => (),
        Err(e) => e.exit(),
    }
}

pub(super) fn hop(analyser: &Analyser, cmd: HopSubcommand) {
    let stdout = io::stdout();
    if let Err(e) =
        report::write_hop_details(&mut stdout.lock(), analyser, &cmd.header)
    {
        die!(EX_IOERR, "Error writing output: {}", e);
    }
}

fn run_analysis<D: DateParser, T: TimestringExtractor>(
    analyser: &Analyser<D, T>,
    cmd: &AnalyseSubcommand,
    items: impl Iterator<Item = PathBuf>,
    mut stdin: impl Read,
    out: &mut impl Write,
) -> Result<Totals, Sysexit> {
    let mut label_log = open_error_log(cmd.label_errors.as_deref())?;
    let mut delay_log = open_error_log(cmd.delay_errors.as_deref())?;
    let mut totals = Totals::default();

    for item in items {
        let raw = match read_input(&item, &mut stdin) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Unable to read {}: {}", item.display(), e);
                totals.unreadable += 1;
                continue;
            },
        };

        let trail = match analyser.analyse_headers(Some(&raw)) {
            Ok(trail) => trail,
            Err(e) => {
                error!("Unable to analyse {}: {}", item.display(), e);
                totals.unreadable += 1;
                continue;
            },
        };

        totals.label_errors += trail.label_error_count();
        totals.delay_errors += trail.delay_error_count();

        if let Some((ref path, ref mut log)) = label_log {
            for header in trail.label_errors() {
                report::write_label_error(log, header)
                    .map_err(|e| write_failed(path, e))?;
            }
        }

        if let Some((ref path, ref mut log)) = delay_log {
            for pair in trail.delay_errors() {
                report::write_delay_error(log, pair)
                    .map_err(|e| write_failed(path, e))?;
            }
        }

        report::write_trail(
            out,
            &item.display().to_string(),
            &trail,
            cmd.format,
        )
        .map_err(|e| write_failed(Path::new("standard output"), e))?;
    }

    report::write_totals(out, &totals, cmd.format)
        .map_err(|e| write_failed(Path::new("standard output"), e))?;
    Ok(totals)
}

fn read_input(item: &Path, stdin: &mut impl Read) -> io::Result<String> {
    let mut data = Vec::new();
    if Path::new("-") == item {
        stdin.read_to_end(&mut data)?;
    } else {
        fs::File::open(item)?.read_to_end(&mut data)?;
    }

    // Mail is frequently not valid UTF-8, but the parts we care about are
    // ASCII or encoded words.
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn open_error_log(
    path: Option<&Path>,
) -> Result<Option<(PathBuf, fs::File)>, Sysexit> {
    let path = match path {
        Some(path) => path,
        None => return Ok(None),
    };

    match fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Ok(Some((path.to_owned(), file))),
        Err(e) => {
            error!("Unable to open {}: {}", path.display(), e);
            Err(EX_CANTCREAT)
        },
    }
}

fn write_failed(path: &Path, e: io::Error) -> Sysexit {
    error!("Error writing to {}: {}", path.display(), e);
    EX_IOERR
}
