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

//! Rendering of analysis results for the command line.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use chrono::prelude::*;
use serde::Serialize;

use crate::trail::label::extract_labels;
use crate::trail::{
    Analyser, DateParser, DelayError, Hop, TimestringExtractor, Trail,
};

/// Written between entries in the label and delay error files.
pub(super) const ERROR_SEPARATOR: &str =
    "\n\n\n---------------------------------------------\n\n\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ReportFormat {
    Text,
    Toml,
}

#[derive(Debug)]
pub(super) struct UnknownFormat(String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown format '{}'; expected 'text' or 'toml'", self.0)
    }
}

impl FromStr for ReportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, UnknownFormat> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "toml" => Ok(ReportFormat::Toml),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

/// Running totals over all inputs of one `analyse` invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(super) struct Totals {
    pub(super) unreadable: usize,
    pub(super) delay_errors: usize,
    pub(super) label_errors: usize,
}

#[derive(Serialize)]
struct TrailReport<'a> {
    source: &'a str,
    from_address: &'a str,
    to_address: &'a str,
    cc: &'a str,
    bcc: &'a str,
    total_delay: u64,
    label_error_count: usize,
    delay_error_count: usize,
    hops: &'a [Hop],
}

// Each report is its own `[[trail]]` element, so that the output for
// several inputs concatenates into one valid document.
#[derive(Serialize)]
struct TrailDocument<'a> {
    trail: &'a [TrailReport<'a>],
}

#[derive(Serialize)]
struct TotalsDocument {
    totals: Totals,
}

fn toml_error(e: toml::ser::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

fn format_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .map_or_else(|| "unknown time".to_owned(), |dt| dt.to_rfc2822())
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() {
        "?"
    } else {
        s
    }
}

/// Write the trail of the message from `source`.
pub(super) fn write_trail(
    out: &mut impl Write,
    source: &str,
    trail: &Trail,
    format: ReportFormat,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => write_trail_text(out, source, trail),
        ReportFormat::Toml => {
            let report = TrailReport {
                source,
                from_address: &trail.from_address,
                to_address: &trail.to_address,
                cc: &trail.cc,
                bcc: &trail.bcc,
                total_delay: trail.total_delay(),
                label_error_count: trail.label_error_count(),
                delay_error_count: trail.delay_error_count(),
                hops: &trail.hops,
            };
            let doc = toml::to_string(&TrailDocument {
                trail: std::slice::from_ref(&report),
            })
            .map_err(toml_error)?;
            writeln!(out, "{}", doc)
        },
    }
}

fn write_trail_text(
    out: &mut impl Write,
    source: &str,
    trail: &Trail,
) -> io::Result<()> {
    writeln!(out, "==> {} <==", source)?;
    writeln!(out, "From: {}", trail.from_address)?;
    writeln!(out, "To: {}", trail.to_address)?;
    writeln!(out, "Cc: {}", trail.cc)?;
    writeln!(out, "Bcc: {}", trail.bcc)?;
    writeln!(out, "Total delay: {}s", trail.total_delay())?;

    for (ix, hop) in trail.hops.iter().enumerate() {
        write!(
            out,
            "{:3}. {} -> {}",
            ix + 1,
            or_unknown(&hop.from_host),
            or_unknown(&hop.received_by_host),
        )?;
        if !hop.protocol.is_empty() {
            write!(out, " with {}", hop.protocol)?;
        }
        write!(out, " at {}", format_timestamp(hop.timestamp))?;
        if hop.delay_error.is_some() {
            writeln!(out, " (delay unknown)")?;
        } else {
            writeln!(out, " (+{}s)", hop.delay)?;
        }

        if hop.label_error.is_some() {
            writeln!(out, "     hosts not recognised")?;
        }
    }

    writeln!(out)
}

/// Write the totals at the end of an `analyse` run.
pub(super) fn write_totals(
    out: &mut impl Write,
    totals: &Totals,
    format: ReportFormat,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => {
            writeln!(out, "Unreadable inputs: {}", totals.unreadable)?;
            writeln!(out, "Delay errors: {}", totals.delay_errors)?;
            writeln!(out, "Label errors: {}", totals.label_errors)
        },
        ReportFormat::Toml => {
            let doc = toml::to_string(&TotalsDocument { totals: *totals })
                .map_err(toml_error)?;
            write!(out, "{}", doc)
        },
    }
}

/// Append a header whose labels could not be extracted to an error log.
pub(super) fn write_label_error(
    out: &mut impl Write,
    header: &str,
) -> io::Result<()> {
    write!(out, "{}{}", header, ERROR_SEPARATOR)
}

/// Append a header pair whose delay could not be determined to an error log.
pub(super) fn write_delay_error(
    out: &mut impl Write,
    error: &DelayError,
) -> io::Result<()> {
    write!(
        out,
        "{}\n{}{}",
        error.current, error.previous, ERROR_SEPARATOR
    )
}

/// Write everything `analyser` makes of the single trace header `header`.
pub(super) fn write_hop_details<D: DateParser, T: TimestringExtractor>(
    out: &mut impl Write,
    analyser: &Analyser<D, T>,
    header: &str,
) -> io::Result<()> {
    match extract_labels(header) {
        Ok(labels) => {
            writeln!(out, "From: {}", labels.from_host)?;
            writeln!(out, "By: {}", labels.received_by_host)?;
            writeln!(out, "Protocol: {}", labels.protocol)?;
        },
        Err(e) => writeln!(out, "Labels: {}", e)?,
    }

    match analyser.timestring(header) {
        Some(timestring) => writeln!(out, "Date: {}", timestring)?,
        None => writeln!(out, "Date: not found")?,
    }

    match analyser.timestamp(header) {
        Some(timestamp) => writeln!(
            out,
            "Timestamp: {} ({})",
            timestamp,
            format_timestamp(Some(timestamp))
        ),
        None => writeln!(out, "Timestamp: unknown"),
    }
}
