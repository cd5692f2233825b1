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

use log::debug;

use super::delay::calculate_delay;
use super::label::extract_labels;
use super::model::{DelayError, Hop, Trail};
use super::{
    DateParser, FreeTextDateParser, HeuristicTimestringExtractor,
    TimestringExtractor,
};
use crate::mime::encoded_word::decode_display_header;
use crate::mime::header::HeaderBlock;
use crate::support::config::AnalysisConfig;
use crate::support::error::Error;

/// Performs trail analysis with a particular configuration and date
/// handling strategy.
///
/// An `Analyser` holds no mutable state and may be shared freely, including
/// across threads if its strategies permit.
#[derive(Clone, Debug, Default)]
pub struct Analyser<
    D = FreeTextDateParser,
    T = HeuristicTimestringExtractor,
> {
    config: AnalysisConfig,
    date_parser: D,
    timestring_extractor: T,
}

impl Analyser {
    /// Create an analyser with the default strategies and the given
    /// configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Analyser {
            config,
            date_parser: FreeTextDateParser,
            timestring_extractor: HeuristicTimestringExtractor,
        }
    }
}

impl<D, T> Analyser<D, T> {
    /// Replace the date parser.
    pub fn with_date_parser<D2: DateParser>(
        self,
        date_parser: D2,
    ) -> Analyser<D2, T> {
        Analyser {
            config: self.config,
            date_parser,
            timestring_extractor: self.timestring_extractor,
        }
    }

    /// Replace the timestring extractor.
    pub fn with_timestring_extractor<T2: TimestringExtractor>(
        self,
        timestring_extractor: T2,
    ) -> Analyser<D, T2> {
        Analyser {
            config: self.config,
            date_parser: self.date_parser,
            timestring_extractor,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl<D: DateParser, T: TimestringExtractor> Analyser<D, T> {
    /// Return the part of `header` the configured extractor takes to be its
    /// date.
    pub fn timestring(&self, header: &str) -> Option<String> {
        self.timestring_extractor.extract_timestring(header)
    }

    /// Determine when the relay that wrote `header` received the message, in
    /// seconds since the UNIX epoch.
    pub fn timestamp(&self, header: &str) -> Option<i64> {
        let timestring = self.timestring(header)?;
        let datetime = self.date_parser.parse_date(&timestring);
        if datetime.is_none() {
            debug!("Unparsable date in trace header: {:?}", timestring);
        }
        datetime.map(|dt| dt.timestamp())
    }

    /// Reduce a single trace header to a `Hop`.
    ///
    /// The returned hop has a delay of 0 and no delay error, since those
    /// depend on the neighbouring header.
    pub fn analyse_hop(&self, header: &str) -> Hop {
        let timestamp = self.timestamp(header);
        match extract_labels(header) {
            Ok(labels) => Hop {
                from_host: labels.from_host,
                received_by_host: labels.received_by_host,
                protocol: labels.protocol,
                timestamp,
                ..Hop::default()
            },
            Err(e) => {
                debug!("{}: {:?}", e, header);
                Hop {
                    timestamp,
                    label_error: Some(header.to_owned()),
                    ..Hop::default()
                }
            },
        }
    }

    /// Compute the delay in seconds between two consecutive trace headers.
    ///
    /// `current` is the later header (the one nearer the top of the
    /// message), `previous` the one written by the relay before it. Returns
    /// `None` if either has no usable date.
    pub fn path_delay(&self, current: &str, previous: &str) -> Option<u64> {
        calculate_delay(self.timestamp(current), self.timestamp(previous))
    }

    /// Analyse a sequence of trace headers given newest first, returning the
    /// hops oldest first.
    ///
    /// Each hop's delay is measured from the hop before it; the oldest hop
    /// has a delay of 0.
    pub fn analyse_hops<S: AsRef<str>>(&self, headers: &[S]) -> Vec<Hop> {
        let mut hops = headers
            .iter()
            .map(|header| self.analyse_hop(header.as_ref()))
            .collect::<Vec<_>>();

        for (ix, pair) in headers.windows(2).enumerate() {
            let (current, previous) = (pair[0].as_ref(), pair[1].as_ref());
            match calculate_delay(hops[ix].timestamp, hops[ix + 1].timestamp) {
                Some(delay) => hops[ix].delay = delay,
                None => {
                    debug!(
                        "Can't determine delay between {:?} and {:?}",
                        current, previous
                    );
                    hops[ix].delay_error = Some(DelayError {
                        current: current.to_owned(),
                        previous: previous.to_owned(),
                    });
                },
            }
        }

        hops.into_iter().rev().collect()
    }

    /// Analyse a whole message, or just its header block.
    ///
    /// The only failure is having no input at all. A message without any
    /// trace headers produces a trail with no hops.
    pub fn analyse_headers(&self, raw: Option<&str>) -> Result<Trail, Error> {
        let raw = raw.ok_or(Error::MissingInput)?;
        let block = HeaderBlock::parse(raw.trim());
        let trace = block.get_all_of(&self.config.trace_headers);
        if trace.is_empty() {
            debug!("No trace headers found");
        }

        Ok(Trail {
            from_address: decode_display_header(block.get("From")),
            to_address: decode_display_header(block.get("To")),
            cc: decode_display_header(block.get("Cc")),
            bcc: decode_display_header(block.get("Bcc")),
            hops: self.analyse_hops(&trace),
        })
    }
}
