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

//! Reconstruction of a message's relay path from its trace headers.
//!
//! Each `Received` header is reduced to a [`Hop`] by a handful of layered
//! heuristics (see [`label`] and [`timestring`]); consecutive hops are then
//! compared to find how long the message sat at each relay.
//!
//! Relays prepend their trace header, so headers are supplied newest first,
//! the order they appear in the message. The resulting [`Trail`] lists hops
//! oldest first.
//!
//! How dates are found and parsed can be replaced via the
//! [`TimestringExtractor`] and [`DateParser`] traits, which are implemented
//! for plain closures.

use chrono::prelude::*;

use crate::mime::datetime::parse_free_text_date;
use crate::support::error::Error;

mod analyser;
pub mod delay;
pub mod label;
mod model;
pub mod text;
pub mod timestring;

pub use self::analyser::Analyser;
pub use self::model::{DelayError, Hop, Trail};

/// Turns the date portion of a trace header into an instant.
pub trait DateParser {
    /// Parse `text`, returning `None` if it is not a recognisable date.
    fn parse_date(&self, text: &str) -> Option<DateTime<FixedOffset>>;
}

impl<F: Fn(&str) -> Option<DateTime<FixedOffset>>> DateParser for F {
    fn parse_date(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        self(text)
    }
}

/// The default `DateParser`, accepting the date formats mail agents
/// actually put in trace headers.
///
/// See [`parse_free_text_date`] for the formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreeTextDateParser;

impl DateParser for FreeTextDateParser {
    fn parse_date(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        parse_free_text_date(text)
    }
}

/// Locates the date portion of a trace header.
pub trait TimestringExtractor {
    fn extract_timestring(&self, header: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> TimestringExtractor for F {
    fn extract_timestring(&self, header: &str) -> Option<String> {
        self(header)
    }
}

/// The default `TimestringExtractor`, which is
/// [`timestring::extract_timestring`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeuristicTimestringExtractor;

impl TimestringExtractor for HeuristicTimestringExtractor {
    fn extract_timestring(&self, header: &str) -> Option<String> {
        timestring::extract_timestring(header)
    }
}

/// Analyse the message (or message header block) `raw` with the default
/// configuration.
///
/// Fails only if `raw` is `None`.
pub fn analyse(raw: Option<&str>) -> Result<Trail, Error> {
    <Analyser>::default().analyse_headers(raw)
}

/// Reduce a single trace header to a `Hop` with the default configuration.
///
/// The result has no delay information.
pub fn analyse_hop(header: &str) -> Hop {
    <Analyser>::default().analyse_hop(header)
}

/// Analyse a newest-first sequence of trace headers with the default
/// configuration, returning the hops oldest first.
pub fn analyse_hops<S: AsRef<str>>(headers: &[S]) -> Vec<Hop> {
    <Analyser>::default().analyse_hops(headers)
}
