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

//! Locating the date/time within a trace header.

use lazy_static::lazy_static;
use regex::Regex;

use super::text::{cleanup_text, remove_details};

lazy_static! {
    static ref RX_ID: Regex = Regex::new(r"\s+id\s+[^\s]*\s+").unwrap();
    static ref RX_TIMEZONE_NAME: Regex = Regex::new(
        r"^(.*[+-][0-9]{4}) (?:\([a-zA-Z]{3,4}\)|[a-zA-Z]{3,4})$"
    )
    .unwrap();
}

/// Find the part of `header` that is most likely to be its date.
///
/// Most agents put the date after the final `;`. Failing that, it is taken
/// to be the last line, and failing that, whatever follows `id <token>`. If
/// none of these apply, there is no candidate.
///
/// The candidate is normalised for parsing: comments are removed, a
/// redundant zone name after a numeric offset is dropped, and `-0000` (which
/// means "zone unknown", not "behind UTC") becomes `+0000`.
pub fn extract_timestring(header: &str) -> Option<String> {
    let header = cleanup_text(header);

    let candidate = if let Some(semi) = header.rfind(';') {
        &header[semi + 1..]
    } else if let Some(lf) = header.rfind('\n') {
        &header[lf + 1..]
    } else {
        let id = RX_ID.find_iter(&header).last()?;
        &header[id.end()..]
    };

    let candidate = cleanup_text(candidate);
    let candidate = remove_details(&candidate);
    let candidate = strip_timezone_name(candidate.trim());
    Some(candidate.replace("-0000", "+0000"))
}

/// Remove a zone name following a numeric offset at the end of `timestring`,
/// e.g. `"-0800 (PST)"` → `"-0800"` or `"-0800 PST"` → `"-0800"`.
///
/// Anything else is returned unchanged.
pub fn strip_timezone_name(timestring: &str) -> &str {
    match RX_TIMEZONE_NAME.captures(timestring) {
        Some(captures) => captures.get(1).map_or(timestring, |m| m.as_str()),
        None => timestring,
    }
}
