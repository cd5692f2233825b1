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

//! A forgiving parser for the date/time strings found in mail headers.
//!
//! Relays are far from consistent about how they write dates, so beyond the
//! RFC 2822 `date-time` syntax (with its obsolete forms) this also accepts the
//! ISO-8601-ish form some filters emit and the asctime form of older agents.

use chrono::prelude::*;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1, take_while_m_n},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

/// The fields of a date/time before validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DateParts {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    /// Seconds east of UTC.
    offset: i32,
}

impl DateParts {
    fn into_datetime(self) -> Option<DateTime<FixedOffset>> {
        let naive = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_nano_opt(self.hour, self.minute, self.second, self.nanos)?;
        FixedOffset::east_opt(self.offset)?
            .from_local_datetime(&naive)
            .single()
    }
}

/// Parse `text` as a date/time.
///
/// Surrounding whitespace is ignored, but any other unrecognised text causes
/// the whole string to be rejected. When no zone is given, UTC is assumed.
pub fn parse_free_text_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let (_, parts) = all_consuming(delimited(
        multispace0,
        alt((rfc2822, iso8601, asctime)),
        multispace0,
    ))(text)
    .ok()?;
    parts.into_datetime()
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn number<'a>(
    min: usize,
    max: usize,
) -> impl Fn(&'a str) -> IResult<&'a str, u32> {
    map_res(take_while_m_n(min, max, is_digit), |s: &'a str| {
        s.parse::<u32>()
    })
}

// RFC 2822 3.3 year, including the 4.3 two- and three-digit obsolete forms.
fn year(i: &str) -> IResult<&str, i32> {
    map_res(take_while_m_n(2, 4, is_digit), |s: &str| {
        s.parse::<i32>().map(|y| {
            // Y2K compliance workarounds described by RFC 2822 4.3
            if s.len() == 2 && y < 50 {
                y + 2000
            } else if s.len() < 4 {
                y + 1900
            } else {
                y
            }
        })
    })(i)
}

fn month_abbrev(i: &str) -> IResult<&str, u32> {
    alt((
        map(tag_no_case("jan"), |_| 1),
        map(tag_no_case("feb"), |_| 2),
        map(tag_no_case("mar"), |_| 3),
        map(tag_no_case("apr"), |_| 4),
        map(tag_no_case("may"), |_| 5),
        map(tag_no_case("jun"), |_| 6),
        map(tag_no_case("jul"), |_| 7),
        map(tag_no_case("aug"), |_| 8),
        map(tag_no_case("sep"), |_| 9),
        map(tag_no_case("oct"), |_| 10),
        map(tag_no_case("nov"), |_| 11),
        map(tag_no_case("dec"), |_| 12),
    ))(i)
}

// Accepts both "Dec" and "December".
fn month(i: &str) -> IResult<&str, u32> {
    terminated(month_abbrev, take_while(is_alpha))(i)
}

// We don't care what day of the week it was, and it is frequently wrong.
fn day_name(i: &str) -> IResult<&str, &str> {
    terminated(take_while1(is_alpha), tuple((opt(char(',')), multispace0)))(
        i,
    )
}

fn fraction_nanos(digits: &str) -> u32 {
    let mut nanos = 0;
    let mut scale = 100_000_000;
    for digit in digits.chars().take(9) {
        nanos += digit.to_digit(10).unwrap_or(0) * scale;
        scale /= 10;
    }
    nanos
}

/// `(hour, minute, second, nanos)`
fn time_of_day(i: &str) -> IResult<&str, (u32, u32, u32, u32)> {
    map(
        tuple((
            number(1, 2),
            preceded(char(':'), number(2, 2)),
            opt(preceded(char(':'), number(2, 2))),
            opt(preceded(
                alt((char('.'), char(','))),
                take_while1(is_digit),
            )),
        )),
        |(hour, minute, second, fraction)| {
            (
                hour,
                minute,
                second.unwrap_or(0),
                fraction.map(fraction_nanos).unwrap_or(0),
            )
        },
    )(i)
}

fn numeric_zone(i: &str) -> IResult<&str, i32> {
    map(
        tuple((
            alt((char('+'), char('-'))),
            number(2, 2),
            opt(char(':')),
            number(2, 2),
        )),
        |(sign, hours, _, minutes)| {
            let secs = (hours * 3600 + minutes * 60) as i32;
            if '-' == sign {
                -secs
            } else {
                secs
            }
        },
    )(i)
}

fn named_zone(i: &str) -> IResult<&str, i32> {
    map(take_while1(is_alpha), zone_name_offset)(i)
}

fn zone_name_offset(name: &str) -> i32 {
    const HOUR: i32 = 3600;
    match name.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" | "WET" => 0,
        // US time zones
        "EDT" => -4 * HOUR,
        "EST" | "CDT" => -5 * HOUR,
        "CST" | "MDT" => -6 * HOUR,
        "MST" | "PDT" => -7 * HOUR,
        "PST" | "AKDT" => -8 * HOUR,
        "AKST" => -9 * HOUR,
        "HST" => -10 * HOUR,
        // Other zones commonly seen in trace headers
        "BST" | "CET" | "MET" | "WEST" => HOUR,
        "CEST" | "MEST" | "EET" | "SAST" => 2 * HOUR,
        "EEST" | "MSK" => 3 * HOUR,
        "IST" => 5 * HOUR + 1800,
        "HKT" | "SGT" | "AWST" => 8 * HOUR,
        "JST" | "KST" => 9 * HOUR,
        "AEST" => 10 * HOUR,
        "AEDT" => 11 * HOUR,
        "NZST" => 12 * HOUR,
        "NZDT" => 13 * HOUR,
        // RFC 2822 indicates that the military time zones were so poorly
        // defined that they must be treated as 0 unless additional
        // information is available. Unknown time zones must also be treated
        // as 0.
        _ => 0,
    }
}

fn zone(i: &str) -> IResult<&str, i32> {
    alt((numeric_zone, named_zone))(i)
}

fn opt_zone(i: &str) -> IResult<&str, i32> {
    map(opt(preceded(multispace0, zone)), |z| z.unwrap_or(0))(i)
}

// RFC 2822 3.3 date-time, e.g. "Tue, 10 Oct 2017 01:17:01 -0700"
fn rfc2822(i: &str) -> IResult<&str, DateParts> {
    map(
        tuple((
            opt(day_name),
            terminated(number(1, 2), alt((multispace1, tag("-")))),
            terminated(month, alt((multispace1, tag("-")))),
            terminated(year, multispace1),
            time_of_day,
            opt_zone,
        )),
        |(_, day, month, year, (hour, minute, second, nanos), offset)| {
            DateParts {
                year,
                month,
                day,
                hour,
                minute,
                second,
                nanos,
                offset,
            }
        },
    )(i)
}

// e.g. "2015-12-16 19:35:09.561998041 +0000" or "2015-12-16T19:35:09Z"
fn iso8601(i: &str) -> IResult<&str, DateParts> {
    map(
        tuple((
            terminated(number(4, 4), char('-')),
            terminated(number(1, 2), char('-')),
            terminated(number(1, 2), alt((tag("T"), tag("t"), multispace1))),
            time_of_day,
            opt_zone,
        )),
        |(year, month, day, (hour, minute, second, nanos), offset)| {
            DateParts {
                year: year as i32,
                month,
                day,
                hour,
                minute,
                second,
                nanos,
                offset,
            }
        },
    )(i)
}

// e.g. "Tue Oct 10 01:17:02 2017"
fn asctime(i: &str) -> IResult<&str, DateParts> {
    map(
        tuple((
            day_name,
            terminated(month, multispace1),
            terminated(number(1, 2), multispace1),
            terminated(time_of_day, multispace1),
            year,
            opt_zone,
        )),
        |(_, month, day, (hour, minute, second, nanos), year, offset)| {
            DateParts {
                year,
                month,
                day,
                hour,
                minute,
                second,
                nanos,
                offset,
            }
        },
    )(i)
}
