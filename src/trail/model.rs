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

use serde::Serialize;

/// The pair of trace headers between which no delay could be determined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DelayError {
    /// The raw header of the hop the delay was being computed for.
    pub current: String,
    /// The raw header of the hop before it.
    pub previous: String,
}

/// One relay transition, derived from one trace header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Hop {
    /// The name the sending host gave for itself; empty if absent.
    pub from_host: String,
    /// The name of the receiving host.
    pub received_by_host: String,
    /// The protocol used for the transfer, e.g. `ESMTPS`; empty if absent.
    pub protocol: String,
    /// When the receiving host got the message, in seconds since the UNIX
    /// epoch, or `None` if no date could be found in the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Seconds since the previous hop.
    ///
    /// 0 for the first hop and whenever the delay cannot be determined.
    pub delay: u64,
    /// If the header could not be broken into hosts and protocol, the raw
    /// header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_error: Option<String>,
    /// If `delay` could not be determined, the headers involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_error: Option<DelayError>,
}

/// The reconstructed path of one message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Trail {
    pub from_address: String,
    pub to_address: String,
    pub cc: String,
    pub bcc: String,
    /// The hops the message took, earliest first.
    pub hops: Vec<Hop>,
}

impl Trail {
    /// The sum of the delays of all hops, in seconds.
    pub fn total_delay(&self) -> u64 {
        self.hops.iter().map(|hop| hop.delay).sum()
    }

    pub fn label_error_count(&self) -> usize {
        self.label_errors().count()
    }

    pub fn delay_error_count(&self) -> usize {
        self.delay_errors().count()
    }

    /// The headers for which label extraction failed, in hop order.
    pub fn label_errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.hops.iter().filter_map(|hop| hop.label_error.as_deref())
    }

    /// The header pairs for which no delay could be determined, in hop order.
    pub fn delay_errors(&self) -> impl Iterator<Item = &DelayError> + '_ {
        self.hops.iter().filter_map(|hop| hop.delay_error.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hop(delay: u64) -> Hop {
        Hop {
            delay,
            ..Hop::default()
        }
    }

    #[test]
    fn aggregates() {
        let mut trail = Trail {
            hops: vec![hop(0), hop(40), hop(2)],
            ..Trail::default()
        };
        trail.hops[1].label_error = Some("from".to_owned());
        trail.hops[2].delay_error = Some(DelayError {
            current: "a".to_owned(),
            previous: "b".to_owned(),
        });

        assert_eq!(42, trail.total_delay());
        assert_eq!(1, trail.label_error_count());
        assert_eq!(vec!["from"], trail.label_errors().collect::<Vec<_>>());
        assert_eq!(1, trail.delay_error_count());
        assert_eq!(
            "a",
            trail.delay_errors().next().unwrap().current.as_str()
        );
    }

    #[test]
    fn empty_trail_has_zero_aggregates() {
        let trail = Trail::default();
        assert_eq!(0, trail.total_delay());
        assert_eq!(0, trail.label_error_count());
        assert_eq!(0, trail.delay_error_count());
    }
}
