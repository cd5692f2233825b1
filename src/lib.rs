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

//! Reconstructs the path an email took across mail relays from its
//! `Received` headers.
//!
//! The usual entry point is [`analyse`], which takes the raw source (or just
//! the header block) of a message and produces a [`Trail`]: the decoded
//! address headers plus one [`Hop`] per trace header, oldest first, with the
//! hosts, protocol, timestamp and delay of each relay transition.
//!
//! Heuristics that fail on an individual header never abort the analysis;
//! they are recorded on the affected hop instead.

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

macro_rules! die {
    ($ex:expr, $($fmt:tt)*) => {{
        eprintln!($($fmt)*);
        $ex.exit()
    }};
}

pub mod cli;
pub mod mime;
pub mod support;
pub mod trail;

#[cfg(test)]
mod test_data;

pub use crate::mime::header::HeaderBlock;
pub use crate::support::config::AnalysisConfig;
pub use crate::support::error::Error;
pub use crate::trail::{
    analyse, analyse_hop, analyse_hops, Analyser, DateParser, DelayError,
    FreeTextDateParser, HeuristicTimestringExtractor, Hop, TimestringExtractor,
    Trail,
};

/// Set up logging to standard error at the given level.
///
/// Used by the command-line front end when no log4rs configuration file is
/// given. Does nothing if a logger is already installed.
pub fn init_simple_log(level: log::LevelFilter) {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}][{t}] {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level));

    if let Ok(config) = config {
        // Fails only if a logger is already set, which is fine
        let _ = log4rs::init_config(config);
    }
}

#[cfg(test)]
static INIT_TEST_LOG: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
fn init_test_log() {
    INIT_TEST_LOG.call_once(|| init_simple_log(log::LevelFilter::Debug))
}
