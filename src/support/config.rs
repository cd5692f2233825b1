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
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Tunables for trail analysis.
///
/// Every field has a default, so an empty configuration file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// The names of the headers which are treated as trace headers.
    ///
    /// Matching is case-insensitive. If more than one name is given, the
    /// headers are merged in the order they occur in the message, so that
    /// e.g. `["Received", "X-Received"]` still yields a newest-first list.
    ///
    /// The default is just `Received`.
    pub trace_headers: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            trace_headers: vec!["Received".to_owned()],
        }
    }
}

impl AnalysisConfig {
    /// Load the configuration from the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read(path)?;
        Ok(toml::from_slice(&data)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AnalysisConfig = toml::from_str("").unwrap();
        assert_eq!(AnalysisConfig::default(), config);
        assert_eq!(vec!["Received".to_owned()], config.trace_headers);
    }

    #[test]
    fn trace_headers_can_be_overridden() {
        let config: AnalysisConfig =
            toml::from_str(r#"trace_headers = ["Received", "X-Received"]"#)
                .unwrap();
        assert_eq!(
            vec!["Received".to_owned(), "X-Received".to_owned()],
            config.trace_headers
        );
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::TempDir::new().unwrap();

        assert_matches!(
            Err(Error::Io(..)),
            AnalysisConfig::load(&dir.path().join("nx.toml"))
        );

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "trace_headers = 42").unwrap();
        assert_matches!(Err(Error::Config(..)), AnalysisConfig::load(&bad));

        let good = dir.path().join("good.toml");
        fs::write(&good, r#"trace_headers = ["X-Received"]"#).unwrap();
        assert_eq!(
            vec!["X-Received".to_owned()],
            AnalysisConfig::load(&good).unwrap().trace_headers
        );
    }
}
