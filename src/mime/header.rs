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

//! Splitting a message into its RFC 5322 header fields.

/// The header fields of a message, in the order they occur.
///
/// Lookups are case-insensitive on the field name. Repeated fields are all
/// retained; this matters for trace fields, each relay prepending its own.
///
/// Values are kept essentially raw: the whitespace after the colon is
/// removed, and folded continuation lines are joined with `\n` and keep
/// their leading whitespace. Nothing is decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    fields: Vec<(String, String)>,
}

impl HeaderBlock {
    /// Parse the header block at the start of `text`.
    ///
    /// `text` may be a full message or just its headers. Parsing stops at the
    /// first blank line, or at the first line which is neither a header field
    /// nor a continuation; everything after is ignored. A leading mbox-style
    /// `From ` envelope line is skipped.
    ///
    /// Never fails; malformed input simply produces fewer fields.
    pub fn parse(text: &str) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();
        let mut lines = text.lines().peekable();

        if lines.peek().map_or(false, |l| l.starts_with("From ")) {
            lines.next();
        }

        for line in lines {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                // A continuation with nothing before it is dropped
                if let Some((_, value)) = fields.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
                continue;
            }

            match split_field(line) {
                Some((name, value)) => {
                    fields.push((name.to_owned(), value.to_owned()))
                }
                None => break,
            }
        }

        HeaderBlock { fields }
    }

    /// Return the value of the first field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Return the values of all fields called `name`, in occurrence order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get_all_of(&[name])
    }

    /// Return the values of all fields whose name is any of `names`, in
    /// occurrence order.
    pub fn get_all_of<S: AsRef<str>>(&self, names: &[S]) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| {
                names.iter().any(|name| n.eq_ignore_ascii_case(name.as_ref()))
            })
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Iterate over all `(name, value)` pairs in occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split `line` into field name and value, or return `None` if it is not a
/// header field.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let colon = memchr::memchr(b':', line.as_bytes())?;
    let name = &line[..colon];
    // RFC 5322 ftext, i.e., printable ASCII other than colon
    if name.is_empty() || !name.bytes().all(|b| b > b' ' && b <= b'~') {
        return None;
    }

    Some((name, line[colon + 1..].trim_start_matches(|c| ' ' == c || '\t' == c)))
}
