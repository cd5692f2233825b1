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

//! Text clean-up shared by the header heuristics.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Not dot-all: a comment broken across lines is left alone unless the
    // newlines have been collapsed first.
    static ref RX_DETAILS: Regex = Regex::new(r"\(.*?\)").unwrap();
}

/// Normalise line breaks and tabs and strip surrounding whitespace.
///
/// Some corpora store headers with literal two-character `\n` and `\t`
/// escapes instead of the real characters; both forms come out the same.
pub fn cleanup_text(text: &str) -> Cow<str> {
    if text.contains('\\') {
        Cow::Owned(
            text.replace("\\n", "\n")
                .replace("\\t", "\t")
                .trim()
                .to_owned(),
        )
    } else {
        Cow::Borrowed(text.trim())
    }
}

/// Replace each parenthesised comment in `text` with a single space.
pub fn remove_details(text: &str) -> Cow<str> {
    RX_DETAILS.replace_all(text, " ")
}

/// Prepare a header for host/protocol matching: clean it up, collapse it to
/// a single line, and drop the comments.
pub fn label_text(header: &str) -> String {
    let single_line = cleanup_text(header).replace('\n', " ");
    remove_details(&single_line).trim().to_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cleanup_text() {
        assert_eq!("a", cleanup_text("a \n"));
        assert_eq!("a", cleanup_text("\\n \n a \n   "));
        assert_eq!("a", cleanup_text("     a     "));
        assert_eq!("a\n\tb", cleanup_text("a\\n\\tb"));
        assert_eq!(cleanup_text("x\n\ty"), cleanup_text("x\\n\\ty"));
    }

    #[test]
    fn test_remove_details() {
        assert_eq!(
            "from mail-vk0-x233.google.com  \n",
            remove_details(
                "from mail-vk0-x233.google.com \
                 (mail-vk0-x233.google.com. [2607:f8b0:400c:c05::233])\n"
            )
        );
        assert_eq!("a   b", remove_details("a (x) b"));
        assert_eq!("a b", remove_details("a(x)b"));
        assert_eq!("a (x\n) b", remove_details("a (x\n) b"));
    }

    #[test]
    fn test_label_text() {
        assert_eq!(
            "from [127.0.0.1]   \tby ismtpd0002p1iad1.sendgrid.net   with ESMTP",
            label_text(
                "from [127.0.0.1] (localhost [52.2.54.97])\\n\\tby \
                 ismtpd0002p1iad1.sendgrid.net (SG) with ESMTP"
            )
        );
        assert_eq!(
            "by x   with SMTP",
            label_text("  by x (comment\n  spanning lines) with SMTP\n")
        );
    }
}
