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

//! RFC 2047 "encoded word" decoding for display headers.

use std::borrow::Cow;
use std::str;

use encoding_rs::*;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENCODED_WORD: Regex =
        Regex::new(r"^=\?([!->@-~]*)\?([!->@-~]*)\?([!->@-~]*)\?=$").unwrap();
}

/// Decode a display header (`From`, `To`, `Cc`, `Bcc`, ...) for
/// presentation.
///
/// Folding is removed and encoded words are decoded. Anything that is not a
/// valid encoded word, including encoded words in unknown charsets, is left
/// as-is. An absent header decodes to the empty string.
pub fn decode_display_header(value: Option<&str>) -> String {
    match value {
        None => String::new(),
        Some(value) => {
            ew_decode_unstructured(unfold(value).trim()).into_owned()
        }
    }
}

fn unfold(s: &str) -> Cow<str> {
    if memchr::memchr2(b'\r', b'\n', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }

    let mut unfolded = String::with_capacity(s.len());
    let mut is_unfolding = false;
    for ch in s.chars() {
        if is_unfolding {
            if ' ' == ch || '\t' == ch || '\r' == ch || '\n' == ch {
                continue;
            }
            is_unfolding = false;
            unfolded.push(ch);
        } else if '\r' == ch || '\n' == ch {
            unfolded.push(' ');
            is_unfolding = true;
        } else {
            unfolded.push(ch);
        }
    }

    Cow::Owned(unfolded)
}

/// Decode all encoded words in the unstructured text `s`.
///
/// Whitespace between two adjacent encoded words is deleted, as RFC 2047
/// requires; all other whitespace is preserved.
pub fn ew_decode_unstructured(s: &str) -> Cow<str> {
    if !s.contains("=?") {
        return Cow::Borrowed(s);
    }

    let mut decoded = String::with_capacity(s.len());
    let mut last_was_encoded = false;
    let mut tail = s;
    while !tail.is_empty() {
        let word_start = tail
            .find(|c: char| !c.is_whitespace())
            .unwrap_or_else(|| tail.len());
        let (space, rest) = tail.split_at(word_start);
        let word_end = rest.find(char::is_whitespace).unwrap_or_else(|| rest.len());
        let (word, rest) = rest.split_at(word_end);
        tail = rest;

        match ew_decode(word) {
            Some(ew) => {
                if !last_was_encoded {
                    decoded.push_str(space);
                }
                decoded.push_str(&ew);
                last_was_encoded = true;
            }
            None => {
                decoded.push_str(space);
                decoded.push_str(word);
                last_was_encoded = false;
            }
        }
    }

    Cow::Owned(decoded)
}

/// Test if `word` (in its entirety) is an RFC 2047 "encoded word".
///
/// If it is, decode it and return its decoded value.
///
/// Returns `None` if it is not an encoded word or if it could not be decoded.
///
/// This returns an `Option` instead of returning the input unchanged in cases
/// where it is not an encoded word because the distinction is significant:
/// whitespace is supposed to be deleted between adjacent encoded words, but
/// must be left alone in all other cases.
pub fn ew_decode(word: &str) -> Option<Cow<str>> {
    // RFC 2047 limits encoded words to 75 characters, but plenty of agents
    // produce longer ones and other readers accept them, so we do too.
    let captures = ENCODED_WORD.captures(word)?;

    let charset = captures.get(1)?.as_str();
    let transfer_encoding = captures.get(2)?.as_str();
    let content = captures.get(3)?.as_str().as_bytes();

    let content = decode_xfer(transfer_encoding, content)?;
    decode_charset(charset, &content).map(|s| Cow::Owned(s.into_owned()))
}

fn decode_xfer<'a>(xfer: &str, content: &'a [u8]) -> Option<Cow<'a, [u8]>> {
    match xfer {
        "q" | "Q" => Some(q_decode(content)),
        "b" | "B" => base64::decode(content).ok().map(Cow::Owned),
        _ => None,
    }
}

/// RFC 2047 4.2 "Q" encoding.
///
/// Invalid `=` sequences are passed through verbatim.
fn q_decode(content: &[u8]) -> Cow<[u8]> {
    if !content.iter().any(|&b| b'_' == b || b'=' == b) {
        return Cow::Borrowed(content);
    }

    let mut decoded = Vec::with_capacity(content.len());
    let mut ix = 0;
    while ix < content.len() {
        match content[ix] {
            // _ stands for ASCII space regardless of charset
            b'_' => {
                decoded.push(b' ');
                ix += 1;
            }
            b'=' => {
                let byte = content
                    .get(ix + 1..ix + 3)
                    .and_then(|hex| str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match byte {
                    Some(byte) => {
                        decoded.push(byte);
                        ix += 3;
                    }
                    None => {
                        decoded.push(b'=');
                        ix += 1;
                    }
                }
            }
            b => {
                decoded.push(b);
                ix += 1;
            }
        }
    }

    Cow::Owned(decoded)
}

fn decode_charset<'a>(
    charset: &str,
    content: &'a [u8],
) -> Option<Cow<'a, str>> {
    // RFC 2231 allows a language suffix, e.g. "us-ascii*en"
    let charset = charset.split('*').next().unwrap_or(charset);
    Some(
        Encoding::for_label_no_replacement(charset.as_bytes())?
            .decode_with_bom_removal(content)
            .0,
    )
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_ew_decode() {
        assert_eq!(None, ew_decode("hello world"));
        assert_eq!(None, ew_decode("=?x-no-such-charset?Q?foo?="));
        assert_eq!(None, ew_decode("=?utf-8?X?foo?="));
        assert_eq!(None, ew_decode("=?utf-8?B?!!!?="));

        // Examples from RFC 2047
        assert_eq!(
            "Keith Moore",
            ew_decode("=?US-ASCII?Q?Keith_Moore?=").unwrap()
        );
        assert_eq!(
            "Keld Jørn Simonsen",
            ew_decode("=?ISO-8859-1?Q?Keld_J=F8rn_Simonsen?=").unwrap()
        );
        assert_eq!("André", ew_decode("=?ISO-8859-1?Q?Andr=E9?=").unwrap());
        assert_eq!(
            "If you can read this yo",
            ew_decode("=?ISO-8859-1?B?SWYgeW91IGNhbiByZWFkIHRoaXMgeW8=?=")
                .unwrap()
        );
        assert_eq!(
            "u understand the example.",
            ew_decode("=?ISO-8859-2?B?dSB1bmRlcnN0YW5kIHRoZSBleGFtcGxlLg==?=")
                .unwrap()
        );
        assert_eq!("a=zb", ew_decode("=?utf-8?q?a=zb?=").unwrap());
        assert_eq!("a=", ew_decode("=?utf-8?q?a=?=").unwrap());
    }

    #[test]
    fn test_ew_decode_unstructured() {
        assert_eq!("plain text", ew_decode_unstructured("plain text"));
        assert_eq!(
            "Capitalism\u{2122} <money@rules.com>",
            ew_decode_unstructured(
                "=?utf-8?Q?Capitalism=E2=84=A2?= <money@rules.com>"
            )
        );
        // Whitespace between adjacent encoded words is dropped
        assert_eq!(
            "ab",
            ew_decode_unstructured("=?ISO-8859-1?Q?a?= =?ISO-8859-1?Q?b?=")
        );
        assert_eq!(
            "a b",
            ew_decode_unstructured("=?ISO-8859-1?Q?a?= b")
        );
        assert_eq!(
            "x  =?bogus?=  y",
            ew_decode_unstructured("x  =?bogus?=  y")
        );
    }

    #[test]
    fn test_decode_display_header() {
        assert_eq!("", decode_display_header(None));
        assert_eq!(
            "Mr. Money Bags <bags@moneyrules.com>",
            decode_display_header(Some("Mr. Money Bags <bags@moneyrules.com>"))
        );
        assert_eq!(
            "André <andre@example.com>, Bob <bob@example.com>",
            decode_display_header(Some(
                "=?ISO-8859-1?Q?Andr=E9?= <andre@example.com>,\r\n\t\
                 Bob <bob@example.com>"
            ))
        );
        // Illegal sequences fall back to the original text
        assert_eq!(
            "=?utf-8?B?@@@?= <x@example.com>",
            decode_display_header(Some("=?utf-8?B?@@@?= <x@example.com>"))
        );
    }

    proptest! {
        #[test]
        fn ew_decode_never_panics(s in r"=\?.*\?.*\?.*\?=") {
            ew_decode(&s);
        }

        #[test]
        fn decode_display_header_never_panics(s in ".*") {
            decode_display_header(Some(s.as_str()));
        }
    }
}
