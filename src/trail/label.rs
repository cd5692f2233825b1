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

//! Extraction of the sending host, receiving host and protocol from a trace
//! header.
//!
//! Trace headers are only loosely structured in practice, so this works by
//! matching the clauses agents conventionally emit (`from X by Y with Z id
//! ...`) after the comments have been removed, rather than by parsing the
//! RFC 5322 grammar.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::text::label_text;

// All patterns are case-insensitive, so `id` also ends a protocol at `ID`.
lazy_static! {
    static ref RX_FROM: Regex = Regex::new(r"(?is)from\s+(.*?)(?:\s+|$)").unwrap();
    static ref RX_FROM_BY: Regex =
        Regex::new(r"(?is)from\s+(?:.*?)\s+by\s+(.*?)(?:\s+|$)").unwrap();
    static ref RX_BY: Regex = Regex::new(r"(?is)by\s+(.*?)(?:\s+|$)").unwrap();
    static ref RX_FROM_PROTOCOL: Regex = Regex::new(
        r"(?is)from\s+(?:.*?)\s+by\s+(?:.*?)\s+(?:(?:with|via)(.*?)(?:id|$|;)|id|$)"
    )
    .unwrap();
    static ref RX_BY_PROTOCOL: Regex = Regex::new(
        r"(?is)by\s+(?:.*?)\s+(?:(?:with|via)(.*?)(?:id|$|;)|id|$)"
    )
    .unwrap();
}

/// The host and protocol labels of one trace header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    pub from_host: String,
    pub received_by_host: String,
    pub protocol: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("No sending host found after `from`")]
    MissingFrom,
    #[error("No receiving host found after `by`")]
    MissingBy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Clause {
    From,
    By,
    Other,
}

fn leading_clause(text: &str) -> Clause {
    fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
        text.len() >= prefix.len()
            && text.as_bytes()[..prefix.len()]
                .eq_ignore_ascii_case(prefix.as_bytes())
    }

    if starts_with_ignore_case(text, "from") {
        Clause::From
    } else if starts_with_ignore_case(text, "by") {
        Clause::By
    } else {
        Clause::Other
    }
}

fn capture<'a>(rx: &Regex, text: &'a str) -> Option<&'a str> {
    rx.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract all three labels of `header`.
///
/// A header that begins with neither `from` nor `by` yields empty labels
/// without error, since many agents emit such headers legitimately. A header
/// whose `from` or `by` clause cannot be found is an error.
pub fn extract_labels(header: &str) -> Result<Labels, LabelError> {
    let text = label_text(header);
    match leading_clause(&text) {
        Clause::From => {
            let from_host =
                capture(&RX_FROM, &text).ok_or(LabelError::MissingFrom)?;
            let received_by_host =
                capture(&RX_FROM_BY, &text).ok_or(LabelError::MissingBy)?;
            Ok(Labels {
                from_host: from_host.to_owned(),
                received_by_host: received_by_host.to_owned(),
                protocol: protocol_of(&text, Clause::From),
            })
        },
        Clause::By => {
            let received_by_host =
                capture(&RX_BY, &text).ok_or(LabelError::MissingBy)?;
            Ok(Labels {
                from_host: String::new(),
                received_by_host: received_by_host.to_owned(),
                protocol: protocol_of(&text, Clause::By),
            })
        },
        Clause::Other => Ok(Labels::default()),
    }
}

/// Return the host named in the `from` clause, or `""` if there is none.
pub fn extract_from_label(header: &str) -> String {
    let text = label_text(header);
    match leading_clause(&text) {
        Clause::From => capture(&RX_FROM, &text).unwrap_or("").to_owned(),
        _ => String::new(),
    }
}

/// Return the host named in the `by` clause, or `""` if there is none.
pub fn extract_received_by_label(header: &str) -> String {
    let text = label_text(header);
    let rx: &Regex = match leading_clause(&text) {
        Clause::From => &RX_FROM_BY,
        Clause::By => &RX_BY,
        Clause::Other => return String::new(),
    };
    capture(rx, &text).unwrap_or("").to_owned()
}

/// Return the protocol named in the `with` or `via` clause, or `""` if there
/// is none.
pub fn extract_protocol(header: &str) -> String {
    let text = label_text(header);
    let clause = leading_clause(&text);
    protocol_of(&text, clause)
}

fn protocol_of(text: &str, clause: Clause) -> String {
    let rx: &Regex = match clause {
        Clause::From => &RX_FROM_PROTOCOL,
        Clause::By => &RX_BY_PROTOCOL,
        Clause::Other => return String::new(),
    };
    capture(rx, text).unwrap_or("").trim().to_owned()
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    const GOOGLE_ESMTPS: &str =
        "from mail-vk0-x233.google.com (mail-vk0-x233.google.com. \
         [2607:f8b0:400c:c05::233])\n        \
         by mx.google.com with ESMTPS id \
         d124si110912930vka.142.2016.01.12.10.20.45\n        \
         for <support@pandawarrior.com>\n        \
         (version=TLS1_2 cipher=ECDHE-RSA-AES128-GCM-SHA256 \
         bits=128/128);\n        \
         Tue, 12 Jan 2016 10:20:45 -0800 (PST)";

    const SENDGRID_ESCAPED: &str =
        "from [127.0.0.1] (localhost [52.2.54.97])\\n\\t\
         by ismtpd0002p1iad1.sendgrid.net (SG) with ESMTP id \
         p3iTfjpIQMuPA35Cjv4UrQ\\n\\t\
         for <support+chat@pandakungfu.com>; \
         Wed, 16 Dec 2015 22:19:22.596 +0000 (UTC)";

    #[test]
    fn test_extract_from_label() {
        assert_eq!(
            "mail-vk0-x233.google.com",
            extract_from_label(GOOGLE_ESMTPS)
        );
        assert_eq!(
            "",
            extract_from_label(
                "by 10.31.236.194 with SMTP id k185csp2841185vkh;\n        \
                 Tue, 12 Jan 2016 10:15:05 -0800 (PST)"
            )
        );
        assert_eq!("blah", extract_from_label("from blah"));
        assert_eq!("[127.0.0.1]", extract_from_label(SENDGRID_ESCAPED));
    }

    #[test]
    fn test_extract_received_by_label() {
        assert_eq!(
            "mail-vk0-x233.google.com",
            extract_received_by_label(
                "by mail-vk0-x233.google.com with SMTP id \
                 k1so247736857vkb.2 \n for <support@buddy.com>; \
                 Tue, 12 Jan 2016 10:20:45 -0800 (PST)"
            )
        );
        assert_eq!(
            "10.31.236.194",
            extract_received_by_label(
                "by 10.31.236.194 with SMTP id k185csp2841185vkh;\n        \
                 Tue, 12 Jan 2016 10:15:05 -0800 (PST)"
            )
        );
        assert_eq!("", extract_received_by_label("from blah"));
        assert_eq!("mx.google.com", extract_received_by_label(GOOGLE_ESMTPS));
        assert_eq!(
            "ismtpd0002p1iad1.sendgrid.net",
            extract_received_by_label(
                "from [127.0.0.1] (localhost [52.2.54.97])\\n\\t\
                 by ismtpd0002p1iad1.sendgrid.net (SG) with ESMTP id \
                 GiHVpachST-HTO7pZjZZgw\n\t\
                 for <support+chat@buddy.com>; \
                 Tue, 12 Jan 2016 18:20:00.301 +0000 (UTC)"
            )
        );
        assert_eq!(
            "mail.yolo.com",
            extract_received_by_label(
                "
            from [10.10.0.116] (unknown [10.10.0.116])
            (Authenticated sender: ab@lol.com)
            by mail.yolo.com (Postfix) with ESMTPSA id 96D1950E0C3A
            for <support+r.rv9cu.1647381@apple.com>; \
                 Tue, 12 Jan 2016 15:40:43 +0000 (GMT)
            "
            )
        );
        assert_eq!(
            "ismtpd0002p1iad1.sendgrid.net",
            extract_received_by_label(SENDGRID_ESCAPED)
        );
    }

    #[test]
    fn test_extract_protocol() {
        assert_eq!(
            "SMTP",
            extract_protocol(
                "by mail-vk0-x233.google.com with SMTP id \
                 k1so247736857vkb.2\n        for <support@peacedojo.com>; \
                 Tue, 12 Jan 2016 10:20:45 -0800 (PST)"
            )
        );
        assert_eq!(
            "HTTP",
            extract_protocol(
                "by 10.31.214.5 with HTTP; \
                 Tue, 12 Jan 2016 10:20:05 -0800 (PST)"
            )
        );
        assert_eq!(
            "esmtpa",
            extract_protocol(
                "from laughingbuddha.com ([5.175.233.84]:53519 \
                 helo=5.175.233.84)\n\t\
                 by ivyfpysq.laughingbuddha.com with esmtpa (Exim 4.86)\n\t\
                 (envelope-from <newsletter@indiaretailnews.com>)\n\t\
                 id 1aJ3Wi-0007QT-T2\n\t\
                 for careers@peacedojo.com; Tue, 12 Jan 2016 19:18:40 +0100"
            )
        );
        assert_eq!(
            "",
            extract_protocol(
                "from www.ramayan.nl ([212.178.196.87])\n\
                 by smtp.ramayan.nl (Kerio Connect 8.1.2)\n\
                 for sales@peacedojo.com;\n Fri, 18 Dec 2015 10:11:37 +0100"
            )
        );
        assert_eq!("ESMTPS", extract_protocol(GOOGLE_ESMTPS));
        assert_eq!(
            "Microsoft SMTP  Server",
            extract_protocol(
                "from MBX7.superpower2020.com (2002:2eaf:356b::2eaf:356b) by\n \
                 MBX5.superpower2020.com (2002:2eaf:3569::2eaf:3569) with \
                 Microsoft SMTP\n Server (TLS) id 15.0.1104.5; \
                 Tue, 12 Jan 2016 17:39:59 +0000"
            )
        );
        assert_eq!(
            "Microsoft SMTPSVC",
            extract_protocol(
                "from BLU179-W55 ([65.55.111.73]) by \
                 BLU004-OMC2S38.hotmail.com over TLS secured channel with \
                 Microsoft SMTPSVC(7.5.7601.23008);\n\t \
                 Tue, 12 Jan 2016 09:44:09 -0800"
            )
        );
        assert_eq!("ESMTP", extract_protocol(SENDGRID_ESCAPED));
        assert_eq!(
            "SMTP",
            extract_protocol("by mx.example.com with SMTP IDENT 42")
        );
    }

    #[test]
    fn via_introduces_protocol() {
        assert_eq!(
            Ok(Labels {
                from_host: String::new(),
                received_by_host: "x.example.com".to_owned(),
                protocol: "HTTP".to_owned(),
            }),
            extract_labels(
                "by x.example.com via HTTP; Tue, 10 Oct 2017 01:17:01 -0700"
            )
        );
        assert_eq!(
            Ok(Labels {
                from_host: "a.example.com".to_owned(),
                received_by_host: "b.example.com".to_owned(),
                protocol: "ESMTP".to_owned(),
            }),
            extract_labels(
                "from a.example.com by b.example.com via ESMTP id X1; \
                 Tue, 10 Oct 2017 01:17:01 -0700"
            )
        );
        assert_eq!(
            "ESMTP",
            extract_protocol("from a by b via ESMTP id X; Tue, 10 Oct 2017")
        );
        assert_eq!(
            "HTTP",
            extract_protocol("by x.example.com via HTTP; Tue, 10 Oct 2017")
        );
    }

    #[test]
    fn test_extract_labels() {
        assert_eq!(
            Ok(Labels {
                from_host: "mail-vk0-x233.google.com".to_owned(),
                received_by_host: "mx.google.com".to_owned(),
                protocol: "ESMTPS".to_owned(),
            }),
            extract_labels(GOOGLE_ESMTPS)
        );
        assert_eq!(
            Ok(Labels {
                from_host: String::new(),
                received_by_host: "10.103.79.86".to_owned(),
                protocol: "HTTP".to_owned(),
            }),
            extract_labels(
                "by 10.103.79.86 with HTTP; Tue, 10 Oct 2017 01:17:01 -0700"
            )
        );
        assert_eq!(
            Ok(Labels {
                from_host: String::new(),
                received_by_host: "mailr.blah.com".to_owned(),
                protocol: String::new(),
            }),
            extract_labels(
                "by mailr.blah.com for <sales@hohoho.com>; \
                 Fri, 18 Dec 2015 15:37:27 GMT"
            )
        );
    }

    #[test]
    fn leading_clause_is_case_insensitive() {
        assert_eq!(
            Ok(Labels {
                from_host: "a.example.com".to_owned(),
                received_by_host: "b.example.com".to_owned(),
                protocol: "SMTP".to_owned(),
            }),
            extract_labels("FROM a.example.com BY b.example.com WITH SMTP")
        );
    }

    #[test]
    fn other_leading_token_is_not_an_error() {
        assert_eq!(
            Ok(Labels::default()),
            extract_labels("qmail 1234 invoked by uid 89; 1 Jan 2016")
        );
        assert_eq!(Ok(Labels::default()), extract_labels(""));
    }

    #[test]
    fn missing_hosts_are_errors() {
        assert_eq!(Err(LabelError::MissingBy), extract_labels("from blah"));
        assert_eq!(Err(LabelError::MissingFrom), extract_labels("from"));
        assert_eq!(Err(LabelError::MissingBy), extract_labels("by"));
        assert_eq!(
            Err(LabelError::MissingBy),
            extract_labels("from blah.spd.co.il")
        );
    }

    proptest! {
        #[test]
        fn extraction_never_panics(s in ".*") {
            let _ = extract_labels(&s);
            extract_from_label(&s);
            extract_received_by_label(&s);
            extract_protocol(&s);
        }

        #[test]
        fn successful_labels_agree_with_individual_extractors(
            s in "(from|by) [a-z.]{1,10}( by [a-z.]{1,10})?( with [A-Z]{1,6})?"
        ) {
            if let Ok(labels) = extract_labels(&s) {
                prop_assert_eq!(labels.from_host, extract_from_label(&s));
                prop_assert_eq!(
                    labels.received_by_host, extract_received_by_label(&s));
                prop_assert_eq!(labels.protocol, extract_protocol(&s));
            }
        }
    }
}
