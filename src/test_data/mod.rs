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

/// A message relayed through SendGrid to Google, with one trace header of
/// each common shape: a `;`-terminated date, a date on its own line with a
/// redundant zone name, and a `(SG)` comment before the protocol. The `From`
/// is an encoded word and the `Cc` is folded.
pub static SENDGRID: &str = include_str!("sendgrid.eml");

/// A message with one trace header that has neither a receiving host nor a
/// date, so that both the hop itself and the delays on either side of it
/// fail.
pub static BROKEN_TRACE: &str = include_str!("broken-trace.eml");

/// A message that was never sent, and so has no trace headers.
pub static DRAFT: &str = include_str!("draft.eml");
