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

/// Compute the transit delay in seconds between two hop timestamps.
///
/// Returns `None` if either timestamp is unknown. Clocks on different relays
/// routinely disagree, so a hop that appears to precede its predecessor is
/// given a delay of 0 rather than a negative one.
pub fn calculate_delay(current: Option<i64>, previous: Option<i64>) -> Option<u64> {
    let (current, previous) = (current?, previous?);
    Some(current.saturating_sub(previous).max(0) as u64)
}
