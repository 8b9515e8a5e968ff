// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::model::Progress;

/// Formats a position in seconds as `m:ss` for the progress display.
///
/// Fractional seconds are dropped. Negative or non-finite input, which a sink
/// may report before a track's length is known, formats as `0:00`.
///
/// # Examples
///
/// ```
/// use panelplay::util::format::format_time;
///
/// assert_eq!(format_time(65.4), "1:05");
/// assert_eq!(format_time(3600.0), "60:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}

/// Formats a progress report as `position / duration (percent)`.
pub fn format_progress(progress: &Progress) -> String {
    format!(
        "{} / {} ({}%)",
        format_time(progress.position),
        format_time(progress.duration),
        (progress.fraction() * 100.0).round() as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(125.0), "2:05");
    }

    #[test]
    fn unknown_positions_format_as_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn progress_shows_times_and_percentage() {
        let progress = Progress {
            position: 45.0,
            duration: 180.0,
        };

        assert_eq!(format_progress(&progress), "0:45 / 3:00 (25%)");
    }

    #[test]
    fn progress_past_the_end_is_capped() {
        let progress = Progress {
            position: 200.0,
            duration: 180.0,
        };

        assert_eq!(format_progress(&progress), "3:20 / 3:00 (100%)");
    }
}
