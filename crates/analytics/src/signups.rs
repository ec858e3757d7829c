//! Monthly signup series for a single calendar year.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use trustlens_core::{ClientField, ClientRecord};

use crate::date::parse_date;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPoint {
    pub name: String,
    pub signups: u64,
}

/// Twelve points, Jan..Dec, counting records that commenced in `year`.
///
/// Records with an unparseable commencement date or a different year are
/// left out.
pub fn signup_series(roster: &[ClientRecord], year: i32) -> Vec<SignupPoint> {
    let mut counts = [0u64; 12];
    for record in roster {
        let Some(date) = record.get(ClientField::CommencedDate).and_then(parse_date) else {
            continue;
        };
        if date.year() == year {
            counts[date.month0() as usize] += 1;
        }
    }

    MONTH_NAMES
        .iter()
        .zip(counts)
        .map(|(name, signups)| SignupPoint {
            name: (*name).to_string(),
            signups,
        })
        .collect()
}

/// Records that commenced in `month` (1-12) of any year.
pub fn count_in_month(roster: &[ClientRecord], month: u32) -> u64 {
    roster
        .iter()
        .filter_map(|r| r.get(ClientField::CommencedDate).and_then(parse_date))
        .filter(|d| d.month() == month)
        .count() as u64
}

/// `"increasing"` when the last point beats the first, else `"decreasing"`.
pub fn trend(points: &[SignupPoint]) -> &'static str {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if last.signups > first.signups => "increasing",
        _ => "decreasing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustlens_core::Scalar;

    fn commenced(date: &str) -> ClientRecord {
        ClientRecord {
            commenced_date: Some(Scalar::from(date)),
            ..Default::default()
        }
    }

    #[test]
    fn always_twelve_points_in_calendar_order() {
        let series = signup_series(&[], 2025);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].name, "Jan");
        assert_eq!(series[11].name, "Dec");
        assert!(series.iter().all(|p| p.signups == 0));
    }

    #[test]
    fn counts_only_the_requested_year() {
        let roster = vec![
            commenced("2025-01-10"),
            commenced("2025-01-31"),
            commenced("2025-12-01"),
            commenced("2024-01-10"),
            commenced("garbage"),
            ClientRecord::default(),
        ];
        let series = signup_series(&roster, 2025);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].signups, 2);
        assert_eq!(series[11].signups, 1);
        assert_eq!(series.iter().map(|p| p.signups).sum::<u64>(), 3);
    }

    #[test]
    fn month_count_ignores_year() {
        let roster = vec![
            commenced("2025-03-01"),
            commenced("2019-03-20"),
            commenced("2025-04-01"),
        ];
        assert_eq!(count_in_month(&roster, 3), 2);
    }

    #[test]
    fn trend_compares_first_and_last() {
        let pts = |a, b, c| {
            vec![
                SignupPoint { name: "Oct".into(), signups: a },
                SignupPoint { name: "Nov".into(), signups: b },
                SignupPoint { name: "Dec".into(), signups: c },
            ]
        };
        assert_eq!(trend(&pts(1, 0, 2)), "increasing");
        assert_eq!(trend(&pts(2, 5, 2)), "decreasing");
        assert_eq!(trend(&[]), "decreasing");
    }
}
