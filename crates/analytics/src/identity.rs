//! Age derivation from the identity code.
//!
//! The first six characters of an identity code encode the holder's birth
//! date as `YYMMDD`. Only the year is used.

use chrono::Datelike;
use trustlens_core::Scalar;

/// Two-digit years up to and including this value resolve to 20xx.
///
/// This is a fixed boundary, not "current year - 100". As the calendar moves
/// past 2023 it misclassifies people born in 2024 onwards as centenarians;
/// override it with [`IdentityAgeResolver::with_century_cutoff`] instead of
/// changing the default.
pub const DEFAULT_CENTURY_CUTOFF: u8 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityAgeResolver {
    century_cutoff: u8,
    reference_year: i32,
}

impl IdentityAgeResolver {
    /// A resolver computing ages relative to `reference_year`.
    pub fn new(reference_year: i32) -> Self {
        Self {
            century_cutoff: DEFAULT_CENTURY_CUTOFF,
            reference_year,
        }
    }

    /// A resolver relative to the local calendar year.
    pub fn current() -> Self {
        Self::new(chrono::Local::now().year())
    }

    pub fn with_century_cutoff(mut self, cutoff: u8) -> Self {
        self.century_cutoff = cutoff;
        self
    }

    pub fn century_cutoff(&self) -> u8 {
        self.century_cutoff
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Birth year encoded in `code`, or `None` when the code is too short or
    /// does not start with two digits.
    pub fn birth_year(&self, code: &str) -> Option<i32> {
        if code.chars().count() < 6 {
            return None;
        }
        let mut chars = code.chars();
        let tens = chars.next()?.to_digit(10)?;
        let ones = chars.next()?.to_digit(10)?;
        let prefix = (tens * 10 + ones) as i32;

        if prefix <= i32::from(self.century_cutoff) {
            Some(2000 + prefix)
        } else {
            Some(1900 + prefix)
        }
    }

    /// Age in whole calendar years. Day and month are ignored.
    pub fn age(&self, code: Option<&Scalar>) -> Option<i32> {
        let text = code?.as_text();
        if text.is_empty() {
            return None;
        }
        self.birth_year(&text).map(|year| self.reference_year - year)
    }
}

/// Fixed age partition used by the age distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket {
    Under20,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    SixtyPlus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 6] = [
        AgeBucket::Under20,
        AgeBucket::Twenties,
        AgeBucket::Thirties,
        AgeBucket::Forties,
        AgeBucket::Fifties,
        AgeBucket::SixtyPlus,
    ];

    pub fn for_age(age: i32) -> Self {
        match age {
            i32::MIN..=19 => AgeBucket::Under20,
            20..=29 => AgeBucket::Twenties,
            30..=39 => AgeBucket::Thirties,
            40..=49 => AgeBucket::Forties,
            50..=59 => AgeBucket::Fifties,
            _ => AgeBucket::SixtyPlus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Under20 => "< 20",
            AgeBucket::Twenties => "20-29",
            AgeBucket::Thirties => "30-39",
            AgeBucket::Forties => "40-49",
            AgeBucket::Fifties => "50-59",
            AgeBucket::SixtyPlus => "60+",
        }
    }

    /// Display sort key. "< 20" sorts first.
    pub fn lower_bound(&self) -> i32 {
        match self {
            AgeBucket::Under20 => 0,
            AgeBucket::Twenties => 20,
            AgeBucket::Thirties => 30,
            AgeBucket::Forties => 40,
            AgeBucket::Fifties => 50,
            AgeBucket::SixtyPlus => 60,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

impl std::fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Scalar {
        Scalar::from(s)
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(AgeBucket::for_age(19).label(), "< 20");
        assert_eq!(AgeBucket::for_age(20).label(), "20-29");
        assert_eq!(AgeBucket::for_age(59).label(), "50-59");
        assert_eq!(AgeBucket::for_age(60).label(), "60+");
        assert_eq!(AgeBucket::for_age(-3), AgeBucket::Under20);
    }

    #[test]
    fn century_cutoff_boundary() {
        let resolver = IdentityAgeResolver::new(2025);
        assert_eq!(resolver.birth_year("230101010101"), Some(2023));
        assert_eq!(resolver.birth_year("240101010101"), Some(1924));
        assert_eq!(resolver.birth_year("000101010101"), Some(2000));
        assert_eq!(resolver.birth_year("990101010101"), Some(1999));
    }

    #[test]
    fn cutoff_is_overridable() {
        let resolver = IdentityAgeResolver::new(2025).with_century_cutoff(30);
        assert_eq!(resolver.birth_year("250101010101"), Some(2025));
        assert_eq!(resolver.century_cutoff(), 30);
    }

    #[test]
    fn age_ignores_day_and_month() {
        let resolver = IdentityAgeResolver::new(2025);
        assert_eq!(resolver.age(Some(&code("901212012345"))), Some(35));
        assert_eq!(resolver.age(Some(&code("900101012345"))), Some(35));
    }

    #[test]
    fn numeric_codes_are_read_as_text() {
        let resolver = IdentityAgeResolver::new(2025);
        assert_eq!(resolver.age(Some(&Scalar::Number(920415023456.0))), Some(33));
    }

    #[test]
    fn invalid_codes_are_unavailable() {
        let resolver = IdentityAgeResolver::new(2025);
        assert_eq!(resolver.age(None), None);
        assert_eq!(resolver.age(Some(&code(""))), None);
        assert_eq!(resolver.age(Some(&code("90121"))), None);
        assert_eq!(resolver.age(Some(&code("A01212012345"))), None);
        assert_eq!(resolver.age(Some(&code("9X1212012345"))), None);
    }

    #[test]
    fn labels_roundtrip() {
        for bucket in AgeBucket::ALL {
            assert_eq!(AgeBucket::from_label(bucket.label()), Some(bucket));
        }
        assert_eq!(AgeBucket::from_label("70-79"), None);
    }
}
