//! Moody's long-term rating ladder.
//!
//! Rating codes are plain strings on [`Instrument`](super::model::Instrument)
//! because the sheet may carry codes outside the ladder; this module gives
//! them a total order: listed grades first (Aaa best → NR), then anything
//! unlisted in lexical order.

use std::cmp::Ordering;

/// The 21 grades the dashboard knows how to order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoodysGrade {
    Aaa = 1,
    Aa1 = 2,
    Aa2 = 3,
    Aa3 = 4,
    A1 = 5,
    A2 = 6,
    A3 = 7,
    Baa1 = 8,
    Baa2 = 9,
    Baa3 = 10,
    Ba1 = 11,
    Ba2 = 12,
    Ba3 = 13,
    B1 = 14,
    B2 = 15,
    B3 = 16,
    Caa1 = 17,
    Caa2 = 18,
    Caa3 = 19,
    Ca = 20,
    NotRated = 21,
}

impl MoodysGrade {
    pub const ALL: [MoodysGrade; 21] = [
        Self::Aaa,
        Self::Aa1,
        Self::Aa2,
        Self::Aa3,
        Self::A1,
        Self::A2,
        Self::A3,
        Self::Baa1,
        Self::Baa2,
        Self::Baa3,
        Self::Ba1,
        Self::Ba2,
        Self::Ba3,
        Self::B1,
        Self::B2,
        Self::B3,
        Self::Caa1,
        Self::Caa2,
        Self::Caa3,
        Self::Ca,
        Self::NotRated,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Aaa => "Aaa",
            Self::Aa1 => "Aa1",
            Self::Aa2 => "Aa2",
            Self::Aa3 => "Aa3",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::Baa1 => "Baa1",
            Self::Baa2 => "Baa2",
            Self::Baa3 => "Baa3",
            Self::Ba1 => "Ba1",
            Self::Ba2 => "Ba2",
            Self::Ba3 => "Ba3",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::B3 => "B3",
            Self::Caa1 => "Caa1",
            Self::Caa2 => "Caa2",
            Self::Caa3 => "Caa3",
            Self::Ca => "Ca",
            Self::NotRated => "NR",
        }
    }

    /// Exact, case-sensitive match on the Moody's code.
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }
}

/// Ladder order for raw codes; unlisted codes sort after NR.
pub fn compare_codes(a: &str, b: &str) -> Ordering {
    match (MoodysGrade::parse(a), MoodysGrade::parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Stable sort of `items` by the rating code `key` returns.
pub fn sort_by_rating<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_codes(key(a), key(b)));
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// An ordered subset of the ladder paired with a shuffled copy of it.
    fn ladder_subset() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
        let codes: Vec<&'static str> = MoodysGrade::ALL.iter().map(|g| g.code()).collect();
        proptest::sample::subsequence(codes, 0..=MoodysGrade::ALL.len())
            .prop_flat_map(|subset| (Just(subset.clone()), Just(subset).prop_shuffle()))
    }

    proptest! {
        #[test]
        fn sorting_any_subset_reproduces_ladder((expected, mut shuffled) in ladder_subset()) {
            sort_by_rating(&mut shuffled, |c| *c);
            prop_assert_eq!(shuffled, expected);
        }

        #[test]
        fn unlisted_codes_never_precede_listed_ones(
            (listed, _) in ladder_subset(),
            unlisted in proptest::collection::vec("[a-z]{1,3}", 0..5),
        ) {
            let mut codes: Vec<&str> = unlisted.iter().map(String::as_str).collect();
            codes.extend(listed.iter().copied());
            sort_by_rating(&mut codes, |c| *c);
            prop_assert_eq!(&codes[..listed.len()], &listed[..]);
        }
    }
}
