//! Grouping of sorted entries by project and by half-month period.
//!
//! Iteration order is always first-seen order in the sorted sequence. The
//! `OrderedGroups` container makes that a property of the type instead of
//! an accident of whichever map happens to be used.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::hash::Hash;
use timesheet_core::{ProjectName, TimeEntryRow};

/// Ordered mapping from key to the values pushed under it
#[derive(Clone, Debug)]
pub struct OrderedGroups<K, V> {
    entries: Vec<(K, Vec<V>)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for OrderedGroups<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> OrderedGroups<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; a new key goes after every existing key
    pub fn push(&mut self, key: K, value: V) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1.push(value);
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, vec![value]));
        }
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.index.get(key).map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(key, values)| (key, values.as_slice()))
    }

    /// Number of values across all groups
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for OrderedGroups<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (key, value) in iter {
            groups.push(key, value);
        }
        groups
    }
}

/// Entries of each project, in first-seen project order
pub type ProjectGroups<'a> = OrderedGroups<ProjectName, &'a TimeEntryRow>;

/// Group sorted entries by project in one pass
pub fn group_by_project<'a>(rows: impl IntoIterator<Item = &'a TimeEntryRow>) -> ProjectGroups<'a> {
    rows.into_iter().map(|row| (row.project.clone(), row)).collect()
}

// ============================================================================
// Half-month periods
// ============================================================================

/// One of the two half-month buckets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    /// Days 1 to 15
    FirstHalf,
    /// Day 16 to the last day of the month
    SecondHalf,
}

impl PeriodKey {
    /// Buckets in report order
    pub const ALL: [Self; 2] = [Self::FirstHalf, Self::SecondHalf];

    pub const fn for_day(day: u32) -> Self {
        if day <= 15 {
            Self::FirstHalf
        } else {
            Self::SecondHalf
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstHalf => "01–15",
            Self::SecondHalf => "16–end",
        }
    }

    /// Banner text with the literal date range of the bucket in the month of `reference`
    pub fn title(self, reference: NaiveDate) -> String {
        let (month, year) = (reference.month(), reference.year());
        let (first, last) = match self {
            Self::FirstHalf => (1, 15),
            Self::SecondHalf => (16, last_day_of_month(year, month)),
        };
        format!("Period: {first:02}.{month:02}.{year} – {last:02}.{month:02}.{year}")
    }
}

/// Number of days in a month
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Project groups inside each half-month bucket
#[derive(Clone, Debug, Default)]
pub struct PeriodGroups<'a> {
    pub first_half: ProjectGroups<'a>,
    pub second_half: ProjectGroups<'a>,
    /// Undated rows left out of both buckets
    pub excluded: usize,
}

impl<'a> PeriodGroups<'a> {
    pub fn get(&self, key: PeriodKey) -> &ProjectGroups<'a> {
        match key {
            PeriodKey::FirstHalf => &self.first_half,
            PeriodKey::SecondHalf => &self.second_half,
        }
    }

    /// Both buckets, "01–15" first
    pub fn iter(&self) -> impl Iterator<Item = (PeriodKey, &ProjectGroups<'a>)> {
        PeriodKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

/// Bucket dated entries by half-month, then group each bucket by project.
///
/// Undated entries are excluded.
pub fn group_by_period<'a>(rows: impl IntoIterator<Item = &'a TimeEntryRow>) -> PeriodGroups<'a> {
    let mut groups = PeriodGroups::default();
    for row in rows {
        let Some(date) = row.date else {
            groups.excluded += 1;
            continue;
        };
        let bucket = match PeriodKey::for_day(date.day()) {
            PeriodKey::FirstHalf => &mut groups.first_half,
            PeriodKey::SecondHalf => &mut groups.second_half,
        };
        bucket.push(row.project.clone(), row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(project: &str, task: &str, day: Option<u32>) -> TimeEntryRow {
        let row = TimeEntryRow::new(project, task).hours(1.0);
        match day {
            Some(d) => row.date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(0, 0, 0).unwrap()),
            None => row,
        }
    }

    #[test]
    fn ordered_groups_keep_first_seen_order() {
        let groups: OrderedGroups<&str, u32> =
            vec![("zeta", 1), ("alpha", 2), ("zeta", 3), ("mid", 4)].into_iter().collect();
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(groups.get(&"zeta"), Some(&[1, 3][..]));
        assert_eq!(groups.value_count(), 4);
        assert!(groups.get(&"missing").is_none());
    }

    #[test]
    fn project_grouping_is_not_alphabetical() {
        let rows = vec![entry("Zulu", "1", Some(1)), entry("Alpha", "2", Some(2)), entry("Zulu", "3", Some(3))];
        let groups = group_by_project(&rows);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zulu", "Alpha"]);
        assert_eq!(groups.get(&"Zulu".to_string()).map(<[_]>::len), Some(2));
    }

    #[test]
    fn period_boundary_days() {
        assert_eq!(PeriodKey::for_day(1), PeriodKey::FirstHalf);
        assert_eq!(PeriodKey::for_day(15), PeriodKey::FirstHalf);
        assert_eq!(PeriodKey::for_day(16), PeriodKey::SecondHalf);
        assert_eq!(PeriodKey::for_day(31), PeriodKey::SecondHalf);
    }

    #[test]
    fn period_grouping_excludes_undated() {
        let rows = vec![
            entry("A", "1", Some(15)),
            entry("B", "2", Some(16)),
            entry("A", "3", None),
            entry("B", "4", Some(2)),
        ];
        let groups = group_by_period(&rows);
        assert_eq!(groups.excluded, 1);
        assert_eq!(groups.first_half.keys().map(String::as_str).collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(groups.second_half.keys().map(String::as_str).collect::<Vec<_>>(), vec!["B"]);
        let order: Vec<PeriodKey> = groups.iter().map(|(key, _)| key).collect();
        assert_eq!(order, PeriodKey::ALL.to_vec());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2023, 2), 28);
        assert_eq!(last_day_of_month(2100, 2), 28);
        assert_eq!(last_day_of_month(2024, 4), 30);
        assert_eq!(last_day_of_month(2024, 12), 31);
    }

    #[test]
    fn period_titles() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        assert_eq!(PeriodKey::FirstHalf.title(feb), "Period: 01.02.2024 – 15.02.2024");
        assert_eq!(PeriodKey::SecondHalf.title(feb), "Period: 16.02.2024 – 29.02.2024");
        let sep = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        assert_eq!(PeriodKey::SecondHalf.title(sep), "Period: 16.09.2023 – 30.09.2023");
    }

    #[test]
    fn labels() {
        assert_eq!(PeriodKey::FirstHalf.label(), "01–15");
        assert_eq!(PeriodKey::SecondHalf.label(), "16–end");
    }
}
