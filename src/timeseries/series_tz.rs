use std::ops::Index;

use crate::interval::IntervalTzLike;

/// An ordered series of (interval, value) pairs in one timezone.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesTz<I: IntervalTzLike, V: Clone>(pub Vec<(I, V)>);

impl<I: IntervalTzLike, V: Clone> SeriesTz<I, V> {
    /// Creates a new, empty series.
    pub fn new() -> SeriesTz<I, V> {
        SeriesTz(Vec::new())
    }

    /// Returns the number of elements in the series.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the series contains no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pushes a (IntervalTzLike, V) tuple at the end of the series.
    pub fn push(&mut self, value: (I, V)) {
        if let Some(last) = self.0.last() {
            // check that you only push at the end of the timeseries
            if value.0.start() < last.0.end() {
                panic!("you can only push at the end of a timeseries!");
            }
            // check that timezones match
            if last.0.end().time_zone() != value.0.start().time_zone() {
                panic!("The observation that you add should be in the same timezone as existing observations.")
            }
        }
        self.0.push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (I, V)> {
        self.0.iter()
    }

    pub fn values(&self) -> Vec<V> {
        self.0.iter().map(|(_, v)| v.clone()).collect()
    }
}

impl<I: IntervalTzLike, V: Clone> SeriesTz<I, Option<V>> {
    /// Number of intervals without a value.
    pub fn count_missing(&self) -> usize {
        self.0.iter().filter(|(_, v)| v.is_none()).count()
    }
}

impl<I: IntervalTzLike, V: Clone> FromIterator<(I, V)> for SeriesTz<I, V> {
    fn from_iter<T: IntoIterator<Item = (I, V)>>(iter: T) -> Self {
        let mut ts = SeriesTz::new();
        for e in iter {
            ts.push(e);
        }
        ts
    }
}

impl<I: IntervalTzLike, V: Clone> IntoIterator for SeriesTz<I, V> {
    type Item = (I, V);
    type IntoIter = std::vec::IntoIter<(I, V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, I: IntervalTzLike, V: Clone> IntoIterator for &'a SeriesTz<I, V> {
    type Item = &'a (I, V);
    type IntoIter = std::slice::Iter<'a, (I, V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: IntervalTzLike, V: Clone> Index<usize> for SeriesTz<I, V> {
    type Output = (I, V);
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<I: IntervalTzLike, V: Clone> Default for SeriesTz<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, tz::TimeZone};

    use crate::interval::hour_tz::HourTz;

    use super::*;

    fn hours(n: usize) -> Vec<HourTz> {
        let tz = TimeZone::get("Europe/Brussels").unwrap();
        HourTz::hours_between(date(2017, 1, 1), date(2017, 1, 2), &tz)
            .unwrap()
            .into_iter()
            .take(n)
            .collect()
    }

    #[test]
    fn test_series() {
        let ts: SeriesTz<HourTz, f64> = hours(3).into_iter().map(|h| (h, 1.5)).collect();
        assert_eq!(ts.len(), 3);
        assert_eq!(ts.values(), vec![1.5, 1.5, 1.5]);
        assert_eq!(ts[1].0, hours(3)[1]);
    }

    #[test]
    fn test_count_missing() {
        let hs = hours(3);
        let ts: SeriesTz<HourTz, Option<f64>> = hs
            .into_iter()
            .zip([Some(1.0), None, Some(3.0)])
            .collect();
        assert_eq!(ts.count_missing(), 1);
    }

    #[test]
    #[should_panic(expected = "you can only push at the end of a timeseries!")]
    fn test_push_panic() {
        let hs = hours(2);
        let mut ts = SeriesTz::new();
        ts.push((hs[1].clone(), 1.0));
        ts.push((hs[0].clone(), 1.0));
    }
}
