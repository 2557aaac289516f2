use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use jiff::civil::{Date, DateTime};
use jiff::tz::{AmbiguousOffset, TimeZone};
use jiff::{Timestamp, Zoned};
use log::{info, warn};
use plotly::common::Mode;
use plotly::{Histogram, Plot, Scatter};

use crate::db::entsoe::record::{Frame, Row};
use crate::elec::data_kind::DataKind;
use crate::error::EtlError;
use crate::interval::{hour_tz::HourTz, IntervalTzLike};
use crate::timeseries::series_tz::SeriesTz;

/// Checks run on the combined view of a table before it is looked at.
#[derive(Debug, Clone)]
pub struct QualityCheck {
    pub tz: TimeZone,
    /// First day of the hourly calendar
    pub start: Date,
    /// Day after the last day of the hourly calendar
    pub end: Date,
    /// Where to write the html plots.  No plots if `None`.
    pub plot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub kind: DataKind,
    pub rows: usize,
    pub lower: f64,
    pub upper: f64,
    pub clipped: usize,
    pub calendar_hours: usize,
    pub missing_hours: usize,
}

impl QualityReport {
    pub fn has_gaps(&self) -> bool {
        self.missing_hours > 0
    }
}

impl QualityCheck {
    pub fn new(
        tz_name: &str,
        start: Date,
        end: Date,
        plot_dir: Option<PathBuf>,
    ) -> Result<QualityCheck, EtlError> {
        Ok(QualityCheck {
            tz: TimeZone::get(tz_name)?,
            start,
            end,
            plot_dir,
        })
    }

    /// Clip the values to the 1st and 99th percentiles, then check the
    /// clipped data against the hourly calendar.  Load data is averaged by
    /// hour first.  Gaps are reported, not fixed.
    pub fn run(&self, table: &str, combined: &Frame) -> Result<QualityReport, EtlError> {
        let values = combined.values();
        let (lower, upper) = match (percentile(&values, 1.0), percentile(&values, 99.0)) {
            (Some(lower), Some(upper)) => (lower, upper),
            _ => {
                return Err(EtlError::NoData {
                    table: table.to_string(),
                })
            }
        };
        let (clipped, n_clipped) = clip(combined, lower, upper);

        let localized = localize(&clipped, &self.tz)?;
        let calendar = HourTz::hours_between(self.start, self.end, &self.tz)?;
        let reindexed = match combined.kind {
            DataKind::Prices => reindex(
                localized.iter().map(|(z, v)| (z.timestamp(), *v)),
                &calendar,
            ),
            DataKind::Load => {
                let hourly = resample_hourly_mean(&localized)?;
                reindex(
                    hourly.iter().map(|(h, v)| (h.start().timestamp(), *v)),
                    &calendar,
                )
            }
        };

        let report = QualityReport {
            kind: combined.kind,
            rows: clipped.len(),
            lower,
            upper,
            clipped: n_clipped,
            calendar_hours: reindexed.len(),
            missing_hours: reindexed.count_missing(),
        };
        if report.has_gaps() {
            warn!(
                "table {} is missing {} of {} hours between {} and {}",
                table, report.missing_hours, report.calendar_hours, self.start, self.end
            );
        } else {
            info!("table {} has no missing hours", table);
        }

        if let Some(dir) = &self.plot_dir {
            plot(&clipped, dir, table)?;
        }
        Ok(report)
    }
}

/// Percentile with linear interpolation between the closest ranks, `q` in
/// [0, 100].  Return `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted: Vec<f64> = values.iter().copied().sorted_by(|a, b| a.total_cmp(b)).collect();
    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Pull the values outside of [lower, upper] to the closest bound.  Return
/// the clipped frame and how many values were changed.
pub fn clip(frame: &Frame, lower: f64, upper: f64) -> (Frame, usize) {
    let mut count = 0;
    let rows = frame
        .rows
        .iter()
        .map(|row| {
            let value = row.value.max(lower).min(upper);
            if value != row.value {
                count += 1;
            }
            Row {
                mtu: row.mtu,
                value,
            }
        })
        .collect();
    (
        Frame {
            kind: frame.kind,
            rows,
        },
        count,
    )
}

/// Attach the timezone to the local timestamps.
///
/// A local time that happens twice (fall back) gets the summer offset the
/// first time it shows up and the winter offset after that.  A local time
/// that doesn't exist (spring forward) is moved forward.
pub fn localize(frame: &Frame, tz: &TimeZone) -> Result<Vec<(Zoned, f64)>, EtlError> {
    let mut seen: HashMap<DateTime, usize> = HashMap::new();
    let mut out = Vec::with_capacity(frame.len());
    for row in &frame.rows {
        let ambiguous = tz.to_ambiguous_zoned(row.mtu);
        let zoned = match ambiguous.offset() {
            AmbiguousOffset::Fold { .. } => {
                let n = seen.entry(row.mtu).or_insert(0);
                *n += 1;
                if *n == 1 {
                    ambiguous.earlier()?
                } else {
                    ambiguous.later()?
                }
            }
            _ => ambiguous.compatible()?,
        };
        out.push((zoned, row.value));
    }
    Ok(out)
}

/// Average all the observations that start in the same hour.
pub fn resample_hourly_mean(obs: &[(Zoned, f64)]) -> Result<SeriesTz<HourTz, f64>, EtlError> {
    let mut groups: BTreeMap<Timestamp, (HourTz, f64, usize)> = BTreeMap::new();
    for (zoned, value) in obs {
        let hour = HourTz::containing(zoned)?;
        let e = groups
            .entry(hour.start().timestamp())
            .or_insert((hour, 0.0, 0));
        e.1 += value;
        e.2 += 1;
    }
    Ok(groups
        .into_values()
        .map(|(hour, sum, n)| (hour, sum / n as f64))
        .collect())
}

/// Line up the observations with the calendar, `None` where an hour has no
/// observation.  Observations off the calendar are ignored, a repeated
/// timestamp keeps the last value.
pub fn reindex<T>(obs: T, calendar: &[HourTz]) -> SeriesTz<HourTz, Option<f64>>
where
    T: IntoIterator<Item = (Timestamp, f64)>,
{
    let lookup: HashMap<Timestamp, f64> = obs.into_iter().collect();
    calendar
        .iter()
        .map(|hour| (hour.clone(), lookup.get(&hour.start().timestamp()).copied()))
        .collect()
}

/// Write a line plot and a 100 bin histogram of the values.
pub fn plot(frame: &Frame, dir: &Path, table: &str) -> Result<(), EtlError> {
    fs::create_dir_all(dir)?;
    let x: Vec<String> = frame.rows.iter().map(|r| r.mtu.to_string()).collect();

    let mut line = Plot::new();
    line.add_trace(
        Scatter::new(x, frame.values())
            .mode(Mode::Lines)
            .name(frame.value_column()),
    );
    fs::write(dir.join(format!("{}_line.html", table)), line.to_html())?;

    let mut hist = Plot::new();
    hist.add_trace(
        Histogram::new(frame.values())
            .n_bins_x(100)
            .name(frame.value_column()),
    );
    fs::write(dir.join(format!("{}_hist.html", table)), hist.to_html())?;
    info!("wrote plots for table {} into {}", table, dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use jiff::civil::date;
    use jiff::ToSpan;
    use tempfile::TempDir;

    use super::*;

    fn hourly_prices(start: DateTime, values: &[f64]) -> Frame {
        Frame {
            kind: DataKind::Prices,
            rows: values
                .iter()
                .enumerate()
                .map(|(i, v)| Row {
                    mtu: start + (i as i64).hours(),
                    value: *v,
                })
                .collect(),
        }
    }

    fn check(start: Date, end: Date, plot_dir: Option<PathBuf>) -> QualityCheck {
        QualityCheck::new("Europe/Brussels", start, end, plot_dir).unwrap()
    }

    #[test]
    fn percentiles() {
        let xs: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        assert!((percentile(&xs, 1.0).unwrap() - 1.99).abs() < 1e-9);
        assert!((percentile(&xs, 99.0).unwrap() - 99.01).abs() < 1e-9);
        assert_eq!(percentile(&xs, 0.0), Some(1.0));
        assert_eq!(percentile(&xs, 100.0), Some(100.0));
        assert_eq!(percentile(&[4.0], 1.0), Some(4.0));
        assert_eq!(percentile(&[], 1.0), None);
    }

    #[test]
    fn clip_one_to_hundred() {
        let xs: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let frame = hourly_prices(date(2017, 1, 1).at(0, 0, 0, 0), &xs);
        let lower = percentile(&xs, 1.0).unwrap();
        let upper = percentile(&xs, 99.0).unwrap();
        let (clipped, n) = clip(&frame, lower, upper);
        assert_eq!(clipped.len(), 100);
        assert_eq!(n, 2);
        assert!(clipped
            .values()
            .iter()
            .all(|v| *v >= 1.99 - 1e-9 && *v <= 99.01 + 1e-9));
        assert_eq!(clipped.index(), frame.index());
    }

    #[test]
    fn localize_fall_back() -> Result<(), Box<dyn Error>> {
        let tz = TimeZone::get("Europe/Brussels")?;
        let day = date(2017, 10, 29);
        let frame = Frame {
            kind: DataKind::Prices,
            rows: [1, 2, 2, 3]
                .iter()
                .map(|h| Row {
                    mtu: day.at(*h, 0, 0, 0),
                    value: 1.0,
                })
                .collect(),
        };
        let zoned = localize(&frame, &tz)?;
        let offsets: Vec<String> = zoned
            .iter()
            .map(|(z, _)| z.strftime("%H:%M%:z").to_string())
            .collect();
        assert_eq!(offsets, vec!["01:00+02:00", "02:00+02:00", "02:00+01:00", "03:00+01:00"]);
        assert!(zoned.windows(2).all(|w| w[0].0 < w[1].0));
        Ok(())
    }

    #[test]
    fn localize_spring_forward() -> Result<(), Box<dyn Error>> {
        let tz = TimeZone::get("Europe/Brussels")?;
        let frame = hourly_prices(date(2017, 3, 26).at(2, 0, 0, 0), &[1.0]);
        let zoned = localize(&frame, &tz)?;
        assert_eq!(zoned[0].0.strftime("%H:%M%:z").to_string(), "03:00+02:00");
        Ok(())
    }

    #[test]
    fn resample_quarter_hours() -> Result<(), Box<dyn Error>> {
        let tz = TimeZone::get("Europe/Brussels")?;
        let start = date(2017, 1, 1).at(0, 0, 0, 0);
        let frame = Frame {
            kind: DataKind::Load,
            rows: [10.0, 20.0, 30.0, 40.0, 50.0]
                .iter()
                .enumerate()
                .map(|(i, v)| Row {
                    mtu: start + (15 * i as i64).minutes(),
                    value: *v,
                })
                .collect(),
        };
        let hourly = resample_hourly_mean(&localize(&frame, &tz)?)?;
        assert_eq!(hourly.values(), vec![25.0, 50.0]);
        Ok(())
    }

    #[test]
    fn reindex_marks_gaps() -> Result<(), Box<dyn Error>> {
        let tz = TimeZone::get("Europe/Brussels")?;
        let calendar = HourTz::hours_between(date(2017, 1, 1), date(2017, 1, 2), &tz)?;
        let obs: Vec<(Timestamp, f64)> = calendar
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 5)
            .map(|(i, h)| (h.start().timestamp(), i as f64))
            .collect();
        let ts = reindex(obs, &calendar);
        assert_eq!(ts.len(), 24);
        assert_eq!(ts.count_missing(), 1);
        assert_eq!(ts[5].1, None);
        assert_eq!(ts[6].1, Some(6.0));
        Ok(())
    }

    #[test]
    fn complete_prices_have_no_gaps() -> Result<(), Box<dyn Error>> {
        let values: Vec<f64> = (0..24).map(|i| 30.0 + i as f64).collect();
        let frame = hourly_prices(date(2017, 1, 1).at(0, 0, 0, 0), &values);
        let report = check(date(2017, 1, 1), date(2017, 1, 2), None).run("DAMprice", &frame)?;
        assert_eq!(report.rows, 24);
        assert_eq!(report.calendar_hours, 24);
        assert!(!report.has_gaps());
        Ok(())
    }

    #[test]
    fn fall_back_day_prices() -> Result<(), Box<dyn Error>> {
        // 25 rows, the local 02:00 shows up twice
        let day = date(2017, 10, 29);
        let mut hours: Vec<i8> = (0..24).collect();
        hours.insert(3, 2);
        let frame = Frame {
            kind: DataKind::Prices,
            rows: hours
                .iter()
                .map(|h| Row {
                    mtu: day.at(*h, 0, 0, 0),
                    value: 40.0,
                })
                .collect(),
        };
        let report = check(day, date(2017, 10, 30), None).run("DAMprice", &frame)?;
        assert_eq!(report.calendar_hours, 25);
        assert_eq!(report.missing_hours, 0);
        Ok(())
    }

    #[test]
    fn load_with_a_missing_hour() -> Result<(), Box<dyn Error>> {
        let start = date(2017, 1, 1).at(0, 0, 0, 0);
        // quarter hours for the whole day except 10:00-11:00
        let rows: Vec<Row> = (0..96)
            .filter(|i| i / 4 != 10)
            .map(|i| Row {
                mtu: start + (15 * i as i64).minutes(),
                value: 40000.0 + i as f64,
            })
            .collect();
        let frame = Frame {
            kind: DataKind::Load,
            rows,
        };
        let dir = TempDir::new()?;
        let plots = dir.path().join("plots");
        let report = check(date(2017, 1, 1), date(2017, 1, 2), Some(plots.clone()))
            .run("load", &frame)?;
        assert_eq!(report.rows, 92);
        assert_eq!(report.calendar_hours, 24);
        assert_eq!(report.missing_hours, 1);
        assert!(plots.join("load_line.html").exists());
        assert!(plots.join("load_hist.html").exists());
        Ok(())
    }

    #[test]
    fn empty_view() {
        let res = check(date(2017, 1, 1), date(2017, 1, 2), None)
            .run("DAMprice", &Frame::new(DataKind::Prices));
        assert!(matches!(res, Err(EtlError::NoData { .. })));
    }
}
