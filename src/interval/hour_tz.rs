use std::fmt::{self, Formatter};

use jiff::{civil::Date, tz::TimeZone, ToSpan, Zoned};

use crate::interval::IntervalTzLike;

#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Hash)]
pub struct HourTz {
    start: Zoned,
}

impl IntervalTzLike for HourTz {
    fn start(&self) -> Zoned {
        self.start.clone()
    }
    fn end(&self) -> Zoned {
        self.start.saturating_add(1.hours())
    }
}

impl HourTz {
    /// Return the hour that contains this datetime.
    pub fn containing(dt: &Zoned) -> Result<HourTz, jiff::Error> {
        let start = dt.with().minute(0).second(0).subsec_nanosecond(0).build()?;
        Ok(HourTz { start })
    }

    pub fn next(&self) -> HourTz {
        HourTz { start: self.end() }
    }

    /// All the hours from the start of `start` (inclusive) to the start of `end`
    /// (exclusive) in this timezone.  DST days have 23 or 25 hours.
    pub fn hours_between(start: Date, end: Date, tz: &TimeZone) -> Result<Vec<HourTz>, jiff::Error> {
        let first = start.at(0, 0, 0, 0).to_zoned(tz.clone())?;
        let last = end.at(0, 0, 0, 0).to_zoned(tz.clone())?;
        let mut out = Vec::new();
        let mut hour = HourTz { start: first };
        while hour.start < last {
            let next = hour.next();
            out.push(hour);
            hour = next;
        }
        Ok(out)
    }
}

impl fmt::Display for HourTz {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let out = format!(
            "[{}, {})",
            self.start.strftime("%Y-%m-%dT%H:%M:%S%:z"),
            self.end().strftime("%Y-%m-%dT%H:%M:%S%:z")
        );
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {

    use jiff::{civil::date, tz::TimeZone, Zoned};

    use crate::interval::{hour_tz::HourTz, IntervalTzLike};

    #[test]
    fn test_hourtz() {
        let dt = "2017-04-15T03:15:20[Europe/Brussels]"
            .parse::<Zoned>()
            .unwrap();
        let hour = HourTz::containing(&dt).unwrap();
        assert_eq!(hour.start().hour(), 3);
        assert_eq!(hour.start().minute(), 0);
        assert!(hour.start() <= dt && dt < hour.end());
        assert_eq!(
            hour.next(),
            HourTz {
                start: "2017-04-15T04:00:00[Europe/Brussels]"
                    .parse::<Zoned>()
                    .unwrap()
            }
        );
        assert_eq!(
            hour.to_string(),
            "[2017-04-15T03:00:00+02:00, 2017-04-15T04:00:00+02:00)"
        );
    }

    #[test]
    fn containing_keeps_the_fold_offset() {
        // second 02:30 of the fall back day, in CET
        let dt = "2017-10-29T02:30:00+01:00[Europe/Brussels]"
            .parse::<Zoned>()
            .unwrap();
        let hour = HourTz::containing(&dt).unwrap();
        assert_eq!(
            hour.to_string(),
            "[2017-10-29T02:00:00+01:00, 2017-10-29T03:00:00+01:00)"
        );
    }

    #[test]
    fn hours_between_dst_days() {
        let tz = TimeZone::get("Europe/Brussels").unwrap();
        let hours = HourTz::hours_between(date(2017, 1, 1), date(2017, 1, 2), &tz).unwrap();
        assert_eq!(hours.len(), 24);
        let hours = HourTz::hours_between(date(2017, 3, 26), date(2017, 3, 27), &tz).unwrap();
        assert_eq!(hours.len(), 23);
        let hours = HourTz::hours_between(date(2017, 10, 29), date(2017, 10, 30), &tz).unwrap();
        assert_eq!(hours.len(), 25);
        let hours = HourTz::hours_between(date(2017, 1, 1), date(2018, 1, 1), &tz).unwrap();
        assert_eq!(hours.len(), 8760);
    }
}
