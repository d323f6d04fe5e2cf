use crate::error::{CountlinesError, Result};
use crate::model::Release;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// A weekly tag such as `w.2017.10` or `w_2024_01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTag<'a> {
    pub prefix: &'a str,
    pub sep: char,
    pub year: i32,
    pub week: u32,
    /// Whether the week number was written with a leading zero.
    pub padded: bool,
}

impl<'a> WeeklyTag<'a> {
    pub fn parse(id: &'a str) -> Option<Self> {
        let sep = id.chars().find(|c| *c == '.' || *c == '_')?;
        let mut parts = id.split(sep);
        let prefix = parts.next()?;
        let year = parts.next()?;
        let week = parts.next()?;
        if parts.next().is_some() || prefix != "w" {
            return None;
        }
        if year.len() != 4 || week.is_empty() || week.len() > 2 {
            return None;
        }
        if !year.chars().chain(week.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let padded = week.len() == 2 && week.starts_with('0');
        let week: u32 = week.parse().ok()?;
        if !(1..=53).contains(&week) {
            return None;
        }
        Some(Self { prefix, sep, year, week, padded })
    }

    /// Monday of the tagged week; weeks the ISO calendar lacks count on from January 1st.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon).or_else(|| {
            let jan1 = NaiveDate::from_ymd_opt(self.year, 1, 1)?;
            jan1.checked_add_signed(Duration::weeks(i64::from(self.week) - 1))
        })
    }

    /// The following tag. `last_week` is the final week of this tag's year.
    fn next(&self, last_week: u32) -> Self {
        if self.week >= last_week {
            Self { year: self.year + 1, week: 1, ..*self }
        } else {
            Self { week: self.week + 1, ..*self }
        }
    }

    fn format(&self) -> String {
        if self.padded {
            format!("{}{sep}{}{sep}{:02}", self.prefix, self.year, self.week, sep = self.sep)
        } else {
            format!("{}{sep}{}{sep}{}", self.prefix, self.year, self.week, sep = self.sep)
        }
    }
}

fn weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|d| d.iso_week().week())
        .unwrap_or(52)
}

/// Derive a release date from tags like `w.2017.10`, `d.2024.01.15` or `2024-01-15`.
pub fn date_from_id(id: &str) -> Option<NaiveDate> {
    if let Some(tag) = WeeklyTag::parse(id) {
        return tag.date();
    }
    for fmt in ["d.%Y.%m.%d", "d_%Y_%m_%d", "%Y-%m-%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(id, fmt) {
            return Some(date);
        }
    }
    None
}

/// Expand `start..end` into every weekly tag in between, inclusive.
pub fn expand_range(start: &str, end: &str) -> Result<Vec<String>> {
    let from = WeeklyTag::parse(start).ok_or_else(|| {
        CountlinesError::InvalidRelease(format!("range start '{start}' is not a weekly tag"))
    })?;
    let to = WeeklyTag::parse(end).ok_or_else(|| {
        CountlinesError::InvalidRelease(format!("range end '{end}' is not a weekly tag"))
    })?;
    if from.prefix != to.prefix || from.sep != to.sep {
        return Err(CountlinesError::InvalidRelease(format!(
            "range ends '{start}' and '{end}' use different tag styles"
        )));
    }
    if (from.year, from.week) > (to.year, to.week) {
        return Err(CountlinesError::InvalidRelease(format!(
            "range start '{start}' is after end '{end}'"
        )));
    }

    let mut out = Vec::new();
    let mut cur = from;
    while (cur.year, cur.week) <= (to.year, to.week) {
        out.push(cur.format());
        // a 53rd week the ISO calendar lacks still counts when it ends the range
        let last_week = if cur.year == to.year {
            weeks_in_year(cur.year).max(to.week)
        } else {
            weeks_in_year(cur.year)
        };
        cur = cur.next(last_week);
    }
    Ok(out)
}

/// Expand one CLI argument: either a single identifier or an `A..B` weekly range.
pub fn expand_arg(arg: &str) -> Result<Vec<String>> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(CountlinesError::InvalidRelease("empty release identifier".into()));
    }
    match arg.split_once("..") {
        Some((start, end)) => expand_range(start, end),
        None => Ok(vec![arg.to_string()]),
    }
}

/// Parse a releases file: one identifier or range per line, `#` starts a comment.
pub fn parse_release_list(text: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        out.extend(expand_arg(line)?);
    }
    Ok(out)
}

/// Release identifiers from the command line and a releases file, falling back
/// to the configured list when neither is given.
pub fn collect(args: &[String], file: Option<&Path>, configured: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for arg in args {
        ids.extend(expand_arg(arg)?);
    }
    if let Some(path) = file {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CountlinesError::Config(format!("cannot read releases file {}: {e}", path.display()))
        })?;
        ids.extend(parse_release_list(&text)?);
    }
    if args.is_empty() && file.is_none() {
        for entry in configured {
            ids.extend(expand_arg(entry)?);
        }
    }
    Ok(ids)
}

/// Turn identifiers into releases, dropping repeats so each is counted once.
pub fn resolve<I, S>(ids: I) -> Vec<Release>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut releases = Vec::new();
    for id in ids {
        let id = id.as_ref();
        if !seen.insert(id.to_string()) {
            warn!(release = id, "duplicate release in list, counting it once");
            continue;
        }
        releases.push(Release::new(id));
    }
    releases
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn weekly_tags_parse_both_separators() {
        let dot = WeeklyTag::parse("w.2017.10").unwrap();
        assert_eq!((dot.year, dot.week, dot.sep), (2017, 10, '.'));
        let under = WeeklyTag::parse("w_2024_01").unwrap();
        assert_eq!((under.year, under.week, under.sep, under.padded), (2024, 1, '_', true));
        assert!(WeeklyTag::parse("10.1").is_none());
        assert!(WeeklyTag::parse("w.2017.60").is_none());
        assert!(WeeklyTag::parse("v.2017.10").is_none());
    }

    #[test]
    fn weekly_dates_are_iso_mondays() {
        assert_eq!(date_from_id("w_2024_01"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(date_from_id("w.2017.10"), NaiveDate::from_ymd_opt(2017, 3, 6));
        // 2016 has 52 ISO weeks
        assert_eq!(date_from_id("w.2016.53"), NaiveDate::from_ymd_opt(2016, 12, 30));
    }

    #[test]
    fn other_date_forms() {
        assert_eq!(date_from_id("d.2024.01.15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(date_from_id("2023-06-30"), NaiveDate::from_ymd_opt(2023, 6, 30));
        assert_eq!(date_from_id("10.1"), None);
        assert_eq!(date_from_id("8.0.0.0"), None);
    }

    #[test]
    fn range_crosses_year_boundary() {
        let tags = expand_range("w.2015.52", "w.2016.2").unwrap();
        assert_eq!(tags, vec!["w.2015.52", "w.2015.53", "w.2016.1", "w.2016.2"]);
    }

    #[test]
    fn range_reaches_week_past_iso_calendar() {
        let tags = expand_range("w.2016.51", "w.2016.53").unwrap();
        assert_eq!(tags, vec!["w.2016.51", "w.2016.52", "w.2016.53"]);
        // rolling over from an earlier year still follows the ISO count
        let tags = expand_range("w.2016.52", "w.2017.1").unwrap();
        assert_eq!(tags, vec!["w.2016.52", "w.2017.1"]);
    }

    #[test]
    fn signed_numbers_are_not_weekly_tags() {
        assert!(WeeklyTag::parse("w.2017.+1").is_none());
        assert!(WeeklyTag::parse("w.+201.10").is_none());
        assert!(WeeklyTag::parse("w.2017.-1").is_none());
    }

    #[test]
    fn range_keeps_padding() {
        let tags = expand_range("w_2024_08", "w_2024_10").unwrap();
        assert_eq!(tags, vec!["w_2024_08", "w_2024_09", "w_2024_10"]);
    }

    #[test]
    fn bad_ranges_are_rejected() {
        assert!(expand_range("w.2017.10", "w.2017.2").is_err());
        assert!(expand_range("w.2017.1", "w_2017_2").is_err());
        assert!(expand_range("10.0", "10.1").is_err());
    }

    #[test]
    fn release_list_skips_comments_and_blanks() {
        let text = "\n# weeklies\nw.2017.1..w.2017.2\n\n10.1  # old release\n";
        assert_eq!(
            parse_release_list(text).unwrap(),
            vec!["w.2017.1", "w.2017.2", "10.1"]
        );
    }

    #[test]
    fn configured_list_is_only_a_fallback() {
        let configured = vec!["w.2017.1..w.2017.3".to_string()];
        assert_eq!(collect(&[], None, &configured).unwrap().len(), 3);
        assert_eq!(
            collect(&["10.1".to_string()], None, &configured).unwrap(),
            vec!["10.1"]
        );
    }

    #[test]
    fn resolve_drops_duplicates() {
        let releases = resolve(["w.2017.1", "10.1", "w.2017.1"]);
        let ids: Vec<_> = releases.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["w.2017.1", "10.1"]);
        assert!(releases[0].date.is_some());
        assert!(releases[1].date.is_none());
    }
}
