use crate::model::{CountRow, Metric, ResultsTable};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const TOTAL_SERIES: &str = "All languages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Language,
    Total,
}

/// How releases are placed along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XAxis {
    /// Days since the common era; every release has a date.
    Date,
    /// Position in first-appearance order; used when some release is undated.
    Ordinal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub release: String,
    pub date: Option<NaiveDate>,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub release: String,
    pub x: f64,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub metric: Metric,
    pub group_by: GroupBy,
    pub axis: XAxis,
    pub ticks: Vec<Tick>,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// X range covering every release, widened when there is a single one.
    pub fn x_bounds(&self) -> (f64, f64) {
        let min = self.ticks.first().map(|t| t.x).unwrap_or(0.0);
        let max = self.ticks.last().map(|t| t.x).unwrap_or(0.0);
        if max > min {
            (min, max)
        } else {
            let pad = match self.axis {
                XAxis::Date => 7.0,
                XAxis::Ordinal => 1.0,
            };
            (min - pad, max + pad)
        }
    }

    pub fn max_value(&self) -> u64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.value))
            .max()
            .unwrap_or(0)
    }

    /// Axis label for an x position.
    pub fn label_for(&self, x: f64) -> String {
        match self.axis {
            XAxis::Date => NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            XAxis::Ordinal => {
                if (x - x.round()).abs() > f64::EPSILON || x < 0.0 {
                    return String::new();
                }
                self.ticks
                    .get(x.round() as usize)
                    .map(|t| t.release.clone())
                    .unwrap_or_default()
            }
        }
    }
}

struct ReleaseInfo<'a> {
    id: &'a str,
    date: Option<NaiveDate>,
    first_seen: usize,
}

/// Group rows into one series per language (or one total series) ordered by release date.
///
/// When a (release, language) pair appears more than once the later row wins.
pub fn build_chart(
    table: &ResultsTable,
    metric: Metric,
    group_by: GroupBy,
    languages: &[String],
) -> Chart {
    let wanted = |row: &CountRow| {
        languages.is_empty() || languages.iter().any(|l| l.eq_ignore_ascii_case(&row.language))
    };

    let mut latest: HashMap<(&str, &str), &CountRow> = HashMap::new();
    let mut infos: Vec<ReleaseInfo> = Vec::new();
    let mut info_idx: HashMap<&str, usize> = HashMap::new();

    for row in table.rows().iter().filter(|r| wanted(*r)) {
        latest.insert(row.key(), row);
        match info_idx.get(row.release.as_str()) {
            Some(&idx) => {
                if infos[idx].date.is_none() {
                    infos[idx].date = row.date;
                }
            }
            None => {
                info_idx.insert(&row.release, infos.len());
                infos.push(ReleaseInfo {
                    id: &row.release,
                    date: row.date,
                    first_seen: infos.len(),
                });
            }
        }
    }

    let axis = if !infos.is_empty() && infos.iter().all(|i| i.date.is_some()) {
        infos.sort_by_key(|i| (i.date, i.first_seen));
        XAxis::Date
    } else {
        XAxis::Ordinal
    };

    let ticks: Vec<Tick> = infos
        .iter()
        .enumerate()
        .map(|(pos, info)| Tick {
            release: info.id.to_string(),
            date: info.date,
            x: match (axis, info.date) {
                (XAxis::Date, Some(d)) => f64::from(d.num_days_from_ce()),
                _ => pos as f64,
            },
        })
        .collect();
    let position: HashMap<&str, usize> =
        infos.iter().enumerate().map(|(pos, i)| (i.id, pos)).collect();

    let mut groups: BTreeMap<String, BTreeMap<usize, u64>> = BTreeMap::new();
    for (&(release, language), row) in &latest {
        let name = match group_by {
            GroupBy::Language => language.to_string(),
            GroupBy::Total => TOTAL_SERIES.to_string(),
        };
        let pos = position[release];
        *groups.entry(name).or_default().entry(pos).or_insert(0) += metric.value(row);
    }

    let series = groups
        .into_iter()
        .map(|(name, values)| Series {
            name,
            points: values
                .into_iter()
                .map(|(pos, value)| Point {
                    release: ticks[pos].release.clone(),
                    x: ticks[pos].x,
                    value,
                })
                .collect(),
        })
        .collect();

    Chart {
        metric,
        group_by,
        axis,
        ticks,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(release: &str, language: &str, code: u64) -> CountRow {
        CountRow {
            release: release.to_string(),
            date: crate::release::date_from_id(release),
            language: language.to_string(),
            files: 1,
            blank: 2,
            comment: 3,
            code,
        }
    }

    #[test]
    fn two_releases_one_language_ascending() {
        let table = ResultsTable::from_rows(vec![
            row("w.2018.10", "Python", 200),
            row("w.2017.10", "Python", 100),
        ]);
        let chart = build_chart(&table, Metric::Code, GroupBy::Language, &[]);
        assert_eq!(chart.axis, XAxis::Date);
        assert_eq!(chart.series.len(), 1);
        let values: Vec<_> = chart.series[0]
            .points
            .iter()
            .map(|p| (p.release.as_str(), p.value))
            .collect();
        assert_eq!(values, vec![("w.2017.10", 100), ("w.2018.10", 200)]);
        assert!(chart.series[0].points[0].x < chart.series[0].points[1].x);
    }

    #[test]
    fn total_sums_languages() {
        let table = ResultsTable::from_rows(vec![
            row("w.2017.10", "Python", 100),
            row("w.2017.10", "C++", 50),
            row("w.2017.11", "Python", 110),
        ]);
        let chart = build_chart(&table, Metric::Code, GroupBy::Total, &[]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, TOTAL_SERIES);
        let values: Vec<_> = chart.series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![150, 110]);
    }

    #[test]
    fn undated_releases_use_table_order() {
        let table = ResultsTable::from_rows(vec![
            row("10.0", "Python", 10),
            row("w.2017.10", "Python", 20),
            row("9.2", "Python", 5),
        ]);
        let chart = build_chart(&table, Metric::Code, GroupBy::Language, &[]);
        assert_eq!(chart.axis, XAxis::Ordinal);
        let order: Vec<_> = chart.ticks.iter().map(|t| t.release.as_str()).collect();
        assert_eq!(order, vec!["10.0", "w.2017.10", "9.2"]);
        assert_eq!(chart.label_for(2.0), "9.2");
        assert_eq!(chart.label_for(0.5), "");
    }

    #[test]
    fn language_filter_and_last_row_wins() {
        let table = ResultsTable::from_rows(vec![
            row("w.2017.10", "Python", 100),
            row("w.2017.10", "C++", 50),
            row("w.2017.10", "Python", 120),
        ]);
        let chart = build_chart(&table, Metric::Code, GroupBy::Language, &["python".to_string()]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points.len(), 1);
        assert_eq!(chart.series[0].points[0].value, 120);
    }

    #[test]
    fn empty_table_gives_empty_chart() {
        let chart = build_chart(&ResultsTable::new(), Metric::Code, GroupBy::Language, &[]);
        assert!(chart.is_empty());
        assert_eq!(chart.x_bounds(), (-1.0, 1.0));
    }
}
