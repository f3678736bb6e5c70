//! Selection of a single scheme's NAV series from a fetched record set.

use crate::core::record::NavRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Sorted, distinct AMC names. Records published before any AMC header are left out.
pub fn amcs(records: &[NavRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.amc.as_str())
        .filter(|amc| !amc.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, distinct scheme names published under `amc`.
pub fn schemes<'a>(records: &'a [NavRecord], amc: &str) -> Vec<&'a str> {
    records
        .iter()
        .filter(|r| r.amc == amc)
        .map(|r| r.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

/// One observation per date, ascending, for a single scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct NavSeries {
    pub name: String,
    pub points: Vec<NavPoint>,
}

impl NavSeries {
    /// Builds the series for the scheme called `name`.
    ///
    /// Records without a NAV are dropped. When a date appears more than once
    /// the record fetched last wins.
    pub fn for_scheme(records: &[NavRecord], name: &str) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> = records
            .iter()
            .filter(|r| r.name == name)
            .filter_map(|r| r.nav.map(|nav| (r.date, nav)))
            .collect();

        NavSeries {
            name: name.to_string(),
            points: by_date
                .into_iter()
                .map(|(date, nav)| NavPoint { date, nav })
                .collect(),
        }
    }

    /// Keeps the points dated within `[from, to]`, either bound being optional.
    pub fn between(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        NavSeries {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|p| from.is_none_or(|from| p.date >= from))
                .filter(|p| to.is_none_or(|to| p.date <= to))
                .copied()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.nav).collect()
    }
}
