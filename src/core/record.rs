//! NAV record types reconstructed from the report.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

/// Distribution channel of a scheme, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourcePlan {
    Direct,
    Regular,
    #[serde(rename = "")]
    Unspecified,
}

impl SourcePlan {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("direct") {
            SourcePlan::Direct
        } else if name.contains("regular") {
            SourcePlan::Regular
        } else {
            SourcePlan::Unspecified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlan::Direct => "Direct",
            SourcePlan::Regular => "Regular",
            SourcePlan::Unspecified => "",
        }
    }
}

impl Display for SourcePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout option of a scheme, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlanOption {
    Growth,
    #[serde(rename = "IDCW")]
    Idcw,
    #[serde(rename = "")]
    Unspecified,
}

impl PlanOption {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("growth") {
            PlanOption::Growth
        } else if name.contains("idcw") || name.contains("dividend") {
            PlanOption::Idcw
        } else {
            PlanOption::Unspecified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanOption::Growth => "Growth",
            PlanOption::Idcw => "IDCW",
            PlanOption::Unspecified => "",
        }
    }
}

impl Display for PlanOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One NAV observation with the fund group it was published under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavRecord {
    pub structure: String,
    pub category: String,
    pub sub_category: String,
    pub amc: String,
    pub code: u64,
    pub name: String,
    pub source_plan: SourcePlan,
    pub option: PlanOption,
    /// Effective date, a UTC calendar day.
    pub date: NaiveDate,
    pub nav: Option<f64>,
}
