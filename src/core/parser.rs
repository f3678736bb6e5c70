//! Parser for the AMFI NAV history report.
//!
//! The report is a `;` delimited text feed without field names. Records are
//! grouped under category and AMC headers, and the grouping is only signalled
//! by marker lines (lines whose first field is empty):
//!
//! ```text
//! Open Ended Schemes(Debt Scheme - Banking and PSU Fund)
//!
//!
//! Aditya Birla Sun Life Mutual Fund
//!
//! 119551;Aditya Birla Sun Life Banking & PSU Debt Fund - DIRECT - IDCW;...;107.11;;;01-Apr-2025
//! ```
//!
//! A pair of identical adjacent marker lines promotes the line before the pair
//! to a category header. A marker line followed by a line naming a
//! "Mutual Fund" promotes that line to the current AMC. The first line of the
//! report is a title and the last line is a trailer; neither is parsed.

use crate::core::error::NavError;
use crate::core::range::DATE_FORMAT;
use crate::core::record::{NavRecord, PlanOption, SourcePlan};
use chrono::NaiveDate;
use tracing::{debug, trace};

const FIELD_SEPARATOR: char = ';';
const AMC_MARKER: &str = "Mutual Fund";

const CODE_FIELD: usize = 0;
const NAME_FIELD: usize = 1;
const NAV_FIELD: usize = 4;
const DATE_FIELD: usize = 7;

/// Fund structure and category decoded from a group header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHeader {
    pub structure: String,
    pub category: String,
    pub sub_category: String,
}

/// Header values carried forward onto every record that follows them.
#[derive(Debug, Default)]
struct GroupState {
    structure: String,
    category: String,
    sub_category: String,
    amc: String,
}

impl GroupState {
    fn set_category(&mut self, header: CategoryHeader) {
        debug!(
            structure = %header.structure,
            category = %header.category,
            sub_category = %header.sub_category,
            "Entering category group"
        );
        self.structure = header.structure;
        self.category = header.category;
        self.sub_category = header.sub_category;
    }

    fn set_amc(&mut self, line: &str) {
        let amc = line.trim();
        debug!(amc = %amc, "Entering AMC group");
        self.amc = amc.to_string();
    }
}

/// Parses the raw text of one report into NAV records, in line order.
///
/// Lines that do not decode are skipped; this never fails.
pub fn parse_report(text: &str) -> Vec<NavRecord> {
    let lines = split_lines(text);
    let mut state = GroupState::default();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    // The title (first) and trailer (last) lines are never visited.
    for j in 1..lines.len().saturating_sub(1) {
        let line = lines[j];
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        if fields[0].is_empty() {
            let next = lines[j + 1];
            if line == next {
                let previous = lines[j - 1];
                match parse_category_header(previous) {
                    Ok(header) => state.set_category(header),
                    Err(_) if previous.contains(AMC_MARKER) => state.set_amc(previous),
                    Err(e) => trace!(line = %previous, "Ignoring group header: {e}"),
                }
            } else if next.contains(AMC_MARKER) {
                state.set_amc(next);
            }
        } else if fields.len() > 1 {
            match parse_record_fields(&fields, &state) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    trace!(line = %line, "Skipping line: {e}");
                }
            }
        }
    }

    debug!(
        "Parsed {} records from {} lines ({} skipped)",
        records.len(),
        lines.len(),
        skipped
    );
    records
}

/// Decodes `Structure (Category - SubCategory)` or `Structure (Category)`.
pub fn parse_category_header(line: &str) -> Result<CategoryHeader, NavError> {
    let (structure, rest) = line
        .split_once('(')
        .ok_or_else(|| NavError::unparsable(format!("no '(' in header '{line}'")))?;

    let rest = rest.trim_end_matches(|c: char| c == FIELD_SEPARATOR || c.is_whitespace());
    let rest = rest.strip_suffix(')').unwrap_or(rest).trim();

    let (category, sub_category) = match rest.split_once('-') {
        Some((category, sub_category)) => (category.trim(), sub_category.trim()),
        None => (rest, ""),
    };

    let structure = structure.trim();
    if structure.is_empty() || category.is_empty() {
        return Err(NavError::unparsable(format!(
            "incomplete category header '{line}'"
        )));
    }

    Ok(CategoryHeader {
        structure: structure.to_string(),
        category: category.to_string(),
        sub_category: sub_category.to_string(),
    })
}

fn parse_record_fields(fields: &[&str], state: &GroupState) -> Result<NavRecord, NavError> {
    let field = |index: usize| {
        fields
            .get(index)
            .map(|f| f.trim())
            .ok_or_else(|| NavError::unparsable(format!("missing field {index}")))
    };

    let code = field(CODE_FIELD)?;
    let code = code
        .parse::<u64>()
        .map_err(|e| NavError::unparsable(format!("scheme code '{code}': {e}")))?;
    let name = field(NAME_FIELD)?;
    let nav = parse_nav(field(NAV_FIELD)?);
    let date = field(DATE_FIELD)?;
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| NavError::unparsable(format!("date '{date}': {e}")))?;

    Ok(NavRecord {
        structure: state.structure.clone(),
        category: state.category.clone(),
        sub_category: state.sub_category.clone(),
        amc: state.amc.clone(),
        code,
        name: name.to_string(),
        source_plan: SourcePlan::from_name(name),
        option: PlanOption::from_name(name),
        date,
        nav,
    })
}

/// Blank, non-numeric ("N.A.") and non-finite values have no NAV.
fn parse_nav(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|nav| nav.is_finite())
}

/// Splits on `\n`, dropping a trailing `\r`, and keeps a final empty line.
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
