use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::str::FromStr;

use crate::columns::{find_column, Column};
use crate::job::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equals,
    Before,
    After,
}

/// Keeps the sessions whose value in `column` matches one of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

impl Filter {
    pub fn matches_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Values that parse as `YYYY-MM-DD`; the rest are skipped.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.values.iter().filter_map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|e| log::warn!("parsing filter value {}: {}", v, e))
                .ok()
        })
    }

    fn target_column(&self) -> Option<&'static Column> {
        find_column(&self.column)
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    // Examples:
    // "System=Pathfinder,Starfinder"
    // "Date>2018-01-01"
    // "Date<2019-01-01"
    fn from_str(s: &str) -> Result<Self> {
        let idx = s
            .find(['=', '<', '>'])
            .ok_or_else(|| anyhow!("Invalid filter {:?}. Use COLUMN=v1,v2, COLUMN<v or COLUMN>v", s))?;
        let (name, rest) = s.split_at(idx);
        let op = match &rest[..1] {
            "<" => FilterOp::Before,
            ">" => FilterOp::After,
            _ => FilterOp::Equals,
        };

        let column = find_column(name).ok_or_else(|| anyhow!("Unknown column: {}", name.trim()))?;
        if op != FilterOp::Equals && column.name != "Date" {
            return Err(anyhow!("Only Date supports < and >, got {}", column.name));
        }

        let values: Vec<String> = rest[1..]
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(anyhow!("Filter on {} has no values", column.name));
        }

        Ok(Filter {
            column: column.name.to_string(),
            op,
            values,
        })
    }
}

/// Sessions passing every filter, in their current order. A filter on a
/// column without a predicate passes everything.
pub fn apply_filters<'a>(sessions: &'a [Session], filters: &[Filter]) -> Vec<&'a Session> {
    sessions
        .iter()
        .filter(|session| {
            filters.iter().all(|filter| match filter.target_column().and_then(|c| c.select) {
                Some(select) => select(session, filter),
                None => {
                    log::debug!("have filter for column {} but column has no select fn", filter.column);
                    true
                }
            })
        })
        .collect()
}
