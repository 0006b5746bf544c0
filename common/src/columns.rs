//! Column registry: header label, cell renderer, comparator and filter per column.

use std::cmp::Ordering;

use crate::filter::{Filter, FilterOp};
use crate::job::{IntValue, Session, SessionDate};
use crate::render::Fragment;

pub type RenderFn = fn(&Session) -> Fragment;
pub type CompareFn = fn(&Session, &Session, bool) -> Ordering;
pub type SelectFn = fn(&Session, &Filter) -> bool;

#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub render: RenderFn,
    pub compare: CompareFn,
    pub select: Option<SelectFn>,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("name", &self.name).finish()
    }
}

pub static COLUMNS: [Column; 9] = [
    Column {
        name: "Date",
        render: render_date,
        compare: compare_date,
        select: Some(select_date),
    },
    Column {
        name: "System",
        render: |s| Fragment::text(s.game.clone()),
        compare: |a, b, _| locale_compare(&a.game, &b.game),
        select: Some(|s: &Session, f: &Filter| f.matches_value(&s.game)),
    },
    Column {
        name: "Event #",
        render: render_event_numbers,
        compare: |a, b, ascending| {
            representative(&a.event_numbers, ascending, |n| n)
                .cmp(&representative(&b.event_numbers, ascending, |n| n))
        },
        select: Some(|s: &Session, f: &Filter| s.event_numbers.iter().any(|e| f.matches_value(&e.to_string()))),
    },
    Column {
        name: "Character",
        render: render_characters,
        compare: |a, b, ascending| {
            representative(&a.characters, ascending, i64::abs)
                .cmp(&representative(&b.characters, ascending, i64::abs))
        },
        select: Some(select_character),
    },
    Column {
        name: "Season",
        render: |s| Fragment::text(display_count(&s.season)),
        compare: |a, b, _| compare_int_values(&a.season, &b.season),
        select: Some(|s: &Session, f: &Filter| f.matches_value(&s.season.to_string())),
    },
    Column {
        name: "Number",
        render: |s| Fragment::text(display_count(&s.number)),
        compare: |a, b, _| compare_int_values(&a.number, &b.number),
        select: Some(|s: &Session, f: &Filter| f.matches_value(&s.number.to_string())),
    },
    Column {
        name: "Variant",
        render: |s| Fragment::text(s.variant.clone()),
        compare: |a, b, _| locale_compare(&a.variant, &b.variant),
        select: Some(|s: &Session, f: &Filter| f.matches_value(&s.variant)),
    },
    Column {
        name: "Scenario Name",
        render: |s| Fragment::text(s.scenario_name.clone()),
        compare: |a, b, _| locale_compare(&a.scenario_name, &b.scenario_name),
        select: Some(|s: &Session, f: &Filter| f.matches_value(&s.scenario_name)),
    },
    Column {
        name: "Player/GM",
        render: |s| Fragment::text(s.role_label()),
        compare: |a, b, _| a.role_weight().cmp(&b.role_weight()),
        select: Some(|s: &Session, f: &Filter| f.matches_value(s.role_label())),
    },
];

pub fn columns() -> &'static [Column] {
    &COLUMNS
}

/// Looks a column up by name, ignoring case.
pub fn find_column(name: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Resolves user input to a column: a 1-based position or a name.
pub fn resolve_column(input: &str) -> Option<&'static Column> {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 => COLUMNS.get(n - 1),
        Ok(_) => None,
        Err(_) => find_column(input),
    }
}

fn render_date(session: &Session) -> Fragment {
    match session.date {
        SessionDate::Known(d) => Fragment::text(d.format("%Y-%m-%d").to_string()),
        SessionDate::Missing => Fragment::text("(missing)"),
    }
}

fn compare_date(a: &Session, b: &Session, _ascending: bool) -> Ordering {
    a.date.cmp(&b.date)
}

fn select_date(session: &Session, filter: &Filter) -> bool {
    let Some(date) = session.date.known() else {
        return false;
    };
    let day = date.date_naive();
    filter.dates().any(|bound| match filter.op {
        FilterOp::Before => day < bound,
        FilterOp::After => day > bound,
        FilterOp::Equals => day == bound,
    })
}

fn render_event_numbers(session: &Session) -> Fragment {
    let text = session
        .event_numbers
        .iter()
        .map(|e| match e {
            IntValue::Int(n) => n.to_string(),
            IntValue::Raw(_) => "(missing)".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    Fragment::Text(text)
}

fn render_characters(session: &Session) -> Fragment {
    let mut parts = Vec::new();
    for (i, character) in session.characters.iter().enumerate() {
        if i > 0 {
            parts.push(Fragment::text(", "));
        }
        match character {
            IntValue::Int(n) => {
                parts.push(Fragment::text(n.abs().to_string()));
                if *n < 0 {
                    parts.push(Fragment::Sup("GM".to_string()));
                }
            }
            IntValue::Raw(raw) => parts.push(Fragment::text(raw.clone())),
        }
    }
    Fragment::Span(parts)
}

fn select_character(session: &Session, filter: &Filter) -> bool {
    session
        .characters
        .iter()
        .filter_map(IntValue::as_int)
        .any(|c| filter.matches_value(&c.abs().to_string()))
}

/// Negative seasons and numbers mark scenarios that have none.
fn display_count(value: &IntValue) -> String {
    match value {
        IntValue::Int(n) if *n < 0 => "N/A".to_string(),
        other => other.to_string(),
    }
}

/// The value a multi-valued cell sorts by: its minimum when ascending, its
/// maximum when descending. Raw tokens take no part; a row without any
/// number has no key and orders before rows that have one.
fn representative(values: &[IntValue], ascending: bool, key: fn(i64) -> i64) -> Option<i64> {
    let numbers = values.iter().filter_map(IntValue::as_int).map(key);
    if ascending {
        numbers.min()
    } else {
        numbers.max()
    }
}

/// Numbers order numerically and before raw tokens; raw tokens order as text.
fn compare_int_values(a: &IntValue, b: &IntValue) -> Ordering {
    match (a, b) {
        (IntValue::Int(x), IntValue::Int(y)) => x.cmp(y),
        (IntValue::Int(_), IntValue::Raw(_)) => Ordering::Less,
        (IntValue::Raw(_), IntValue::Int(_)) => Ordering::Greater,
        (IntValue::Raw(x), IntValue::Raw(y)) => locale_compare(x, y),
    }
}

/// Case-insensitive ordering with an exact comparison as the tie-break, so
/// "apple" sits next to "Apple" instead of after "Zebra".
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
