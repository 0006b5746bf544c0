use anyhow::{Context, Result};
use comfy_table::Table;
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::Path;

use common::{apply_filters, columns, header_with_marks, resolve_column, AppState, RenderedTable, CSV_HEADER,
             GM_ONLY_CHARACTER};

/// Lays a rendered table out for the terminal, marking the sort column.
pub fn to_terminal_table(app: &AppState, table: &RenderedTable, superscript: bool) -> Table {
    let mut out = Table::new();
    out.set_header(header_with_marks(columns(), &app.sort));
    for row in &table.rows {
        out.add_row(row.iter().map(|cell| cell.to_styled(superscript)).collect::<Vec<_>>());
    }
    out
}

pub fn print_table<W: Write>(app: &AppState, superscript: bool, out: &mut W) -> Result<()> {
    match app.render() {
        Some(table) => {
            writeln!(out, "{}", to_terminal_table(app, &table, superscript))?;
            writeln!(out, "{} sessions", table.rows.len())?;
            let legend = character_legend(app);
            if !legend.is_empty() {
                writeln!(out, "Characters: {}", legend.join(", "))?;
            }
        }
        None => writeln!(out, "No job loaded.")?,
    }
    Ok(())
}

/// `number - name` for every character credited in the visible sessions,
/// by number. Numbers the job has no character record for are left out.
pub fn character_legend(app: &AppState) -> Vec<String> {
    let Some(job) = app.job.as_ref() else {
        return Vec::new();
    };
    let numbers: BTreeSet<i64> = apply_filters(&job.sessions, &app.filters)
        .iter()
        .flat_map(|s| s.characters.iter().filter_map(|c| c.as_int()))
        .filter(|&n| n != GM_ONLY_CHARACTER)
        .map(i64::abs)
        .collect();
    numbers
        .into_iter()
        .filter_map(|n| job.character_name(n).map(|name| format!("{} - {}", n, name)))
        .collect()
}

/// Writes the visible sessions, in their current order, as CSV.
pub fn write_csv<W: Write>(app: &AppState, writer: W) -> Result<usize> {
    let Some(job) = app.job.as_ref() else {
        return Ok(0);
    };
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;
    let visible = apply_filters(&job.sessions, &app.filters);
    for session in &visible {
        out.write_record(session.record())?;
    }
    out.flush()?;
    Ok(visible.len())
}

pub fn export_csv(app: &AppState, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("opening {:?} for writing", path))?;
    let written = write_csv(app, file)?;
    log::info!("wrote {} sessions to {:?}", written, path);
    Ok(())
}

/// Reads column names or positions and treats each as a header click, until
/// `q` or end of input.
pub fn interactive<R: BufRead, W: Write>(app: &mut AppState, superscript: bool, input: R, out: &mut W) -> Result<()> {
    let prompt = columns()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}={}", i + 1, c.name))
        .collect::<Vec<_>>()
        .join("  ");

    writeln!(out, "Sort by: {}  (q to quit)", prompt)?;
    for line in input.lines() {
        let line = line?;
        let choice = line.trim();
        if choice.is_empty() {
            continue;
        }
        if choice.eq_ignore_ascii_case("q") {
            break;
        }
        match resolve_column(choice) {
            Some(column) => match app.on_column_activated(column) {
                Some(table) => writeln!(out, "{}", to_terminal_table(app, &table, superscript))?,
                None => writeln!(out, "No job loaded.")?,
            },
            None => writeln!(out, "Unknown column: {}", choice)?,
        }
        writeln!(out, "Sort by: {}  (q to quit)", prompt)?;
    }
    Ok(())
}
