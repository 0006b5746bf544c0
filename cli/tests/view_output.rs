use std::io::Cursor;

use serde_json::json;

use common::{parse_job, AppState, Job, SortState};
use jobdash::view::{character_legend, interactive, print_table, write_csv};

fn job() -> Job {
    parse_job(&json!({
        "JobId": "j1",
        "State": "done",
        "JobDate": "2019-01-01T00:00:00Z",
        "Sessions": [
            {"Date": "2018-03-01T00:00:00Z", "Season": 2, "ScenarioName": "Bravo", "Game": "Pathfinder", "Player": true, "Character": [-7]},
            {"Date": "2018-01-01T00:00:00Z", "Season": 3, "ScenarioName": "Alpha", "Game": "Starfinder", "GM": true},
            {"Date": "2018-02-01T00:00:00Z", "Season": 1, "ScenarioName": "Charlie", "Game": "Pathfinder", "Player": true}
        ],
        "Messages": [],
        "Characters": [
            {"System": 1, "Number": 7, "Name": "Val", "Faction": "Exchange"},
            {"System": 1, "Number": 12, "Name": "Kim", "Faction": "Scarab Sages"}
        ]
    }))
    .unwrap()
}

fn loaded(filters: &[&str]) -> AppState {
    let filters = filters.iter().map(|f| f.parse().unwrap()).collect();
    let mut app = AppState::new(SortState::default(), filters);
    app.load_job(job());
    app.apply_sort();
    app
}

fn scenario_names(app: &AppState) -> Vec<String> {
    app.job
        .as_ref()
        .unwrap()
        .sessions
        .iter()
        .map(|s| s.scenario_name.clone())
        .collect()
}

#[test]
fn test_print_without_job() {
    let app = AppState::default();
    let mut out = Vec::new();
    print_table(&app, true, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "No job loaded.\n");
}

#[test]
fn test_print_marks_sort_column() {
    let app = loaded(&[]);
    let mut out = Vec::new();
    print_table(&app, false, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Date ▲"));
    assert!(text.contains("Charlie"));
    assert!(text.contains("3 sessions\n"));
}

#[test]
fn test_print_names_gm_credited_character() {
    let app = loaded(&[]);
    let mut out = Vec::new();
    print_table(&app, false, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("7^GM"));
    assert!(text.ends_with("3 sessions\nCharacters: 7 - Val\n"));
}

#[test]
fn test_legend_follows_filters() {
    assert_eq!(character_legend(&loaded(&["Character=7"])), vec!["7 - Val"]);
    assert!(character_legend(&loaded(&["System=Starfinder"])).is_empty());
    assert!(character_legend(&AppState::default()).is_empty());
}

#[test]
fn test_csv_follows_order_and_filters() {
    let app = loaded(&["System=Pathfinder"]);
    let mut out = Vec::new();
    let written = write_csv(&app, &mut out).unwrap();
    assert_eq!(written, 2);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Date,Event Number,Character Number"));
    assert!(lines[1].starts_with("2018-02-01,"));
    assert!(lines[1].contains("Charlie"));
    assert!(lines[2].starts_with("2018-03-01,"));
    assert!(lines[2].ends_with(",P"));
}

#[test]
fn test_csv_without_job_writes_nothing() {
    let app = AppState::default();
    let mut out = Vec::new();
    assert_eq!(write_csv(&app, &mut out).unwrap(), 0);
    assert!(out.is_empty());
}

#[test]
fn test_interactive_clicks_by_name_and_number() {
    let mut app = loaded(&[]);
    let input = Cursor::new("season\n\n5\nq\nDate\n");
    let mut out = Vec::new();

    interactive(&mut app, false, input, &mut out).unwrap();

    assert_eq!(app.sort.column, "Season");
    assert!(!app.sort.ascending);
    assert_eq!(scenario_names(&app), vec!["Alpha", "Bravo", "Charlie"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Season ▼"));
    // input after q is never read
    assert!(!text.contains("Date ▼"));
}

#[test]
fn test_interactive_reports_unknown_column() {
    let mut app = loaded(&[]);
    let mut out = Vec::new();

    interactive(&mut app, false, Cursor::new("Dice\n42\n"), &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Unknown column: Dice"));
    assert!(text.contains("Unknown column: 42"));
    assert_eq!(app.sort, SortState::default());
}
