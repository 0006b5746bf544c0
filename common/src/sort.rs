use crate::columns::Column;
use crate::job::Session;

pub const DEFAULT_SORT_COLUMN: &str = "Date";

/// The active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN.to_string(),
            ascending: true,
        }
    }
}

impl SortState {
    /// A header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn activate(&mut self, column: &Column) {
        if self.column == column.name {
            self.ascending = !self.ascending;
        } else {
            self.column = column.name.to_string();
            self.ascending = true;
        }
    }
}

/// Stable sort by `column`. Descending swaps the operands and hands the
/// comparator `false`, which is what makes multi-valued columns switch from
/// their minimum to their maximum instead of just reversing.
pub fn sort_sessions(sessions: &mut [Session], column: &Column, ascending: bool) {
    sessions.sort_by(|a, b| {
        if ascending {
            (column.compare)(a, b, true)
        } else {
            (column.compare)(b, a, false)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::find_column;
    use serde_json::json;

    fn events(sets: &[serde_json::Value]) -> Vec<Session> {
        sets.iter()
            .map(|e| Session::from_value(&json!({"EventNumber": e, "ScenarioName": e.to_string()})))
            .collect()
    }

    fn names(sessions: &[Session]) -> Vec<String> {
        sessions.iter().map(|s| s.scenario_name.clone()).collect()
    }

    #[test]
    fn test_activate_toggles_same_column() {
        let date = find_column("Date").unwrap();
        let season = find_column("Season").unwrap();
        let mut sort = SortState::default();

        sort.activate(date);
        assert!(!sort.ascending);
        sort.activate(date);
        assert!(sort.ascending);

        sort.activate(season);
        assert_eq!(sort.column, "Season");
        assert!(sort.ascending);
    }

    #[test]
    fn test_different_column_always_starts_ascending() {
        let season = find_column("Season").unwrap();
        let number = find_column("Number").unwrap();
        let mut sort = SortState::default();
        sort.activate(season);
        sort.activate(season);
        assert!(!sort.ascending);
        sort.activate(number);
        assert!(sort.ascending);
    }

    #[test]
    fn test_min_max_tie_break_literal_sets() {
        let column = find_column("Event #").unwrap();
        let mut sessions = events(&[json!([3, 7]), json!([1, 9])]);

        sort_sessions(&mut sessions, column, true);
        assert_eq!(names(&sessions), vec!["[1,9]", "[3,7]"]);

        // descending compares maxima 9 and 7, so {1,9} leads again
        sort_sessions(&mut sessions, column, false);
        assert_eq!(names(&sessions), vec!["[1,9]", "[3,7]"]);
    }

    #[test]
    fn test_toggle_round_trip_without_ties() {
        let column = find_column("Season").unwrap();
        let mut sessions: Vec<Session> = [4, 1, 3, 2]
            .iter()
            .map(|n| Session::from_value(&json!({"Season": n, "ScenarioName": n.to_string()})))
            .collect();

        sort_sessions(&mut sessions, column, true);
        let ascending = names(&sessions);
        assert_eq!(ascending, vec!["1", "2", "3", "4"]);

        sort_sessions(&mut sessions, column, false);
        assert_eq!(names(&sessions), vec!["4", "3", "2", "1"]);

        sort_sessions(&mut sessions, column, true);
        assert_eq!(names(&sessions), ascending);
    }

    #[test]
    fn test_sort_is_stable() {
        let column = find_column("System").unwrap();
        let mut sessions: Vec<Session> = ["b1", "a1", "b2", "a2"]
            .iter()
            .map(|n| {
                Session::from_value(&json!({"Game": &n[..1], "ScenarioName": n}))
            })
            .collect();

        sort_sessions(&mut sessions, column, true);
        assert_eq!(names(&sessions), vec!["a1", "a2", "b1", "b2"]);

        sort_sessions(&mut sessions, column, false);
        assert_eq!(names(&sessions), vec!["b1", "b2", "a1", "a2"]);
    }
}
