use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ModelError;
use crate::parse::{label_field, parse_date, parse_int, parse_int_list, parse_time};

pub const JOB_STATE_DONE: &str = "done";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An integer leaf that may have failed to parse. The raw token is kept so
/// nothing from the source document is lost.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IntValue {
    Int(i64),
    Raw(String),
}

impl IntValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IntValue::Int(n) => Some(*n),
            IntValue::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntValue::Int(n) => write!(f, "{}", n),
            IntValue::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// A date that may be the "missing" sentinel. `Missing` orders before every
/// known date.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionDate {
    Missing,
    Known(DateTime<Utc>),
}

impl SessionDate {
    pub fn known(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionDate::Known(d) => Some(*d),
            SessionDate::Missing => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub state: String,
    pub date: SessionDate,
    pub sessions: Vec<Session>,
    pub messages: Vec<Message>,
    pub characters: Vec<Character>,
}

impl Job {
    pub fn done(&self) -> bool {
        self.state == JOB_STATE_DONE
    }

    /// Name of the character with this number. GM credits carry the number
    /// negated, so the sign is ignored.
    pub fn character_name(&self, number: i64) -> Option<&str> {
        let wanted = number.abs();
        self.characters
            .iter()
            .find(|c| c.number.as_int() == Some(wanted))
            .map(|c| c.name.as_str())
    }

    /// Builds a job from the result document. Only a structurally broken
    /// document is an error; malformed leaves fall back to their raw value.
    pub fn from_value(raw: &Value) -> Result<Self, ModelError> {
        if !raw.is_object() {
            return Err(ModelError::NotAnObject(json_kind(raw)));
        }

        let sessions = required_array(raw, "Sessions")?
            .iter()
            .map(Session::from_value)
            .collect();
        let messages = required_array(raw, "Messages")?
            .iter()
            .map(Message::from_value)
            .collect();
        let characters = required_array(raw, "Characters")?
            .iter()
            .map(Character::from_value)
            .collect();

        Ok(Self {
            id: JobId(label_field(raw, "JobId")),
            state: label_field(raw, "State"),
            date: parse_date(raw.get("JobDate")),
            sessions,
            messages,
            characters,
        })
    }
}

/// Parses the full job result document.
pub fn parse_job(raw: &Value) -> Result<Job, ModelError> {
    Job::from_value(raw)
}

fn required_array<'a>(raw: &'a Value, field: &'static str) -> Result<&'a Vec<Value>, ModelError> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(ModelError::MissingField(field)),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ModelError::NotAnArray {
            field,
            kind: json_kind(other),
        }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub date: SessionDate,
    pub event_numbers: Vec<IntValue>,
    pub game: String,
    pub season: IntValue,
    pub number: IntValue,
    pub variant: String,
    pub scenario_name: String,
    /// Negative numbers mark a character credited for a GM session.
    pub characters: Vec<IntValue>,
    pub player: bool,
    pub gm: bool,
}

/// Column titles of the CSV export, in record order.
pub const CSV_HEADER: [&str; 8] = [
    "Date",
    "Event Number",
    "Character Number",
    "Season",
    "Scenario Number",
    "Variant",
    "Scenario Name",
    "Player/GM",
];

/// Character number the server uses for "GM credit, no character".
pub const GM_ONLY_CHARACTER: i64 = -2;

impl Session {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            date: parse_date(raw.get("Date")),
            event_numbers: parse_int_list(raw.get("EventNumber"), "EventNumber"),
            game: label_field(raw, "Game"),
            season: parse_int(raw.get("Season"), "Season"),
            number: parse_int(raw.get("Number"), "Number"),
            variant: label_field(raw, "Variant"),
            scenario_name: label_field(raw, "ScenarioName"),
            characters: parse_int_list(raw.get("Character"), "Character"),
            player: raw.get("Player").and_then(Value::as_bool).unwrap_or(false),
            gm: raw.get("GM").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    pub fn role_label(&self) -> &'static str {
        match (self.player, self.gm) {
            (true, true) => "P/GM",
            (true, false) => "P",
            (false, true) => "GM",
            (false, false) => "???",
        }
    }

    /// Sort key of the Player/GM column: player counts 1, GM counts 2.
    pub fn role_weight(&self) -> i64 {
        let player = if self.player { 1 } else { 0 };
        let gm = if self.gm { 2 } else { 0 };
        player + gm
    }

    /// One CSV row, aligned with [`CSV_HEADER`].
    pub fn record(&self) -> Vec<String> {
        let date = match self.date {
            SessionDate::Known(d) => d.format("%Y-%m-%d").to_string(),
            SessionDate::Missing => "MISSING".to_string(),
        };
        let events = self
            .event_numbers
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let characters = self
            .characters
            .iter()
            .map(|c| match c.as_int() {
                Some(GM_ONLY_CHARACTER) => "GM".to_string(),
                _ => c.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");

        vec![
            date,
            events,
            characters,
            self.season.to_string(),
            self.number.to_string(),
            self.variant.clone(),
            self.scenario_name.clone(),
            self.role_label().to_string(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    pub time: DateTime<Utc>,
    pub message: String,
    pub state: String,
}

impl Message {
    /// An unreadable `Time` becomes the minimum timestamp, which the stream
    /// filter never accepts.
    pub fn from_value(raw: &Value) -> Self {
        let time = parse_time(raw.get("Time")).unwrap_or_else(|| {
            log::warn!("failed parsing message time {:?}", raw.get("Time"));
            DateTime::<Utc>::MIN_UTC
        });
        Self {
            time,
            message: label_field(raw, "Message"),
            state: label_field(raw, "State"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Character {
    pub system: String,
    pub number: IntValue,
    pub name: String,
    /// Passed through untouched.
    pub prestige: Value,
    pub faction: String,
}

impl Character {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            system: label_field(raw, "System"),
            number: parse_int(raw.get("Number"), "Number"),
            name: label_field(raw, "Name"),
            prestige: raw.get("Prestige").cloned().unwrap_or(Value::Null),
            faction: label_field(raw, "Faction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_job() -> Value {
        json!({
            "JobId": "abc123",
            "State": "done",
            "JobDate": "2019-03-01T10:00:00Z",
            "Sessions": [{
                "Date": "2018-11-03T00:00:00Z",
                "EventNumber": [12345, "x9"],
                "Game": "Pathfinder",
                "Season": 9,
                "Number": "abc",
                "Variant": "",
                "ScenarioName": "The Sky Key Solution",
                "Character": [2, -7],
                "Player": true,
                "GM": false
            }],
            "Messages": [{"Time": "2019-03-01T10:00:01Z", "Message": "started", "State": "running"}],
            "Characters": [{"System": 1, "Number": "7", "Name": "Val", "Prestige": {"EA": 3}, "Faction": "Exchange"}]
        })
    }

    #[test]
    fn test_parse_job_keeps_raw_number() {
        let job = parse_job(&sample_job()).unwrap();
        let session = &job.sessions[0];
        assert_eq!(session.number, IntValue::Raw("abc".to_string()));
        assert_eq!(session.season, IntValue::Int(9));
        assert_eq!(
            session.event_numbers,
            vec![IntValue::Int(12345), IntValue::Raw("x9".to_string())]
        );
        assert_eq!(session.characters, vec![IntValue::Int(2), IntValue::Int(-7)]);
        assert!(job.done());
    }

    #[test]
    fn test_parse_job_characters_pass_prestige_through() {
        let job = parse_job(&sample_job()).unwrap();
        let character = &job.characters[0];
        assert_eq!(character.system, "1");
        assert_eq!(character.number, IntValue::Int(7));
        assert_eq!(character.prestige, json!({"EA": 3}));
    }

    #[test]
    fn test_character_name_ignores_gm_sign() {
        let job = parse_job(&sample_job()).unwrap();
        assert_eq!(job.character_name(-7), Some("Val"));
        assert_eq!(job.character_name(7), Some("Val"));
        assert_eq!(job.character_name(2), None);
    }

    #[test]
    fn test_parse_job_requires_arrays() {
        let mut raw = sample_job();
        raw["Sessions"] = Value::Null;
        assert!(matches!(parse_job(&raw), Err(ModelError::MissingField("Sessions"))));

        let mut raw = sample_job();
        raw["Messages"] = json!("nope");
        assert!(matches!(
            parse_job(&raw),
            Err(ModelError::NotAnArray { field: "Messages", kind: "string" })
        ));

        assert!(matches!(parse_job(&json!([1, 2])), Err(ModelError::NotAnObject("array"))));
    }

    #[test]
    fn test_session_null_lists_are_empty() {
        let session = Session::from_value(&json!({"EventNumber": null, "Character": null}));
        assert!(session.event_numbers.is_empty());
        assert!(session.characters.is_empty());
        assert_eq!(session.date, SessionDate::Missing);
        assert_eq!(session.role_label(), "???");
    }

    #[test]
    fn test_session_record() {
        let session = Session::from_value(&json!({
            "Date": "0001-01-01T00:00:00Z",
            "EventNumber": [1, 2],
            "Season": 3,
            "Number": 4,
            "Variant": "A",
            "ScenarioName": "Name",
            "Character": [5, -2],
            "Player": true,
            "GM": true
        }));
        assert_eq!(
            session.record(),
            vec!["MISSING", "1 2", "5 GM", "3", "4", "A", "Name", "P/GM"]
        );
        assert_eq!(session.record().len(), CSV_HEADER.len());
    }

    #[test]
    fn test_message_bad_time_falls_to_minimum() {
        let message = Message::from_value(&json!({"Time": "yesterday", "Message": "hi", "State": "x"}));
        assert_eq!(message.time, DateTime::<Utc>::MIN_UTC);
        assert_eq!(message.message, "hi");
    }
}
