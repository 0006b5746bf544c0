//! Live status stream client. It never does I/O; the caller runs its actions.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use url::Url;

use crate::endpoints::{completion_url, is_view_mode, job_id, stream_url};
use crate::job::{Message, JOB_STATE_DONE};

pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);
pub const SINCE_PARAM: &str = "since";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Navigating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Opened,
    /// One text frame, expected to hold `{Time, Message, State}`.
    Message(String),
    Error,
    Closed,
    ReconnectDue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    Connect(Url),
    AppendLog(String),
    SetState(String),
    Close,
    ScheduleReconnect(Duration),
    Navigate(Url),
}

#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Suppresses the post-completion navigation.
    pub view_mode: bool,
    /// Zone used to print message times in the log.
    pub timezone: Tz,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            view_mode: false,
            timezone: Tz::UTC,
        }
    }
}

#[derive(Debug)]
pub struct StreamClient {
    endpoint: Url,
    completion: Url,
    options: StreamOptions,
    state: ConnectionState,
    last_seen: DateTime<Utc>,
    displayed_state: String,
    close_handler_attached: bool,
}

impl StreamClient {
    /// View mode is on if either the options or the page URL ask for it.
    pub fn new(page: &Url, mut options: StreamOptions) -> Result<Self> {
        options.view_mode |= is_view_mode(page);
        let id = job_id(page).unwrap_or_default();
        Ok(Self {
            endpoint: stream_url(page)?,
            completion: completion_url(page, &id),
            displayed_state: String::new(),
            options,
            state: ConnectionState::Connecting,
            last_seen: DateTime::<Utc>::MIN_UTC,
            close_handler_attached: true,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub fn displayed_state(&self) -> &str {
        &self.displayed_state
    }

    pub fn view_mode(&self) -> bool {
        self.options.view_mode
    }

    /// First connection attempt.
    pub fn start(&mut self) -> Vec<StreamAction> {
        self.state = ConnectionState::Connecting;
        vec![StreamAction::Connect(self.connect_url())]
    }

    pub fn handle(&mut self, event: StreamEvent) -> Vec<StreamAction> {
        if self.state == ConnectionState::Navigating {
            return Vec::new();
        }

        match event {
            StreamEvent::Opened => {
                if self.state == ConnectionState::Connecting {
                    log::debug!("stream open at {}", self.endpoint);
                    self.state = ConnectionState::Open;
                }
                Vec::new()
            }
            StreamEvent::Message(text) => self.on_message(&text),
            StreamEvent::Error => match self.state {
                ConnectionState::Connecting | ConnectionState::Open => vec![StreamAction::Close],
                _ => Vec::new(),
            },
            StreamEvent::Closed => match self.state {
                ConnectionState::Connecting | ConnectionState::Open if self.close_handler_attached => {
                    log::info!("stream closed, reconnecting in {:?}", RECONNECT_DELAY);
                    self.state = ConnectionState::Closed;
                    vec![StreamAction::ScheduleReconnect(RECONNECT_DELAY)]
                }
                _ => Vec::new(),
            },
            StreamEvent::ReconnectDue => {
                if self.state != ConnectionState::Closed {
                    return Vec::new();
                }
                self.state = ConnectionState::Connecting;
                vec![StreamAction::Connect(self.connect_url())]
            }
        }
    }

    fn on_message(&mut self, text: &str) -> Vec<StreamAction> {
        if self.state == ConnectionState::Closed {
            return Vec::new();
        }

        let raw: Value = match serde_json::from_str(text) {
            Ok(raw @ Value::Object(_)) => raw,
            Ok(_) | Err(_) => {
                log::warn!("could not unmarshal message: {}", text);
                return Vec::new();
            }
        };
        let message = Message::from_value(&raw);
        if message.time <= self.last_seen {
            log::trace!("dropping stale message at {}", message.time);
            return Vec::new();
        }

        self.state = ConnectionState::Open;
        self.last_seen = message.time;

        let mut actions = vec![StreamAction::AppendLog(self.format_line(&message))];
        if self.displayed_state != message.state {
            self.displayed_state = message.state.clone();
            actions.push(StreamAction::SetState(message.state.clone()));
        }

        if message.state == JOB_STATE_DONE && !self.options.view_mode {
            log::info!("job is done, moving on to {}", self.completion);
            self.close_handler_attached = false;
            self.state = ConnectionState::Navigating;
            actions.push(StreamAction::Close);
            actions.push(StreamAction::Navigate(self.completion.clone()));
        }

        actions
    }

    fn format_line(&self, message: &Message) -> String {
        let local = message.time.with_timezone(&self.options.timezone);
        format!("{}: {}", local.format("%H:%M:%S %Z"), message.message)
    }

    /// Reconnects ask the server to backfill only what came after the last
    /// accepted message.
    fn connect_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if self.last_seen > DateTime::<Utc>::MIN_UTC {
            let since = self.last_seen.to_rfc3339_opts(SecondsFormat::Nanos, true);
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != SINCE_PARAM)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair(SINCE_PARAM, &since);
        }
        url
    }
}
