pub mod app;
pub mod columns;
pub mod endpoints;
pub mod error;
pub mod filter;
pub mod job;
pub mod parse;
pub mod render;
pub mod sort;
pub mod stream;

pub use app::AppState;
pub use columns::{columns, find_column, resolve_column, Column, COLUMNS};
pub use error::ModelError;
pub use filter::{apply_filters, Filter, FilterOp};
pub use job::{parse_job, Character, IntValue, Job, JobId, Message, Session, SessionDate,
              CSV_HEADER, GM_ONLY_CHARACTER, JOB_STATE_DONE};
pub use render::{header_with_marks, render_table, Fragment, RenderedTable};
pub use sort::{sort_sessions, SortState, DEFAULT_SORT_COLUMN};
pub use stream::{ConnectionState, StreamAction, StreamClient, StreamEvent, StreamOptions,
                 RECONNECT_DELAY};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/jobdash/config.yaml";
pub const CONFIG_ENV: &str = "JOBDASH_CONFIG";
pub const LOG_ENV: &str = "JOBDASH_LOG";
