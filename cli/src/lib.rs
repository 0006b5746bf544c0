pub mod config;
pub mod fetch;
pub mod live;
pub mod logging;
pub mod view;
