use anyhow::{anyhow, Result};

use crate::config::LoggingConfig;

/// Level comes from `--log-level`, then `$JOBDASH_LOG`, then the config.
pub fn resolve_level(config: &LoggingConfig, override_level: Option<&str>) -> Result<log::LevelFilter> {
    let level = override_level
        .map(str::to_string)
        .or_else(|| std::env::var(common::LOG_ENV).ok())
        .unwrap_or_else(|| config.level.clone());
    level.parse::<log::LevelFilter>()
        .map_err(|_| anyhow!("Invalid log level: {}", level))
}

pub fn setup_logging(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let level = resolve_level(config, override_level)?;
    let json = config.format == "json";

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            if json {
                out.finish(format_args!(
                    "{}",
                    serde_json::json!({
                        "time": chrono::Local::now().to_rfc3339(),
                        "target": record.target(),
                        "level": record.level().to_string(),
                        "message": message.to_string(),
                    })
                ))
            } else {
                out.finish(format_args!(
                    "[{}][{}][{}] {}",
                    chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                    record.target(),
                    record.level(),
                    message
                ))
            }
        })
        .level(level)
        // stdout belongs to the dashboard itself
        .chain(std::io::stderr());

    if let Some(ref output) = config.output {
        dispatch = dispatch.chain(fern::log_file(output)?);
    }

    dispatch.apply()?;
    Ok(())
}
