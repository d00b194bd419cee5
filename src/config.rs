use crate::timer::TimerSettings;
use chrono::NaiveDate;
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub page_size: usize,
    pub chart_step: usize,
    pub tick_period: Duration,
    pub timer: TimerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/store.json"),
            window_start: NaiveDate::from_ymd_opt(2025, 10, 19).unwrap_or_default(),
            window_end: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            page_size: 7,
            chart_step: 5,
            tick_period: Duration::from_secs(1),
            timer: TimerSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from a variable lookup; bad values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self {
            port: parse_or(&read, "PORT", defaults.port),
            data_path: read("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            window_start: parse_or(&read, "TRACKER_WINDOW_START", defaults.window_start),
            window_end: parse_or(&read, "TRACKER_WINDOW_END", defaults.window_end),
            page_size: parse_or(&read, "TRACKER_PAGE_SIZE", defaults.page_size).max(1),
            chart_step: parse_or(&read, "TRACKER_CHART_STEP", defaults.chart_step).max(1),
            tick_period: Duration::from_millis(
                parse_or(&read, "TRACKER_TICK_MS", 1000u64).max(1),
            ),
            timer: TimerSettings {
                work_minutes: parse_or(&read, "TRACKER_WORK_MINUTES", defaults.timer.work_minutes)
                    .max(1),
                break_minutes: parse_or(
                    &read,
                    "TRACKER_BREAK_MINUTES",
                    defaults.timer.break_minutes,
                )
                .max(1),
            },
        };

        if config.window_end < config.window_start {
            warn!(
                start = %config.window_start,
                end = %config.window_end,
                "aggregation window is inverted, using defaults"
            );
            config.window_start = defaults.window_start;
            config.window_end = defaults.window_end;
        }
        config
    }
}

fn parse_or<T>(read: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
{
    match read(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring invalid {key}={raw}");
                default
            }
        },
        None => default,
    }
}
