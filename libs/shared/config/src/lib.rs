use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_DURATION_MINUTES: i64 = 15;
pub const DEFAULT_UPCOMING_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Width of a bookable slot on the generation grid, in minutes.
    pub slot_duration_minutes: i64,
    /// How far ahead the upcoming-appointments query looks, in hours.
    pub upcoming_window_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            slot_duration_minutes: read_positive(
                "SLOT_DURATION_MINUTES",
                DEFAULT_SLOT_DURATION_MINUTES,
            ),
            upcoming_window_hours: read_positive(
                "UPCOMING_WINDOW_HOURS",
                DEFAULT_UPCOMING_WINDOW_HOURS,
            ),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            upcoming_window_hours: DEFAULT_UPCOMING_WINDOW_HOURS,
        }
    }
}

fn read_positive(var: &str, default: i64) -> i64 {
    match env::var(var) {
        Ok(raw) => match raw.parse::<i64>() {
            Ok(value) if value > 0 => value,
            _ => {
                warn!("{} has invalid value {:?}, using default {}", var, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
