use std::time::Duration;

/// Runtime configuration for the experiment server
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub bind_addr: String,
    /// Reference pile size used by jelly-bean scoring.
    /// Not the true bean count, it is the experimenter's guess.
    pub jelly_beans_reference_count: u32,
    /// Player count written into the treatment of every game created by matching
    pub default_player_count: u32,
    pub event_bus_capacity: usize,
    pub handler_timeout: Duration,
    pub handler_max_retries: u32,
    /// How many recent event ids the dispatcher remembers for deduplication
    pub event_dedup_window: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            jelly_beans_reference_count: 634,
            default_player_count: 2,
            event_bus_capacity: 1000,
            handler_timeout: Duration::from_millis(5000),
            handler_max_retries: 3,
            event_dedup_window: 4096,
        }
    }
}

impl ExperimentConfig {
    /// Builds the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            jelly_beans_reference_count: env_or("JELLY_BEANS_REFERENCE_COUNT")
                .filter(|count| *count > 0)
                .unwrap_or(defaults.jelly_beans_reference_count),
            default_player_count: env_or("DEFAULT_PLAYER_COUNT")
                .unwrap_or(defaults.default_player_count),
            event_bus_capacity: env_or("EVENT_BUS_CAPACITY")
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.event_bus_capacity),
            handler_timeout: env_or("HANDLER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.handler_timeout),
            handler_max_retries: env_or("HANDLER_MAX_RETRIES")
                .unwrap_or(defaults.handler_max_retries),
            event_dedup_window: env_or("EVENT_DEDUP_WINDOW")
                .unwrap_or(defaults.event_dedup_window),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
