use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use harvester_core::{DelayRange, HarvestConfig, RecencyWindow};
use harvester_engine::FeedSettings;
use serde::Deserialize;

/// On-disk settings. Every field is optional; missing fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersistedConfig {
    pub feed_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub target: Option<usize>,
    pub window_hours: Option<u64>,
    pub tail_window_size: Option<usize>,
    pub checkpoint_every: Option<usize>,
    pub max_rounds: Option<u64>,
    /// `0` disables the maintenance refresh.
    pub refresh_every: Option<usize>,
    pub stale_hit_ceiling: Option<u64>,
    pub error_cooldown_base_secs: Option<u64>,
    pub error_cooldown_cap_secs: Option<u64>,
    pub error_recovery_cap: Option<u32>,
    pub stall_trigger_rounds: Option<u32>,
    pub stall_hard_cap_rounds: Option<u32>,
    pub throttle_cooldown_secs: Option<u64>,
    pub busy_delay_ms: Option<(u64, u64)>,
    pub steady_delay_ms: Option<(u64, u64)>,
    pub idle_delay_ms: Option<(u64, u64)>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_page_bytes: Option<u64>,
    pub blocked_terms: Vec<String>,
    pub seed: Option<u64>,
}

pub fn load(path: &Path) -> anyhow::Result<PersistedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}

impl PersistedConfig {
    pub fn harvest_config(&self) -> HarvestConfig {
        let mut config = HarvestConfig::default();

        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(hours) = self.window_hours {
            config.window = RecencyWindow::from_hours(hours);
        }
        if let Some(size) = self.tail_window_size {
            config.tail_window_size = size;
        }
        if let Some(every) = self.checkpoint_every {
            config.checkpoint_every = every;
        }
        if let Some(rounds) = self.max_rounds {
            config.max_rounds = rounds;
        }
        if let Some(every) = self.refresh_every {
            config.refresh_every = (every > 0).then_some(every);
        }
        if let Some(ceiling) = self.stale_hit_ceiling {
            config.stale_hit_ceiling = ceiling;
        }

        if let Some(secs) = self.error_cooldown_base_secs {
            config.recovery.base = Duration::from_secs(secs);
        }
        if let Some(secs) = self.error_cooldown_cap_secs {
            config.recovery.cap = Duration::from_secs(secs);
        }
        if let Some(cap) = self.error_recovery_cap {
            config.recovery.max_attempts = cap;
        }

        if let Some(rounds) = self.stall_trigger_rounds {
            config.throttle.trigger_rounds = rounds;
        }
        if let Some(rounds) = self.stall_hard_cap_rounds {
            config.throttle.hard_cap_rounds = rounds;
        }
        if let Some(secs) = self.throttle_cooldown_secs {
            config.throttle.cooldown = Duration::from_secs(secs);
        }

        if let Some((min, max)) = self.busy_delay_ms {
            config.pacing.busy = DelayRange::from_millis(min, max);
        }
        if let Some((min, max)) = self.steady_delay_ms {
            config.pacing.steady = DelayRange::from_millis(min, max);
        }
        if let Some((min, max)) = self.idle_delay_ms {
            config.pacing.idle = DelayRange::from_millis(min, max);
        }

        config
    }

    pub fn feed_settings(&self) -> FeedSettings {
        let mut settings = FeedSettings::default();
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = self.max_page_bytes {
            settings.max_bytes = bytes;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let persisted: PersistedConfig = ron::from_str("()").unwrap();
        assert_eq!(persisted.harvest_config(), HarvestConfig::default());
    }

    #[test]
    fn fields_map_onto_harvest_config() {
        let persisted: PersistedConfig = ron::from_str(
            r#"(
                target: Some(500),
                window_hours: Some(6),
                refresh_every: Some(0),
                error_recovery_cap: Some(3),
                busy_delay_ms: Some((100, 200)),
                blocked_terms: ["promo"],
            )"#,
        )
        .unwrap();
        let config = persisted.harvest_config();

        assert_eq!(config.target, 500);
        assert_eq!(config.window.window(), Duration::from_secs(6 * 3600));
        assert_eq!(config.refresh_every, None);
        assert_eq!(config.recovery.max_attempts, 3);
        assert_eq!(config.pacing.busy, DelayRange::from_millis(100, 200));
        assert_eq!(persisted.blocked_terms, vec!["promo".to_string()]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn feed_timeouts_and_size_cap_are_configurable() {
        let persisted: PersistedConfig = ron::from_str(
            "(connect_timeout_secs: Some(3), request_timeout_secs: Some(9), max_page_bytes: Some(1024))",
        )
        .unwrap();
        let settings = persisted.feed_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(3));
        assert_eq!(settings.request_timeout, Duration::from_secs(9));
        assert_eq!(settings.max_bytes, 1024);
        assert_eq!(settings.page_param, "page");
    }

    #[test]
    fn oversized_window_hours_do_not_overflow() {
        let persisted = PersistedConfig {
            window_hours: Some(u64::MAX / 1000),
            ..PersistedConfig::default()
        };
        let config = persisted.harvest_config();
        assert_eq!(config.window.window(), Duration::from_secs(u64::MAX));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn load_reports_the_path_on_parse_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("harvest.ron");
        fs::write(&path, "(target: \"lots\")").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("harvest.ron"));
    }
}
