use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub views_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: String,
    pub recipient: String,
    pub relay_host: String,
    pub relay_port: u16,
    pub relay_timeout: Duration,
    pub max_screenshot_size: usize, // in bytes
}

impl Config {
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8070,
            views_dir: PathBuf::from("views"),
            log_dir: PathBuf::from("/var/log/brundle/"),
            log_file: "brundle.log".to_string(),
            recipient: "bug@kpsule.me".to_string(),
            relay_host: "aspmx.l.google.com".to_string(),
            relay_port: 25,
            relay_timeout: Duration::from_secs(30),
            max_screenshot_size: 10 * 1024 * 1024, // 10MB default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_joins_dir_and_file() {
        let config = Config::default();
        assert_eq!(config.log_path(), PathBuf::from("/var/log/brundle/brundle.log"));
    }

    #[test]
    fn defaults_point_at_plain_smtp() {
        let config = Config::default();
        assert_eq!(config.port, 8070);
        assert_eq!(config.relay_port, 25);
        assert_eq!(config.recipient, "bug@kpsule.me");
    }
}
