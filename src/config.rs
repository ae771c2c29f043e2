use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Serve,
    Demo,
}

/// Parameters of the demonstration run: `readers` threads block on one key,
/// then after `writer_delay` the `writers` threads race to set it.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub readers: usize,
    pub writers: usize,
    pub reader_timeout: Duration,
    pub writer_delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            readers: 10,
            writers: 10,
            reader_timeout: Duration::from_secs(6),
            writer_delay: Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub bind: String,
    pub port: u16,
    /// Wait applied to `GET` when the client does not pass one.
    pub default_timeout: Duration,
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Serve,
            bind: "127.0.0.1".to_string(),
            port: 6379,
            default_timeout: Duration::from_secs(5),
            demo: DemoConfig::default(),
        }
    }
}

fn parse_value<T: FromStr>(flag: &str, value: Option<String>) -> Result<T, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

fn parse_secs(flag: &str, value: Option<String>) -> Result<Duration, ConfigError> {
    let raw = value.clone();
    let secs: f64 = parse_value(flag, value)?;
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: raw.unwrap_or_default(),
    })
}

impl Config {
    /// Builds a config from command-line arguments, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--port" => config.port = parse_value(&flag, args.next())?,
                "--bind" => {
                    config.bind = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?
                }
                "--default-timeout" => config.default_timeout = parse_secs(&flag, args.next())?,
                "--demo" => config.mode = Mode::Demo,
                "--readers" => config.demo.readers = parse_value(&flag, args.next())?,
                "--writers" => config.demo.writers = parse_value(&flag, args.next())?,
                "--reader-timeout" => config.demo.reader_timeout = parse_secs(&flag, args.next())?,
                "--writer-delay" => config.demo.writer_delay = parse_secs(&flag, args.next())?,
                _ => return Err(ConfigError::UnknownFlag(flag)),
            }
        }

        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
