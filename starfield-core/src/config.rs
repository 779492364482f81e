/// Star field configuration and its `key = value` file format
///
/// ```text
/// # home page backdrop
/// count = 8000
/// shootingStarCount = 5
/// seed = 42
/// ```
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, space0},
    combinator::{eof, opt, recognize},
    multi::many0_count,
    sequence::pair,
    IResult,
};

use crate::points::MAX_COUNT;

/// Default number of sky points
pub const DEFAULT_COUNT: usize = 5000;

/// Default number of shooting stars
pub const DEFAULT_SHOOTING_STAR_COUNT: usize = 3;

/// Layer sizes and optional random seed for a star field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarFieldConfig {
    pub count: usize,
    pub shooting_star_count: usize,
    pub seed: Option<u64>,
}

impl StarFieldConfig {
    pub fn new(count: usize, shooting_star_count: usize) -> Self {
        Self {
            count,
            shooting_star_count,
            seed: None,
        }
    }

    /// The denser backdrop used behind the landing page
    pub fn home() -> Self {
        Self::new(8000, 5)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse the `key = value` format
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default();
            if content.trim().is_empty() {
                continue;
            }

            let (key, value) = match parse_entry(content) {
                Ok((_, entry)) => entry,
                Err(_) => {
                    return Err(ConfigError::Syntax {
                        line,
                        message: format!("expected `key = integer`, found `{}`", content.trim()),
                    })
                }
            };

            let invalid = || ConfigError::InvalidValue {
                line,
                key: key.to_string(),
                value: value.to_string(),
            };

            match key {
                "count" => {
                    config.count = count_from(key, value.parse().map_err(|_| invalid())?);
                }
                "shootingStarCount" | "shooting_star_count" => {
                    config.shooting_star_count =
                        count_from(key, value.parse().map_err(|_| invalid())?);
                }
                "seed" => {
                    config.seed = Some(value.parse().map_err(|_| invalid())?);
                }
                _ => {
                    return Err(ConfigError::UnknownKey {
                        line,
                        key: key.to_string(),
                    })
                }
            }
        }

        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text)?;
        log::info!(
            "loaded star field config from {}: {} stars, {} shooting stars",
            path.display(),
            config.count,
            config.shooting_star_count
        );
        Ok(config)
    }
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT, DEFAULT_SHOOTING_STAR_COUNT)
    }
}

impl FromStr for StarFieldConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Negative counts describe an empty layer. Counts above [`MAX_COUNT`] are capped.
pub fn count_from(key: &str, value: i64) -> usize {
    if value < 0 {
        log::warn!("{key} = {value} is negative, using an empty layer");
        return 0;
    }
    match usize::try_from(value) {
        Ok(count) if count <= MAX_COUNT => count,
        _ => {
            log::warn!("{key} = {value} is above {MAX_COUNT}, capping");
            MAX_COUNT
        }
    }
}

fn parse_entry(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = space0(input)?;
    let (input, key) = parse_key(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = space0(input)?;
    let (input, value) = parse_integer(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (key, value)))
}

fn parse_key(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0_count(alt((alphanumeric1, tag("_"))))))(input)
}

fn parse_integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// Errors raised while reading a configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Syntax { line: usize, message: String },
    UnknownKey { line: usize, key: String },
    InvalidValue { line: usize, key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Syntax { line, message } => write!(f, "line {line}: {message}"),
            ConfigError::UnknownKey { line, key } => {
                write!(f, "line {line}: unknown option `{key}`")
            }
            ConfigError::InvalidValue { line, key, value } => {
                write!(f, "line {line}: `{value}` is not a valid value for `{key}`")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}
