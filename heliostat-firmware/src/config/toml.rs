//! Simple TOML parser for cycle configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! heliostat configuration. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers (`cycle`, `actuator`, `daylight`)
//! - Single-line integer arrays: sunrise = [450, 420, ...]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line arrays or strings
//! - Nested tables
//! - Dotted keys

use heapless::Vec as HVec;

use heliostat_core::config::{ConfigError, CycleConfig, DaylightTable, TimeMode, MONTHS};

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Only one half of the daylight table was given
    MissingField,
    /// Parsed values rejected by the core configuration checks
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Cycle,
    Actuator,
    Daylight,
}

/// Values collected from the file; anything left `None` keeps the preset
#[derive(Debug, Default)]
struct Draft {
    realtime: bool,
    day_duration_ms: Option<u32>,
    slots_per_day: Option<u16>,
    min_move_interval_ms: Option<u32>,
    reset_at_sunset: Option<bool>,
    poll_interval_ms: Option<u32>,
    max_travel_steps: Option<i32>,
    steps_per_revolution: Option<u32>,
    max_travel_degrees: Option<u16>,
    max_speed: Option<u16>,
    speed: Option<u16>,
    sunrise: Option<[u16; MONTHS]>,
    sunset: Option<[u16; MONTHS]>,
}

/// Parse TOML configuration into CycleConfig
///
/// The `mode` key picks the preset the remaining keys override.
pub fn parse_config(input: &str) -> Result<CycleConfig, ParseError> {
    let mut draft = Draft::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut draft)?;
        }
    }

    draft.build()
}

/// Parse section header like "cycle"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "cycle" => Ok(Section::Cycle),
        "actuator" => Ok(Section::Actuator),
        "daylight" => Ok(Section::Daylight),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a one-line array of twelve minute values
fn parse_month_array(value: &str) -> Result<[u16; MONTHS], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut items: HVec<u16, MONTHS> = HVec::new();
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        items
            .push(parse_int(item)?)
            .map_err(|_| ParseError::TooManyItems)?;
    }

    if items.len() != MONTHS {
        return Err(ParseError::InvalidValue);
    }

    let mut months = [0u16; MONTHS];
    months.copy_from_slice(&items);
    Ok(months)
}

/// Apply a key/value pair to the draft
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    draft: &mut Draft,
) -> Result<(), ParseError> {
    match section {
        Section::Cycle => match key {
            "mode" => {
                draft.realtime = match parse_string(value) {
                    "realtime" => true,
                    "compressed" => false,
                    _ => return Err(ParseError::InvalidValue),
                }
            }
            "day_duration_ms" => draft.day_duration_ms = Some(parse_int(value)?),
            "slots_per_day" => draft.slots_per_day = Some(parse_int(value)?),
            "min_move_interval_ms" => draft.min_move_interval_ms = Some(parse_int(value)?),
            "reset_at_sunset" => draft.reset_at_sunset = Some(parse_bool(value)?),
            "poll_interval_ms" => draft.poll_interval_ms = Some(parse_int(value)?),
            "max_travel_steps" => draft.max_travel_steps = Some(parse_int(value)?),
            _ => {}
        },
        Section::Actuator => match key {
            "steps_per_revolution" => draft.steps_per_revolution = Some(parse_int(value)?),
            "max_travel_degrees" => draft.max_travel_degrees = Some(parse_int(value)?),
            "max_speed" => draft.max_speed = Some(parse_int(value)?),
            "speed" => draft.speed = Some(parse_int(value)?),
            _ => {}
        },
        Section::Daylight => match key {
            "sunrise" => draft.sunrise = Some(parse_month_array(value)?),
            "sunset" => draft.sunset = Some(parse_month_array(value)?),
            _ => {}
        },
        Section::Root => {}
    }

    Ok(())
}

impl Draft {
    /// Overlay the parsed values on the preset and validate the result
    fn build(self) -> Result<CycleConfig, ParseError> {
        let mut config = if self.realtime {
            CycleConfig::realtime()
        } else {
            CycleConfig::compressed()
        };

        if let (TimeMode::Compressed { .. }, Some(day_duration_ms)) =
            (config.time_mode, self.day_duration_ms)
        {
            config.time_mode = TimeMode::Compressed { day_duration_ms };
        }

        let actuator = &mut config.actuator;
        if let Some(v) = self.steps_per_revolution {
            actuator.steps_per_revolution = v;
        }
        if let Some(v) = self.max_travel_degrees {
            actuator.max_travel_degrees = v;
        }
        if let Some(v) = self.max_speed {
            actuator.max_speed = v;
        }
        if let Some(v) = self.speed {
            actuator.speed = v;
        }

        config.max_travel_steps = self
            .max_travel_steps
            .unwrap_or_else(|| config.actuator.travel_steps());

        if let Some(v) = self.slots_per_day {
            config.slots_per_day = v;
        }
        if let Some(v) = self.min_move_interval_ms {
            config.min_move_interval_ms = v;
        }
        if let Some(v) = self.reset_at_sunset {
            config.reset_at_sunset = v;
        }
        if let Some(v) = self.poll_interval_ms {
            config.poll_interval_ms = v;
        }

        match (self.sunrise, self.sunset) {
            (Some(sunrise), Some(sunset)) => {
                config.daylight = DaylightTable::from_minutes(&sunrise, &sunset)?;
            }
            (None, None) => {}
            _ => return Err(ParseError::MissingField),
        }

        config.validate()?;
        Ok(config)
    }
}
