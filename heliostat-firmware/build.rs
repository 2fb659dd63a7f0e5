//! Build script for heliostat-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates heliostat.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Months in the daylight table
const MONTHS: usize = 12;

/// Minutes in one day
const MINUTES_PER_DAY: i64 = 1440;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate heliostat.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=heliostat.toml");

    let config_path = Path::new("heliostat.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: heliostat.toml not found!                                ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds heliostat.toml at build time.               ║\n\
            ║  Please create one in the heliostat-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read heliostat.toml                            ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in heliostat.toml                    ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);
    validate_cycle(&config);
    validate_actuator(&config);
    validate_daylight(&config);

    println!("cargo:warning=heliostat.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a list of problems
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors: Vec<String> = ["cycle", "actuator", "daylight"]
        .iter()
        .filter(|s| !matches!(config.get(**s), Some(toml::Value::Table(_))))
        .map(|s| format!("Missing [{}] section", s))
        .collect();

    report("Missing required sections in heliostat.toml", &errors);
}

/// Check that an optional integer key lies in a range
fn check_range(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
    }
}

/// Validate the [cycle] section
fn validate_cycle(config: &toml::Value) {
    let Some(cycle) = config.get("cycle").and_then(|c| c.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    match cycle.get("mode") {
        None => errors.push("[cycle] missing 'mode'".to_string()),
        Some(toml::Value::String(mode)) if ["compressed", "realtime"].contains(&mode.as_str()) => {}
        Some(_) => errors.push("[cycle] mode must be 'compressed' or 'realtime'".to_string()),
    }

    check_range(cycle, "cycle", "day_duration_ms", 1, u32::MAX as i64, &mut errors);
    check_range(cycle, "cycle", "slots_per_day", 1, u16::MAX as i64, &mut errors);
    check_range(cycle, "cycle", "min_move_interval_ms", 0, u32::MAX as i64, &mut errors);
    check_range(cycle, "cycle", "poll_interval_ms", 1, u32::MAX as i64, &mut errors);
    check_range(cycle, "cycle", "max_travel_steps", 1, i32::MAX as i64, &mut errors);

    if let Some(v) = cycle.get("reset_at_sunset") {
        if !v.is_bool() {
            errors.push("[cycle] reset_at_sunset must be true or false".to_string());
        }
    }

    report("Invalid cycle configuration", &errors);
}

/// Validate the [actuator] section
fn validate_actuator(config: &toml::Value) {
    let Some(actuator) = config.get("actuator").and_then(|a| a.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    check_range(actuator, "actuator", "steps_per_revolution", 1, u32::MAX as i64, &mut errors);
    check_range(actuator, "actuator", "max_travel_degrees", 1, 360, &mut errors);
    check_range(actuator, "actuator", "max_speed", 1, u16::MAX as i64, &mut errors);
    check_range(actuator, "actuator", "speed", 1, u16::MAX as i64, &mut errors);

    if let (Some(toml::Value::Integer(speed)), Some(toml::Value::Integer(max))) =
        (actuator.get("speed"), actuator.get("max_speed"))
    {
        if speed > max {
            errors.push("[actuator] speed must not exceed max_speed".to_string());
        }
    }

    report("Invalid actuator configuration", &errors);
}

/// Read a 12-entry minute table
fn minute_table(daylight: &toml::value::Table, key: &str, errors: &mut Vec<String>) -> Vec<i64> {
    let Some(toml::Value::Array(items)) = daylight.get(key) else {
        errors.push(format!("[daylight] missing '{}' array", key));
        return Vec::new();
    };

    if items.len() != MONTHS {
        errors.push(format!("[daylight] {} must have {} entries", key, MONTHS));
        return Vec::new();
    }

    let mut minutes = Vec::with_capacity(MONTHS);
    for (i, item) in items.iter().enumerate() {
        match item.as_integer() {
            Some(m) if (0..MINUTES_PER_DAY).contains(&m) => minutes.push(m),
            _ => errors.push(format!("[daylight] {}[{}] must be 0-1439", key, i)),
        }
    }
    minutes
}

/// Validate the [daylight] section
fn validate_daylight(config: &toml::Value) {
    let Some(daylight) = config.get("daylight").and_then(|d| d.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    let sunrise = minute_table(daylight, "sunrise", &mut errors);
    let sunset = minute_table(daylight, "sunset", &mut errors);

    if sunrise.len() == MONTHS && sunset.len() == MONTHS {
        for month in 0..MONTHS {
            if sunrise[month] >= sunset[month] {
                errors.push(format!(
                    "[daylight] month {}: sunrise must be before sunset",
                    month + 1
                ));
            }
        }
    }

    report("Invalid daylight table", &errors);
}
