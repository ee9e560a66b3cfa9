//! Build script for syncmaster-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time, first as TOML and then with
//!   the same parser the firmware runs at boot

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use syncmaster_core::config::{parse_config, MAX_LABEL_LEN, MAX_TEXT_LEN};

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

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the syncmaster-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_framing(&config, &mut errors);
    validate_numeric(&config, &mut errors);
    validate_commands(&config, &mut errors);
    validate_literals(&config, &mut errors);
    report("Invalid device configuration", &errors);

    // The boot parser handles a TOML subset; anything it rejects would
    // silently fall back to the default preset on the device
    if let Err(e) = parse_config(&config_content) {
        report(
            "device.toml rejected by the firmware parser",
            &[format!("{:?}", e)],
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panic with a boxed list of errors, if any
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

/// Framing markers must be single bytes
fn validate_framing(config: &toml::Value, errors: &mut Vec<String>) {
    let framing = match config.get("framing") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[framing] must be a table".to_string());
            return;
        }
        None => return,
    };

    if let Some(mode) = framing.get("mode") {
        match mode.as_str() {
            Some("terminated") | Some("delimited") => {}
            _ => errors.push("[framing] mode must be 'terminated' or 'delimited'".to_string()),
        }
    }

    for key in ["terminator", "start", "end"] {
        match framing.get(key) {
            None => {}
            Some(toml::Value::String(s)) if s.len() == 1 => {}
            Some(toml::Value::Integer(i)) if (0..=255).contains(i) => {}
            Some(_) => errors.push(format!("[framing] {} must be a single byte", key)),
        }
    }
}

/// Scaled mode needs both a step and a limit
fn validate_numeric(config: &toml::Value, errors: &mut Vec<String>) {
    let numeric = match config.get("numeric") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[numeric] must be a table".to_string());
            return;
        }
        None => return,
    };

    let enabled = numeric
        .get("enabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    for key in ["step_ms", "max_ms"] {
        match numeric.get(key) {
            Some(toml::Value::Integer(v)) if *v > 0 && *v <= u32::MAX as i64 => {}
            Some(_) => errors.push(format!("[numeric] {} must be a positive integer", key)),
            None if enabled => errors.push(format!("[numeric] missing '{}'", key)),
            None => {}
        }
    }
}

/// Command entries need a code; pulses must be positive
fn validate_commands(config: &toml::Value, errors: &mut Vec<String>) {
    let commands = match config.get("command") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut codes = Vec::new();

    for (name, command) in commands {
        check_label("command", name, errors);

        let command = match command {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[command.{}] must be a table", name));
                continue;
            }
        };

        match command.get("code") {
            Some(toml::Value::Integer(code)) => {
                if codes.contains(code) {
                    errors.push(format!("[command.{}] duplicate code {}", name, code));
                }
                codes.push(*code);
            }
            Some(_) => errors.push(format!("[command.{}] code must be an integer", name)),
            None => errors.push(format!("[command.{}] missing 'code'", name)),
        }

        if let Some(pulse) = command.get("pulse_ms") {
            match pulse.as_integer() {
                Some(ms) if ms > 0 => {}
                _ => errors.push(format!("[command.{}] pulse_ms must be positive", name)),
            }
        }

        if let Some(reply) = command.get("reply") {
            check_text("command", name, "reply", reply, errors);
        }
    }
}

/// Literal entries need both a text and a reply
fn validate_literals(config: &toml::Value, errors: &mut Vec<String>) {
    let literals = match config.get("literal") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    for (name, literal) in literals {
        check_label("literal", name, errors);

        let literal = match literal {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[literal.{}] must be a table", name));
                continue;
            }
        };

        for key in ["text", "reply"] {
            match literal.get(key) {
                Some(value) => check_text("literal", name, key, value, errors),
                None => errors.push(format!("[literal.{}] missing '{}'", name, key)),
            }
        }
    }
}

fn check_label(section: &str, name: &str, errors: &mut Vec<String>) {
    if name.len() > MAX_LABEL_LEN {
        errors.push(format!(
            "[{}.{}] name longer than {} bytes",
            section, name, MAX_LABEL_LEN
        ));
    }
}

fn check_text(section: &str, name: &str, key: &str, value: &toml::Value, errors: &mut Vec<String>) {
    match value.as_str() {
        Some(text) if text.len() <= MAX_TEXT_LEN => {}
        Some(_) => errors.push(format!(
            "[{}.{}] {} longer than {} bytes",
            section, name, key, MAX_TEXT_LEN
        )),
        None => errors.push(format!("[{}.{}] {} must be a string", section, name, key)),
    }
}
