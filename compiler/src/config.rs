use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{error::CompilerError, utils::quote};

lazy_static! {
    static ref OPTION:     Regex = Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([A-Za-z0-9_.\-]+)\s*$").unwrap();
    static ref FLOW:       Regex = Regex::new(r"^(?i)flow$").unwrap();
    static ref TYPESCRIPT: Regex = Regex::new(r"^(?i)(typescript|ts)$").unwrap();
    static ref INDEX:      Regex = Regex::new(r"^(?i)index$").unwrap();
    static ref FILES:      Regex = Regex::new(r"^(?i)(files|per_file)$").unwrap();
}

/// Language flavour of the generated definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Target {
    #[default]
    Flow,
    TypeScript,
}

impl Target {
    pub fn extension(self) -> &'static str {
        match self {
            Target::Flow       => "js",
            Target::TypeScript => "ts",
        }
    }
}

/// How outputs are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutputMode {
    /// One `index` document holding every file of the request.
    #[default]
    Index,
    /// One document per file to generate, with type imports between them.
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Options {
    pub target: Target,
    pub mode:   OutputMode,
}

impl Options {
    /// Parses the plugin parameter, e.g. `target=typescript,mode=files`.
    pub fn parse(parameter: &str) -> Result<Options, CompilerError> {
        let mut options = Options::default();

        for part in parameter.split(',').filter(|p| !p.trim().is_empty()) {
            let caps = OPTION.captures(part).ok_or_else(|| {
                CompilerError::InvalidParameter(format!("expected key=value but found {}", quote(part)))
            })?;
            let (key, value) = (&caps[1], &caps[2]);

            match key {
                "target" => {
                    options.target = if FLOW.is_match(value) {
                        Target::Flow
                    } else if TYPESCRIPT.is_match(value) {
                        Target::TypeScript
                    } else {
                        return Err(unknown_value(key, value));
                    };
                }
                "mode" => {
                    options.mode = if INDEX.is_match(value) {
                        OutputMode::Index
                    } else if FILES.is_match(value) {
                        OutputMode::Files
                    } else {
                        return Err(unknown_value(key, value));
                    };
                }
                _ => {
                    return Err(CompilerError::InvalidParameter(format!(
                        "unknown option {}",
                        quote(key)
                    )))
                }
            }
        }

        Ok(options)
    }
}

fn unknown_value(key: &str, value: &str) -> CompilerError {
    CompilerError::InvalidParameter(format!("invalid value {} for option {}", quote(value), quote(key)))
}
