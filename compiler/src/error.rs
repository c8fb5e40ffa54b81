use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which registry a failed lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Enum,
    Message,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Enum    => f.write_str("Enum"),
            SymbolKind::Message => f.write_str("Message"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("{kind} '{name}' referenced by field \"{field}\" was not found in the registry")]
    UnresolvedSymbol {
        kind:  SymbolKind,
        name:  String,
        field: String,
    },

    #[error("{kind} '{name}' is declared twice, in {first} and {second}")]
    DuplicateSymbol {
        kind:   SymbolKind,
        name:   String,
        first:  String,
        second: String,
    },

    #[error("Invalid plugin parameter: {0}")]
    InvalidParameter(String),

    #[error("Response encode error: {0}")]
    Encode(String),
}

impl From<prost::DecodeError> for CompilerError {
    fn from(err: prost::DecodeError) -> Self {
        CompilerError::MalformedInput(format!(
            "unable to parse CodeGeneratorRequest: {}",
            err
        ))
    }
}
