use crate::types::{Label, WireType};

pub const NUMBER:  &str = "number";
pub const STRING:  &str = "string";
pub const BOOLEAN: &str = "boolean";
pub const ANY:     &str = "any";

/// Maps a non-reference wire type to its target type token.
/// Message and enum types need the registry and map to `any` here.
pub fn base_type(wire_type: WireType) -> &'static str {
    match wire_type {
        WireType::Double
        | WireType::Float
        | WireType::Int32
        | WireType::Uint32
        | WireType::Sint32
        | WireType::Fixed32
        | WireType::Sfixed32 => NUMBER,
        // javascript numbers can't hold 64bit ints exactly
        WireType::Int64
        | WireType::Uint64
        | WireType::Sint64
        | WireType::Fixed64
        | WireType::Sfixed64 => STRING,
        WireType::Bool   => BOOLEAN,
        WireType::String => STRING,
        WireType::Bytes
        | WireType::Group
        | WireType::Message
        | WireType::Enum => ANY,
    }
}

/// Appends the array suffix when the label is repeated.
pub fn apply_label(token: String, label: Label) -> String {
    if label == Label::Repeated {
        format!("{}[]", token)
    } else {
        token
    }
}

pub fn scalar_type(wire_type: WireType, label: Label) -> String {
    apply_label(base_type(wire_type).to_string(), label)
}
