//! Conversion from `prost_types` descriptors into the compiler's own schema model.
//!
//! Only the parts of a descriptor that influence generated types are kept:
//! names, packages, field wire types and labels, referenced type names, the
//! map-entry option, and enum values.

use prost_types::{
    field_descriptor_proto::{Label as ProtoLabel, Type as ProtoType},
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
};

use crate::{
    error::CompilerError,
    types::{EnumDecl, FieldDecl, Label, MessageDecl, SchemaFile, WireType},
};

pub fn convert_files(files: &[FileDescriptorProto]) -> Result<Vec<SchemaFile>, CompilerError> {
    files.iter().map(convert_file).collect()
}

pub fn convert_file(file: &FileDescriptorProto) -> Result<SchemaFile, CompilerError> {
    let name = file
        .name
        .clone()
        .ok_or_else(|| CompilerError::MalformedInput("file descriptor without a name".to_string()))?;

    let enums = file
        .enum_type
        .iter()
        .map(|e| convert_enum(&name, e))
        .collect::<Result<Vec<_>, _>>()?;

    let messages = file
        .message_type
        .iter()
        .map(|m| convert_message(&name, m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaFile {
        package: file.package().to_string(),
        name,
        enums,
        messages,
    })
}

fn convert_enum(file: &str, e: &EnumDescriptorProto) -> Result<EnumDecl, CompilerError> {
    let name = required_name(file, "enum", e.name.as_deref())?;

    // The zero value is represented by the field being absent.
    let values = e
        .value
        .iter()
        .filter(|v| v.number() != 0)
        .map(|v| required_name(file, "enum value", v.name.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EnumDecl { name, values })
}

fn convert_message(file: &str, msg: &DescriptorProto) -> Result<MessageDecl, CompilerError> {
    let name = required_name(file, "message", msg.name.as_deref())?;

    let fields = msg
        .field
        .iter()
        .map(|f| convert_field(file, &name, f))
        .collect::<Result<Vec<_>, _>>()?;

    let nested_enums = msg
        .enum_type
        .iter()
        .map(|e| convert_enum(file, e))
        .collect::<Result<Vec<_>, _>>()?;

    let nested_messages = msg
        .nested_type
        .iter()
        .map(|m| convert_message(file, m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MessageDecl {
        name,
        fields,
        is_map_entry: msg.options.as_ref().is_some_and(|o| o.map_entry()),
        nested_enums,
        nested_messages,
    })
}

fn convert_field(
    file:    &str,
    message: &str,
    field:   &FieldDescriptorProto,
) -> Result<FieldDecl, CompilerError> {
    let name = required_name(file, "field", field.name.as_deref())?;

    let raw_type = field.r#type.ok_or_else(|| {
        CompilerError::MalformedInput(format!(
            "field {}.{} in {} has no type",
            message, name, file
        ))
    })?;
    let proto_type = ProtoType::try_from(raw_type).map_err(|_| {
        CompilerError::MalformedInput(format!(
            "field {}.{} in {} has unknown type {}",
            message, name, file, raw_type
        ))
    })?;
    let wire_type = wire_type(proto_type);

    let label = match field.label.map(ProtoLabel::try_from) {
        None | Some(Ok(ProtoLabel::Optional)) => Label::Optional,
        Some(Ok(ProtoLabel::Required))        => Label::Required,
        Some(Ok(ProtoLabel::Repeated))        => Label::Repeated,
        Some(Err(_)) => {
            return Err(CompilerError::MalformedInput(format!(
                "field {}.{} in {} has an unknown label",
                message, name, file
            )))
        }
    };

    let type_name = if wire_type.is_reference() {
        Some(field.type_name.clone().ok_or_else(|| {
            CompilerError::MalformedInput(format!(
                "field {}.{} in {} references a type but has no type name",
                message, name, file
            ))
        })?)
    } else {
        None
    };

    Ok(FieldDecl {
        name,
        wire_type,
        label,
        type_name,
    })
}

fn wire_type(t: ProtoType) -> WireType {
    match t {
        ProtoType::Double   => WireType::Double,
        ProtoType::Float    => WireType::Float,
        ProtoType::Int64    => WireType::Int64,
        ProtoType::Uint64   => WireType::Uint64,
        ProtoType::Int32    => WireType::Int32,
        ProtoType::Fixed64  => WireType::Fixed64,
        ProtoType::Fixed32  => WireType::Fixed32,
        ProtoType::Bool     => WireType::Bool,
        ProtoType::String   => WireType::String,
        ProtoType::Group    => WireType::Group,
        ProtoType::Message  => WireType::Message,
        ProtoType::Bytes    => WireType::Bytes,
        ProtoType::Uint32   => WireType::Uint32,
        ProtoType::Enum     => WireType::Enum,
        ProtoType::Sfixed32 => WireType::Sfixed32,
        ProtoType::Sfixed64 => WireType::Sfixed64,
        ProtoType::Sint32   => WireType::Sint32,
        ProtoType::Sint64   => WireType::Sint64,
    }
}

fn required_name(file: &str, what: &str, name: Option<&str>) -> Result<String, CompilerError> {
    name.map(str::to_string).ok_or_else(|| {
        CompilerError::MalformedInput(format!("{} without a name in {}", what, file))
    })
}
