use serde::Serialize;

/// Wire type of a field, one variant per protobuf field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WireType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Group,
    Message,
    Enum,
}

impl WireType {
    /// Message and enum fields carry a type name that must go through the registry.
    pub fn is_reference(self) -> bool {
        matches!(self, WireType::Message | WireType::Enum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name:      String,
    pub wire_type: WireType,
    pub label:     Label,
    /// Fully-qualified proto type name (`.shop.Order.Status`), set for message and enum fields.
    pub type_name: Option<String>,
}

impl FieldDecl {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name:   String,
    /// Value names in declaration order, zero-valued entries excluded.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDecl {
    pub name:            String,
    pub fields:          Vec<FieldDecl>,
    pub is_map_entry:    bool,
    pub nested_enums:    Vec<EnumDecl>,
    pub nested_messages: Vec<MessageDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaFile {
    pub name:     String,
    pub package:  String,
    pub enums:    Vec<EnumDecl>,
    pub messages: Vec<MessageDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub name:       String,
    pub type_token: String,
    /// Qualified names of the registered types the token mentions.
    pub references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEnum {
    pub name:   String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMessage {
    pub name:   String,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    Enum(ResolvedEnum),
    Message(ResolvedMessage),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Enum(e)    => &e.name,
            Definition::Message(m) => &m.name,
        }
    }
}

/// One input file after resolution: its definitions in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFile {
    pub name:        String,
    pub package:     String,
    pub definitions: Vec<Definition>,
}
