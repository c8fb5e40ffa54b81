use crate::{
    error::{CompilerError, SymbolKind},
    registry::SymbolRegistry,
    scalar::{apply_label, base_type, ANY, STRING},
    types::{FieldDecl, MessageDecl, ResolvedField, WireType},
};

/// Separates nesting levels inside a qualified name (`Order$Line$Kind`).
pub const NESTING_DELIMITER: &str = "$";

/// Serialized as RFC 3339 text rather than a structural type.
pub const TIMESTAMP_TYPE: &str = ".google.protobuf.Timestamp";

/// Namespace of a package when its top-level names must carry it
/// (`api.v1` → `api$v1`).
pub fn package_namespace(package: &str) -> String {
    package
        .split('.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(NESTING_DELIMITER)
}

/// Builds the qualified name of a declaration inside `namespace`
/// (the empty string at file level).
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", namespace, NESTING_DELIMITER, name)
    }
}

/// Computes the target type token of every field, using the registry for
/// enum and message references.
pub struct Resolver<'r, 'a> {
    registry: &'r SymbolRegistry<'a>,
}

impl<'r, 'a> Resolver<'r, 'a> {
    pub fn new(registry: &'r SymbolRegistry<'a>) -> Self {
        Resolver { registry }
    }

    /// Qualified name registered for a proto type name (`.shop.Order.Status`
    /// → `Order$Status`).
    pub fn qualified_name(&self, type_name: &str) -> Option<&'r str> {
        self.registry.qualified_name(type_name.strip_prefix('.').unwrap_or(type_name))
    }

    pub fn resolve(&self, field: &FieldDecl) -> Result<ResolvedField, CompilerError> {
        let mut references = Vec::new();
        let type_token = self.resolve_token(field, &mut references)?;

        Ok(ResolvedField {
            name: field.name.clone(),
            type_token,
            references,
        })
    }

    fn resolve_token(
        &self,
        field:      &FieldDecl,
        references: &mut Vec<String>,
    ) -> Result<String, CompilerError> {
        let token = match field.wire_type {
            WireType::Enum => match self.reference(field)? {
                None => ANY.to_string(),
                Some(type_name) => {
                    let name = self
                        .qualified_name(type_name)
                        .filter(|name| self.registry.lookup_enum(name).is_some())
                        .ok_or_else(|| unresolved(SymbolKind::Enum, type_name, field))?;

                    push_unique(references, name);
                    name.to_string()
                }
            },
            WireType::Message if field.type_name.as_deref() == Some(TIMESTAMP_TYPE) => {
                STRING.to_string()
            }
            WireType::Message => match self.reference(field)? {
                None => ANY.to_string(),
                Some(type_name) => {
                    let (name, message) = self
                        .qualified_name(type_name)
                        .and_then(|name| self.registry.lookup_message(name).map(|m| (name, m)))
                        .ok_or_else(|| unresolved(SymbolKind::Message, type_name, field))?;

                    // Maps travel as repeated entry messages but are typed as a
                    // single object, so the array suffix is never added.
                    if message.is_map_entry {
                        return self.map_token(name, message, references);
                    }

                    push_unique(references, name);
                    name.to_string()
                }
            },
            other => base_type(other).to_string(),
        };

        Ok(apply_label(token, field.label))
    }

    fn map_token(
        &self,
        name:       &str,
        entry:      &MessageDecl,
        references: &mut Vec<String>,
    ) -> Result<String, CompilerError> {
        let (key, value) = match entry.fields.as_slice() {
            [key, value, ..] => (key, value),
            _ => {
                return Err(CompilerError::MalformedInput(format!(
                    "map entry {} needs a key and a value field",
                    name
                )))
            }
        };

        let key_type = self.resolve_token(key, references)?;
        let value_type = self.resolve_token(value, references)?;

        Ok(format!("{{ [key: {}]: {} }}", key_type, value_type))
    }

    /// The field's proto type name, or `None` when it has no path separator.
    fn reference<'f>(&self, field: &'f FieldDecl) -> Result<Option<&'f str>, CompilerError> {
        let type_name = field.type_name.as_deref().ok_or_else(|| {
            CompilerError::MalformedInput(format!(
                "field \"{}\" references a type but has no type name",
                field.name
            ))
        })?;

        Ok(type_name.contains('.').then_some(type_name))
    }
}

fn unresolved(kind: SymbolKind, type_name: &str, field: &FieldDecl) -> CompilerError {
    CompilerError::UnresolvedSymbol {
        kind,
        name: type_name.strip_prefix('.').unwrap_or(type_name).to_string(),
        field: field.name.clone(),
    }
}

fn push_unique(references: &mut Vec<String>, name: &str) {
    if !references.iter().any(|r| r == name) {
        references.push(name.to_string());
    }
}
