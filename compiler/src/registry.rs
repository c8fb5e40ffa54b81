use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{CompilerError, SymbolKind},
    types::{EnumDecl, MessageDecl},
};

/// A registered declaration together with the file that declared it.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a, T> {
    pub decl: &'a T,
    pub file: &'a str,
}

/// Qualified name → declaration, for messages and enums.
///
/// Built fresh for every compiler run and filled monotonically while the
/// walker registers the input files. Every declaration is also indexed by its
/// fully-qualified proto name (`api.v1.Request`), which is how fields refer to
/// it. A proto name or qualified name that is registered twice is an error.
#[derive(Debug, Default)]
pub struct SymbolRegistry<'a> {
    messages:   HashMap<String, Entry<'a, MessageDecl>>,
    enums:      HashMap<String, Entry<'a, EnumDecl>>,
    full_names: HashMap<String, String>,
}

impl<'a> SymbolRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_message(
        &mut self,
        full_name:      &str,
        qualified_name: String,
        decl:           &'a MessageDecl,
        file:           &'a str,
    ) -> Result<(), CompilerError> {
        self.claim(SymbolKind::Message, full_name, &qualified_name, file)?;
        debug!(name = %qualified_name, full_name, file, map_entry = decl.is_map_entry, "registered message");
        self.messages.insert(qualified_name, Entry { decl, file });
        Ok(())
    }

    pub fn register_enum(
        &mut self,
        full_name:      &str,
        qualified_name: String,
        decl:           &'a EnumDecl,
        file:           &'a str,
    ) -> Result<(), CompilerError> {
        self.claim(SymbolKind::Enum, full_name, &qualified_name, file)?;
        debug!(name = %qualified_name, full_name, file, "registered enum");
        self.enums.insert(qualified_name, Entry { decl, file });
        Ok(())
    }

    fn claim(
        &mut self,
        kind:           SymbolKind,
        full_name:      &str,
        qualified_name: &str,
        file:           &str,
    ) -> Result<(), CompilerError> {
        let previous = match self.full_names.get(full_name) {
            Some(existing) => Some((full_name, self.origin(existing))),
            None => self.origin(qualified_name).map(|origin| (qualified_name, Some(origin))),
        };

        if let Some((name, first)) = previous {
            return Err(CompilerError::DuplicateSymbol {
                kind,
                name:   name.to_string(),
                first:  first.unwrap_or_default().to_string(),
                second: file.to_string(),
            });
        }

        self.full_names.insert(full_name.to_string(), qualified_name.to_string());
        Ok(())
    }

    /// Qualified name registered for a proto name such as `shop.Order.Status`.
    pub fn qualified_name(&self, full_name: &str) -> Option<&str> {
        self.full_names.get(full_name).map(String::as_str)
    }

    pub fn lookup_message(&self, qualified_name: &str) -> Option<&'a MessageDecl> {
        self.messages.get(qualified_name).map(|e| e.decl)
    }

    pub fn lookup_enum(&self, qualified_name: &str) -> Option<&'a EnumDecl> {
        self.enums.get(qualified_name).map(|e| e.decl)
    }

    /// File that declared the message or enum with this qualified name.
    pub fn origin(&self, qualified_name: &str) -> Option<&'a str> {
        self.messages
            .get(qualified_name)
            .map(|e| e.file)
            .or_else(|| self.enums.get(qualified_name).map(|e| e.file))
    }

    pub fn len(&self) -> usize {
        self.messages.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
