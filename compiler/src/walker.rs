use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    error::CompilerError,
    registry::SymbolRegistry,
    resolver::{package_namespace, qualify, Resolver},
    types::{Definition, EnumDecl, MessageDecl, ResolvedEnum, ResolvedFile, ResolvedMessage, SchemaFile},
};

/// Walks the declaration tree of a request in two passes.
///
/// Construction registers every enum and message of every file, so that
/// references resolve regardless of the order files or siblings appear in.
/// [`Walker::resolve_file`] then resolves field types depth-first: nested
/// enums, then nested messages (recursively), then the message's own fields.
///
/// Qualified names are relative to the package. A top-level name declared in
/// more than one package is prefixed with its package (`api$v1$Request`),
/// and so is everything nested inside it.
pub struct Walker<'a> {
    registry: SymbolRegistry<'a>,
}

impl<'a> Walker<'a> {
    pub fn new(files: &'a [SchemaFile]) -> Result<Self, CompilerError> {
        let mut walker = Walker {
            registry: SymbolRegistry::new(),
        };
        let shared = shared_top_level_names(files);

        for file in files {
            let namespace_of = |name: &str| {
                if shared.contains(name) {
                    package_namespace(&file.package)
                } else {
                    String::new()
                }
            };

            for e in &file.enums {
                walker.registry.register_enum(
                    &full_name(&file.package, &e.name),
                    qualify(&namespace_of(&e.name), &e.name),
                    e,
                    &file.name,
                )?;
            }
            for m in &file.messages {
                walker.register_message(&file.package, &namespace_of(&m.name), m, &file.name)?;
            }
        }

        debug!(symbols = walker.registry.len(), files = files.len(), "registry built");
        Ok(walker)
    }

    pub fn registry(&self) -> &SymbolRegistry<'a> {
        &self.registry
    }

    fn register_message(
        &mut self,
        scope:     &str,
        namespace: &str,
        msg:       &'a MessageDecl,
        file:      &'a str,
    ) -> Result<(), CompilerError> {
        let full = full_name(scope, &msg.name);
        let name = qualify(namespace, &msg.name);

        for e in &msg.nested_enums {
            self.registry
                .register_enum(&full_name(&full, &e.name), qualify(&name, &e.name), e, file)?;
        }
        for nested in &msg.nested_messages {
            self.register_message(&full, &name, nested, file)?;
        }

        self.registry.register_message(&full, name, msg, file)
    }

    /// Resolves every field of `file` and returns its definitions in emission
    /// order. Map entry messages are resolved but not emitted.
    pub fn resolve_file(&self, file: &SchemaFile) -> Result<ResolvedFile, CompilerError> {
        let resolver = Resolver::new(&self.registry);
        let mut definitions = Vec::new();

        for e in &file.enums {
            definitions.push(Definition::Enum(self.resolve_enum(&file.package, e)?));
        }
        for m in &file.messages {
            self.resolve_message(&resolver, &file.package, m, &mut definitions)?;
        }

        debug!(file = %file.name, definitions = definitions.len(), "resolved file");

        Ok(ResolvedFile {
            name:    file.name.clone(),
            package: file.package.clone(),
            definitions,
        })
    }

    /// Qualified name assigned to the proto name `full` during registration.
    fn registered_name(&self, full: &str) -> Result<String, CompilerError> {
        self.registry
            .qualified_name(full)
            .map(str::to_string)
            .ok_or_else(|| CompilerError::MalformedInput(format!("{} was never registered", full)))
    }

    fn resolve_enum(&self, scope: &str, e: &EnumDecl) -> Result<ResolvedEnum, CompilerError> {
        Ok(ResolvedEnum {
            name:   self.registered_name(&full_name(scope, &e.name))?,
            values: e.values.clone(),
        })
    }

    fn resolve_message(
        &self,
        resolver:    &Resolver<'_, '_>,
        scope:       &str,
        msg:         &MessageDecl,
        definitions: &mut Vec<Definition>,
    ) -> Result<(), CompilerError> {
        let full = full_name(scope, &msg.name);
        let name = self.registered_name(&full)?;

        for e in &msg.nested_enums {
            definitions.push(Definition::Enum(self.resolve_enum(&full, e)?));
        }
        for nested in &msg.nested_messages {
            self.resolve_message(resolver, &full, nested, definitions)?;
        }

        let fields = msg
            .fields
            .iter()
            .map(|f| resolver.resolve(f))
            .collect::<Result<Vec<_>, _>>()?;

        // Map types are inlined at their use site
        if !msg.is_map_entry {
            definitions.push(Definition::Message(ResolvedMessage { name, fields }));
        }

        Ok(())
    }
}

/// Registers `files` and resolves all of them, in input order.
pub fn walk(files: &[SchemaFile]) -> Result<Vec<ResolvedFile>, CompilerError> {
    let walker = Walker::new(files)?;
    files.iter().map(|f| walker.resolve_file(f)).collect()
}

/// Proto name of `name` declared inside `scope` (a package or message).
fn full_name(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

/// Top-level names declared in more than one package.
fn shared_top_level_names(files: &[SchemaFile]) -> HashSet<&str> {
    let mut packages: HashMap<&str, HashSet<&str>> = HashMap::new();

    for file in files {
        let names = file
            .enums
            .iter()
            .map(|e| e.name.as_str())
            .chain(file.messages.iter().map(|m| m.name.as_str()));
        for name in names {
            packages.entry(name).or_default().insert(file.package.as_str());
        }
    }

    packages
        .into_iter()
        .filter(|(_, seen)| seen.len() > 1)
        .map(|(name, _)| name)
        .collect()
}
