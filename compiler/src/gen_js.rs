use crate::{
    config::Target,
    types::{Definition, ResolvedEnum, ResolvedFile, ResolvedMessage},
    utils::quote,
};

/// Banner placed at the top of every generated document.
pub fn file_header(target: Target, source: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    if target == Target::Flow {
        lines.push("// @flow".to_string());
        lines.push("".to_string());
    }
    lines.push("// ------------------------------------".to_string());
    lines.push("// Code generated by protoc-gen-flow".to_string());
    lines.push(format!("// source: {}", source));
    lines.push("// THIS FILE IS AUTOMATICALLY GENERATED, DO NOT EDIT!".to_string());
    lines.push("// ------------------------------------".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

/// `import type` statements, one per source module, names in the given order.
pub fn imports(imports: &[(String, Vec<String>)]) -> String {
    let mut lines: Vec<String> = imports
        .iter()
        .map(|(module, names)| {
            format!("import type {{ {} }} from {};", names.join(", "), quote(module))
        })
        .collect();

    if !lines.is_empty() {
        lines.push("".to_string());
    }
    lines.join("\n")
}

pub fn definition(target: Target, def: &Definition) -> String {
    match def {
        Definition::Enum(e)    => generate_enum(target, e),
        Definition::Message(m) => generate_message(target, m),
    }
}

/// Every definition of `files`, in order, as one document body.
/// Each definition is preceded by a blank line.
pub fn compile_files_to_js(target: Target, files: &[ResolvedFile]) -> String {
    let mut code: Vec<String> = Vec::new();

    for file in files {
        for def in &file.definitions {
            code.push(format!("\n{}", definition(target, def)));
        }
    }

    code.concat()
}

/// Drops blank lines at the start of a generated document.
pub fn trim_leading_blank_lines(code: &str) -> String {
    code.trim_start_matches('\n').to_string()
}

fn generate_enum(target: Target, e: &ResolvedEnum) -> String {
    if e.values.is_empty() {
        let bottom = match target {
            Target::Flow       => "empty",
            Target::TypeScript => "never",
        };
        return format!("export type {} = {};\n", e.name, bottom);
    }

    let variants: Vec<String> = e
        .values
        .iter()
        .map(|v| format!("  | {}", quote(v)))
        .collect();

    format!("export type {} =\n{};\n", e.name, variants.join("\n"))
}

fn generate_message(target: Target, m: &ResolvedMessage) -> String {
    // Every field is optional: default values are omitted on the wire.
    match target {
        Target::Flow => {
            let fields: Vec<String> = m
                .fields
                .iter()
                .map(|f| format!("  {}?: {},\n", f.name, f.type_token))
                .collect();
            format!("export type {} = {{|\n{}|}};\n", m.name, fields.concat())
        }
        Target::TypeScript => {
            let fields: Vec<String> = m
                .fields
                .iter()
                .map(|f| format!("  {}?: {};\n", f.name, f.type_token))
                .collect();
            format!("export interface {} {{\n{}}}\n", m.name, fields.concat())
        }
    }
}
