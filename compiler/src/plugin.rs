//! The protoc plugin protocol: `CodeGeneratorRequest` in, `CodeGeneratorResponse` out.

use prost::Message;
use prost_types::{
    compiler::{
        code_generator_response::{Feature, File},
        CodeGeneratorRequest, CodeGeneratorResponse,
    },
    FileDescriptorProto,
};
use tracing::{debug, error, info};

use crate::{
    config::{OutputMode, Options},
    descriptor::convert_files,
    error::CompilerError,
    gen_js::{compile_files_to_js, definition, file_header, imports, trim_leading_blank_lines},
    registry::SymbolRegistry,
    types::{Definition, ResolvedFile},
    utils::{output_name, relative_import},
    walker::{walk, Walker},
};

pub const INDEX_NAME: &str = "index";

/// Decodes a serialized request and generates the response for it.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, CompilerError> {
    let request = CodeGeneratorRequest::decode(bytes)?;
    generate(request)
}

pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, CompilerError> {
    let options = Options::parse(request.parameter())?;
    let file = generate_files(&request.proto_file, &request.file_to_generate, options)?;

    Ok(CodeGeneratorResponse {
        file,
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    })
}

/// Converts a failed run into a response that carries only the error message.
pub fn respond(result: Result<CodeGeneratorResponse, CompilerError>) -> CodeGeneratorResponse {
    result.unwrap_or_else(|e| {
        error!(error = %e, "generation failed");
        CodeGeneratorResponse {
            error: Some(e.to_string()),
            ..Default::default()
        }
    })
}

pub fn encode_response(response: &CodeGeneratorResponse) -> Vec<u8> {
    response.encode_to_vec()
}

/// Resolves every descriptor without rendering, in input order.
pub fn resolve_descriptors(proto_files: &[FileDescriptorProto]) -> Result<Vec<ResolvedFile>, CompilerError> {
    let files = convert_files(proto_files)?;
    walk(&files)
}

/// Generates the output files for `proto_files`.
///
/// Index mode renders every file of the request into one document. Files
/// mode renders one document per entry of `to_generate` (every file when it
/// is empty), importing the types it uses from other files. Files that are
/// imported from are rendered too, so every import has a target. Outputs
/// keep the order of the request.
pub fn generate_files(
    proto_files: &[FileDescriptorProto],
    to_generate: &[String],
    options:     Options,
) -> Result<Vec<File>, CompilerError> {
    let files = convert_files(proto_files)?;
    let walker = Walker::new(&files)?;
    let extension = options.target.extension();

    let out = match options.mode {
        OutputMode::Index => {
            let resolved = files
                .iter()
                .map(|f| walker.resolve_file(f))
                .collect::<Result<Vec<_>, _>>()?;

            let mut code = file_header(options.target, INDEX_NAME);
            code.push_str(&compile_files_to_js(options.target, &resolved));

            vec![output_file(format!("{}.{}", INDEX_NAME, extension), &code)]
        }
        OutputMode::Files => {
            // Requested files first, then every file they import from.
            let mut queued: Vec<bool> = files
                .iter()
                .map(|f| to_generate.is_empty() || to_generate.contains(&f.name))
                .collect();
            let mut pending: Vec<usize> = (0..files.len()).filter(|&i| queued[i]).collect();
            let mut rendered: Vec<Option<File>> = vec![None; files.len()];

            while let Some(index) = pending.pop() {
                let file = &files[index];
                let resolved = walker.resolve_file(file)?;
                let name = output_name(&file.name, extension);
                let dependencies = file_imports(walker.registry(), &resolved);

                let mut modules = Vec::with_capacity(dependencies.len());
                for (origin, names) in dependencies {
                    if let Some(dep) = files.iter().position(|f| f.name == origin) {
                        if !queued[dep] {
                            debug!(file = %file.name, dependency = origin, "generating imported file");
                            queued[dep] = true;
                            pending.push(dep);
                        }
                    }
                    modules.push((relative_import(&name, &output_name(origin, extension)), names));
                }

                let mut code = file_header(options.target, &file.name);
                if !modules.is_empty() {
                    code.push('\n');
                    code.push_str(&imports(&modules));
                }
                for def in &resolved.definitions {
                    code.push('\n');
                    code.push_str(&definition(options.target, def));
                }

                rendered[index] = Some(output_file(name, &code));
            }

            rendered.into_iter().flatten().collect()
        }
    };

    info!(files = out.len(), target = ?options.target, mode = ?options.mode, "generated");
    Ok(out)
}

/// Types that `file` uses but another file declares, grouped by the
/// declaring file, both in first-use order.
fn file_imports<'a>(
    registry: &SymbolRegistry<'a>,
    file:     &ResolvedFile,
) -> Vec<(&'a str, Vec<String>)> {
    let mut grouped: Vec<(&'a str, Vec<String>)> = Vec::new();

    let references = file.definitions.iter().flat_map(|def| match def {
        Definition::Message(m) => m.fields.iter().flat_map(|f| f.references.iter()).collect::<Vec<&String>>(),
        Definition::Enum(_)    => Vec::new(),
    });

    for name in references {
        let origin = match registry.origin(name) {
            Some(origin) if origin != file.name => origin,
            _ => continue,
        };

        match grouped.iter_mut().find(|(o, _)| *o == origin) {
            Some((_, names)) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            None => grouped.push((origin, vec![name.clone()])),
        }
    }

    grouped
}

fn output_file(name: String, code: &str) -> File {
    debug!(name = %name, bytes = code.len(), "emitting file");
    File {
        name: Some(name),
        content: Some(trim_leading_blank_lines(code)),
        ..Default::default()
    }
}
