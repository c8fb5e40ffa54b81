use clap::{Parser, Subcommand, ValueEnum};
use prost::Message;
use prost_types::FileDescriptorSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use protoflow_compiler::{
    encode_response, generate_files, generate_from_bytes, resolve_descriptors, respond,
    CompilerError, Options, OutputMode, Target,
};

/// Environment variable holding the log filter (logs go to stderr).
const LOG_ENV: &str = "PROTOC_GEN_FLOW_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-flow")]
#[command(about = "protoc plugin emitting Flow or TypeScript types; runs as a plugin when no command is given", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate type definitions from a `FileDescriptorSet` (`protoc --descriptor_set_out`)
    Generate {
        /// Input descriptor set file
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = TargetArg::Flow)]
        target: TargetArg,

        #[arg(short, long, value_enum, default_value_t = ModeArg::Index)]
        mode: ModeArg,

        /// Output directory (if omitted, prints to stdout)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Print the resolved schema of a `FileDescriptorSet` as JSON
    Dump {
        /// Input descriptor set file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Flow,
    Typescript,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Index,
    Files,
}

fn main() -> Result<(), CompilerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_env_var(LOG_ENV)
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        None => {
            // protoc plugin: request on stdin, response on stdout
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;

            let response = respond(generate_from_bytes(&data));
            io::stdout().write_all(&encode_response(&response))?;
            Ok(())
        }

        Some(Commands::Generate { input, target, mode, out_dir }) => {
            let set = read_descriptor_set(input)?;
            let options = Options {
                target: match target {
                    TargetArg::Flow       => Target::Flow,
                    TargetArg::Typescript => Target::TypeScript,
                },
                mode: match mode {
                    ModeArg::Index => OutputMode::Index,
                    ModeArg::Files => OutputMode::Files,
                },
            };

            let files = generate_files(&set.file, &[], options)?;
            for file in &files {
                let name = file.name.as_deref().unwrap_or_default();
                let content = file.content.as_deref().unwrap_or_default();

                if let Some(dir) = out_dir {
                    let path = dir.join(name);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, content)?;
                    info!(path = %path.display(), "wrote file");
                    println!("Generated {}", path.display());
                } else {
                    println!("// {}\n{}", name, content);
                }
            }
            Ok(())
        }

        Some(Commands::Dump { input }) => {
            let set = read_descriptor_set(input)?;
            let resolved = resolve_descriptors(&set.file)?;
            let json = serde_json::to_string_pretty(&resolved)
                .map_err(|e| CompilerError::Encode(e.to_string()))?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn read_descriptor_set(path: &Path) -> Result<FileDescriptorSet, CompilerError> {
    let data = fs::read(path)?;
    FileDescriptorSet::decode(data.as_slice()).map_err(|e| {
        CompilerError::MalformedInput(format!(
            "unable to parse descriptor set {}: {}",
            path.display(),
            e
        ))
    })
}
