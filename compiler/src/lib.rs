//! protoflow-compiler
//!
//! This crate implements:
//!  1) Conversion of protoc `FileDescriptorProto`s into a small schema model,
//!  2) A symbol registry of every message and enum, keyed by qualified name,
//!  3) A two-pass namespace walker and the field type resolver (scalars,
//!     64-bit strings, enum/message references, inlined maps, timestamps),
//!  4) Flow and TypeScript templates (`gen_js`),
//!  5) The protoc plugin driver (`plugin::generate`), plugin options, and
//!     error types (`CompilerError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod config;
pub mod descriptor;
pub mod scalar;
pub mod registry;
pub mod resolver;
pub mod walker;
pub mod gen_js;
pub mod plugin;

pub use config::{Options, OutputMode, Target};
pub use error::CompilerError;
pub use plugin::{encode_response, generate, generate_files, generate_from_bytes, resolve_descriptors, respond};
pub use walker::walk;
