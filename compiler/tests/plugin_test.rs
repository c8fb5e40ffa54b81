#![cfg(test)]

use prost::Message;
use prost_types::{
    compiler::CodeGeneratorRequest,
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions,
};
use protoflow_compiler::{
    error::{CompilerError, SymbolKind},
    generate, generate_from_bytes, resolve_descriptors, respond,
    types::Definition,
};

fn scalar(name: &str, ty: Type, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name:   Some(name.to_string()),
        r#type: Some(ty as i32),
        label:  Some(label as i32),
        ..Default::default()
    }
}

fn reference(name: &str, ty: Type, label: Label, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, ty, label)
    }
}

fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .map(|(n, v)| EnumValueDescriptorProto {
                name:   Some(n.to_string()),
                number: Some(*v),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![scalar("key", key, Label::Optional), FieldDescriptorProto {
            name: Some("value".to_string()),
            ..value
        }],
        options: Some(MessageOptions { map_entry: Some(true), ..Default::default() }),
        ..Default::default()
    }
}

/// shop/order.proto: the order example with a nested enum, repeated strings,
/// a map, a timestamp and 64-bit integers.
fn shop_file() -> FileDescriptorProto {
    let order = DescriptorProto {
        name: Some("Order".to_string()),
        field: vec![
            reference("status", Type::Enum, Label::Optional, ".shop.Order.Status"),
            scalar("tags", Type::String, Label::Repeated),
            reference("counts", Type::Message, Label::Repeated, ".shop.Order.CountsEntry"),
            reference("created", Type::Message, Label::Optional, ".google.protobuf.Timestamp"),
            reference("history", Type::Message, Label::Repeated, ".google.protobuf.Timestamp"),
            scalar("id", Type::Uint64, Label::Optional),
            scalar("offsets", Type::Sint64, Label::Repeated),
            scalar("total", Type::Double, Label::Optional),
            scalar("paid", Type::Bool, Label::Optional),
            scalar("receipt", Type::Bytes, Label::Optional),
        ],
        enum_type: vec![enumeration("Status", &[("PENDING", 0), ("SHIPPED", 1), ("CANCELLED", 2)])],
        nested_type: vec![map_entry(
            "CountsEntry",
            Type::String,
            scalar("value", Type::Int32, Label::Optional),
        )],
        ..Default::default()
    };

    FileDescriptorProto {
        name:         Some("shop/order.proto".to_string()),
        package:      Some("shop".to_string()),
        message_type: vec![order],
        ..Default::default()
    }
}

fn request(files: Vec<FileDescriptorProto>, parameter: Option<&str>) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: files.iter().filter_map(|f| f.name.clone()).collect(),
        parameter:        parameter.map(str::to_string),
        proto_file:       files,
        ..Default::default()
    }
}

fn field_types(definition: &Definition) -> Vec<(String, String)> {
    match definition {
        Definition::Message(m) => m
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.type_token.clone()))
            .collect(),
        Definition::Enum(e) => panic!("expected a message, got enum {}", e.name),
    }
}

#[test]
fn test_order_field_types() {
    let resolved = resolve_descriptors(&[shop_file()]).expect("resolve failed");
    let defs = &resolved[0].definitions;

    // nested enum first, map entry never emitted, then the message itself
    let names: Vec<&str> = defs.iter().map(Definition::name).collect();
    assert_eq!(names, vec!["Order$Status", "Order"]);

    match &defs[0] {
        Definition::Enum(e) => assert_eq!(e.values, vec!["SHIPPED", "CANCELLED"]),
        other => panic!("expected enum, got {:?}", other),
    }

    let types = field_types(&defs[1]);
    let expected = [
        ("status", "Order$Status"),
        ("tags", "string[]"),
        ("counts", "{ [key: string]: number }"),
        ("created", "string"),
        ("history", "string[]"),
        ("id", "string"),
        ("offsets", "string[]"),
        ("total", "number"),
        ("paid", "boolean"),
        ("receipt", "any"),
    ];
    assert_eq!(types.len(), expected.len());
    for ((name, token), (want_name, want_token)) in types.iter().zip(expected.iter()) {
        assert_eq!(name, want_name);
        assert_eq!(token, want_token, "field {}", name);
    }
}

#[test]
fn test_index_output_flow() {
    let response = generate(request(vec![shop_file()], None)).expect("generate failed");
    assert!(response.error.is_none());
    assert_eq!(response.file.len(), 1);

    let file = &response.file[0];
    assert_eq!(file.name.as_deref(), Some("index.js"));

    let content = file.content.as_deref().unwrap();
    assert!(content.starts_with("// @flow\n"));
    assert!(content.contains("export type Order$Status =\n  | \"SHIPPED\"\n  | \"CANCELLED\";\n"));
    assert!(content.contains("  counts?: { [key: string]: number },\n"));
    assert!(!content.contains("PENDING"));
    assert!(!content.contains("CountsEntry"));
}

#[test]
fn test_typescript_target() {
    let response = generate(request(vec![shop_file()], Some("target=typescript"))).unwrap();
    let file = &response.file[0];
    assert_eq!(file.name.as_deref(), Some("index.ts"));

    let content = file.content.as_deref().unwrap();
    assert!(!content.contains("@flow"));
    assert!(content.contains("export interface Order {\n  status?: Order$Status;\n"));
}

#[test]
fn test_map_with_message_value() {
    let item = DescriptorProto {
        name: Some("Item".to_string()),
        field: vec![scalar("sku", Type::String, Label::Optional)],
        ..Default::default()
    };
    let cart = DescriptorProto {
        name: Some("Cart".to_string()),
        field: vec![reference("items", Type::Message, Label::Repeated, ".shop.Cart.ItemsEntry")],
        nested_type: vec![map_entry(
            "ItemsEntry",
            Type::Int64,
            reference("value", Type::Message, Label::Optional, ".shop.Item"),
        )],
        ..Default::default()
    };
    let file = FileDescriptorProto {
        name:         Some("cart.proto".to_string()),
        package:      Some("shop".to_string()),
        message_type: vec![item, cart],
        ..Default::default()
    };

    let resolved = resolve_descriptors(&[file]).unwrap();
    let types = field_types(&resolved[0].definitions[1]);
    assert_eq!(types[0].1, "{ [key: string]: Item }");
}

#[test]
fn test_forward_reference_resolves() {
    // Payment uses Money before money.proto appears in the request.
    let payment = FileDescriptorProto {
        name:    Some("billing/payment.proto".to_string()),
        package: Some("acme.billing".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Payment".to_string()),
            field: vec![
                reference("amount", Type::Message, Label::Optional, ".acme.common.Money"),
                reference("currency", Type::Enum, Label::Optional, ".acme.common.Currency"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let money = FileDescriptorProto {
        name:      Some("common/money.proto".to_string()),
        package:   Some("acme.common".to_string()),
        enum_type: vec![enumeration("Currency", &[("CURRENCY_UNSET", 0), ("EUR", 1)])],
        message_type: vec![DescriptorProto {
            name: Some("Money".to_string()),
            field: vec![scalar("units", Type::Int64, Label::Optional)],
            ..Default::default()
        }],
        ..Default::default()
    };

    let response = generate(request(vec![payment, money], Some("mode=files"))).unwrap();
    assert!(response.error.is_none());
    assert_eq!(response.file.len(), 2);
    assert_eq!(response.file[0].name.as_deref(), Some("billing/payment.js"));
    assert_eq!(response.file[1].name.as_deref(), Some("common/money.js"));

    let payment_js = response.file[0].content.as_deref().unwrap();
    assert!(payment_js.contains(
        "// ------------------------------------\n\nimport type { Money, Currency } from \"../common/money\";\n\nexport type Payment"
    ));
    assert!(payment_js.contains("  amount?: Money,\n  currency?: Currency,\n"));

    let money_js = response.file[1].content.as_deref().unwrap();
    assert!(!money_js.contains("import type"));
    assert!(money_js.contains("export type Currency =\n  | \"EUR\";\n"));
}

#[test]
fn test_files_mode_only_generates_requested_files() {
    let mut req = request(vec![shop_file()], Some("mode=files"));
    req.file_to_generate = vec!["other.proto".to_string()];

    let response = generate(req).unwrap();
    assert!(response.file.is_empty());
}

#[test]
fn test_unresolved_symbol_aborts_run() {
    let broken = FileDescriptorProto {
        name:    Some("broken.proto".to_string()),
        package: Some("shop".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Broken".to_string()),
            field: vec![reference("kind", Type::Enum, Label::Optional, ".shop.Kind")],
            ..Default::default()
        }],
        ..Default::default()
    };

    match generate(request(vec![shop_file(), broken.clone()], None)) {
        Err(CompilerError::UnresolvedSymbol { kind, name, field }) => {
            assert_eq!(kind, SymbolKind::Enum);
            assert_eq!(name, "shop.Kind");
            assert_eq!(field, "kind");
        }
        other => panic!("expected unresolved symbol, got {:?}", other),
    }

    let response = respond(generate(request(vec![shop_file(), broken], None)));
    assert!(response.file.is_empty());
    assert!(response.error.unwrap().contains("Kind"));
}

#[test]
fn test_bytes_round_trip_through_plugin_entry() {
    let bytes = request(vec![shop_file()], None).encode_to_vec();
    let response = generate_from_bytes(&bytes).unwrap();
    assert_eq!(response.file.len(), 1);

    let err = generate_from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedInput(_)));
}

#[test]
fn test_invalid_parameter_is_reported() {
    let response = respond(generate(request(vec![shop_file()], Some("target=dart"))));
    assert!(response.file.is_empty());
    assert!(response.error.unwrap().contains("dart"));
}

/// api/v1 and api/v2 both declare `Request`; v1 also has `Call` using its own.
fn versioned_api_files() -> Vec<FileDescriptorProto> {
    let v1 = FileDescriptorProto {
        name:    Some("api/v1/service.proto".to_string()),
        package: Some("api.v1".to_string()),
        message_type: vec![
            DescriptorProto {
                name: Some("Request".to_string()),
                field: vec![scalar("old", Type::String, Label::Optional)],
                ..Default::default()
            },
            DescriptorProto {
                name: Some("Call".to_string()),
                field: vec![reference("req", Type::Message, Label::Optional, ".api.v1.Request")],
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let v2 = FileDescriptorProto {
        name:    Some("api/v2/service.proto".to_string()),
        package: Some("api.v2".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Request".to_string()),
            field: vec![scalar("new", Type::Int32, Label::Optional)],
            ..Default::default()
        }],
        ..Default::default()
    };
    vec![v1, v2]
}

#[test]
fn test_shared_name_across_packages_in_index_mode() {
    let response = generate(request(versioned_api_files(), None)).unwrap();
    assert!(response.error.is_none());

    let content = response.file[0].content.as_deref().unwrap();
    assert!(content.contains("export type api$v1$Request = {|\n  old?: string,\n|};"));
    assert!(content.contains("export type api$v2$Request = {|\n  new?: number,\n|};"));
    assert!(content.contains("export type Call = {|\n  req?: api$v1$Request,\n|};"));
    assert!(!content.contains("export type Request "));
}

#[test]
fn test_shared_name_across_packages_in_files_mode() {
    let response = generate(request(versioned_api_files(), Some("mode=files"))).unwrap();
    assert_eq!(response.file.len(), 2);
    assert_eq!(response.file[0].name.as_deref(), Some("api/v1/service.js"));
    assert_eq!(response.file[1].name.as_deref(), Some("api/v2/service.js"));

    let v1 = response.file[0].content.as_deref().unwrap();
    assert!(!v1.contains("import type"));
    assert!(v1.contains("export type api$v1$Request = {|"));
    assert!(v1.contains("  req?: api$v1$Request,\n"));

    let v2 = response.file[1].content.as_deref().unwrap();
    assert!(v2.contains("export type api$v2$Request = {|"));
}

#[test]
fn test_duplicate_declaration_aborts_run() {
    let mut again = shop_file();
    again.name = Some("shop/order_copy.proto".to_string());

    match generate(request(vec![shop_file(), again], None)) {
        Err(CompilerError::DuplicateSymbol { name, first, second, .. }) => {
            assert_eq!(name, "shop.Order.Status");
            assert_eq!(first, "shop/order.proto");
            assert_eq!(second, "shop/order_copy.proto");
        }
        other => panic!("expected duplicate symbol, got {:?}", other),
    }
}

#[test]
fn test_files_mode_emits_imported_dependencies() {
    let duration = FileDescriptorProto {
        name:    Some("google/protobuf/duration.proto".to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Duration".to_string()),
            field: vec![
                scalar("seconds", Type::Int64, Label::Optional),
                scalar("nanos", Type::Int32, Label::Optional),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let job = FileDescriptorProto {
        name:    Some("job.proto".to_string()),
        package: Some("jobs".to_string()),
        dependency: vec!["google/protobuf/duration.proto".to_string()],
        message_type: vec![DescriptorProto {
            name: Some("Job".to_string()),
            field: vec![reference("timeout", Type::Message, Label::Optional, ".google.protobuf.Duration")],
            ..Default::default()
        }],
        ..Default::default()
    };

    let mut req = request(vec![duration, job], Some("mode=files"));
    req.file_to_generate = vec!["job.proto".to_string()];

    let response = generate(req).unwrap();
    let names: Vec<&str> = response.file.iter().filter_map(|f| f.name.as_deref()).collect();
    assert_eq!(names, vec!["google/protobuf/duration.js", "job.js"]);

    let job_js = response.file[1].content.as_deref().unwrap();
    assert!(job_js.contains(
        "// ------------------------------------\n\nimport type { Duration } from \"./google/protobuf/duration\";\n"
    ));
    assert!(job_js.contains("  timeout?: Duration,\n"));

    let duration_js = response.file[0].content.as_deref().unwrap();
    assert!(duration_js.contains("export type Duration = {|\n  seconds?: string,\n  nanos?: number,\n|};"));
}
