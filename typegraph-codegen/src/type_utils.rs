use heck::{ToPascalCase, ToSnakeCase};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use typegraph::schema::{PredicateKind, PrimitiveType};

/// Convert an entity name to its PascalCase struct name.
/// e.g. "Person" -> "Person", "emailMessage" -> "EmailMessage"
///
/// Names with no letters or digits left after conversion become `UnnamedEntity`.
pub fn entity_struct_name(entity: &str) -> String {
    let name = entity.to_pascal_case();
    if name.is_empty() {
        "UnnamedEntity".to_string()
    } else if name == "Self" {
        "Self_".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{name}")
    } else {
        name
    }
}

/// The Rust type holding a primitive value.
/// Datetimes are milliseconds since the Unix epoch.
pub fn primitive_rust_type(primitive: PrimitiveType) -> TokenStream {
    match primitive {
        PrimitiveType::Bool => quote! { bool },
        PrimitiveType::Int => quote! { i64 },
        PrimitiveType::Float => quote! { f64 },
        PrimitiveType::String => quote! { String },
        PrimitiveType::Datetime => quote! { i64 },
    }
}

/// Map a resolved field kind to its struct field type.
///
/// Properties are optional scalars; relations hold target uids, a single
/// optional uid when the relation is singular.
pub fn field_rust_type(kind: &PredicateKind) -> TokenStream {
    match kind {
        PredicateKind::Primitive(p) => {
            let ty = primitive_rust_type(*p);
            quote! { Option<#ty> }
        }
        PredicateKind::EntityRef { flags, .. } if flags.singular => quote! { Option<u64> },
        PredicateKind::EntityRef { .. } | PredicateKind::Any => quote! { Vec<u64> },
    }
}

/// Convert a field name to a snake_case identifier, escaping Rust keywords.
pub fn safe_field_ident(name: &str) -> proc_macro2::Ident {
    let snake = name.to_snake_case();
    match snake.as_str() {
        "" => format_ident!("unnamed_field"),
        // Not usable as raw identifiers.
        "self" | "super" | "crate" | "_" => format_ident!("{}_", snake),
        "type" | "struct" | "enum" | "fn" | "let" | "mut" | "ref" | "mod" | "use" | "pub"
        | "impl" | "trait" | "for" | "loop" | "while" | "if" | "else" | "match" | "return"
        | "break" | "continue" | "as" | "in" | "where" | "async" | "await" | "dyn" | "move"
        | "static" | "const" | "unsafe" | "extern" | "true" | "false" | "abstract"
        | "become" | "box" | "do" | "final" | "macro" | "override" | "priv" | "typeof"
        | "unsized" | "virtual" | "yield" | "try" => format_ident!("r#{}", snake),
        s if s.starts_with(|c: char| c.is_ascii_digit()) => {
            format_ident!("_{}", snake)
        }
        _ => format_ident!("{}", snake),
    }
}
