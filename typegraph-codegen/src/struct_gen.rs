use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use typegraph::schema::{ResolvedField, Schema};

use crate::type_utils::{entity_struct_name, field_rust_type, safe_field_ident};
use crate::EmitOptions;

/// Generate one struct per included entity, carrying its resolved fields.
pub fn generate_structs(schema: &Schema, options: &EmitOptions) -> TokenStream {
    let mut tokens = quote! {
        use serde::{Deserialize, Serialize};
    };

    for entity in options.entities(schema) {
        let struct_ident = format_ident!("{}", entity_struct_name(&entity.name));
        let doc_comment = format!(
            " {}\n\n Path: `{}`",
            entity.description.as_deref().unwrap_or("No description."),
            entity.path_string()
        );

        let field_tokens: Vec<_> = options
            .fields(schema, &entity.name)
            .into_iter()
            .filter_map(|field| generate_field(schema, &entity.name, field))
            .collect();

        tokens.extend(quote! {
            #[doc = #doc_comment]
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            #[serde(default)]
            pub struct #struct_ident {
                #(#field_tokens)*
            }
        });
    }

    tokens
}

/// A struct field with its doc comment and serde rename, or `None` when the
/// field's predicate does not resolve to a type.
fn generate_field(schema: &Schema, entity: &str, field: &ResolvedField) -> Option<TokenStream> {
    let Some(kind) = &field.kind else {
        log::warn!("{entity}.{}: predicate type unresolved; field skipped", field.name);
        return None;
    };

    let ident = safe_field_ident(&field.name);
    let ty = field_rust_type(kind);

    let description = schema
        .predicate(&field.name)
        .and_then(|p| p.description.as_deref())
        .unwrap_or("No description.");
    let doc_comment = if field.is_inherited_by(entity) {
        format!(" {description} Inherited from `{}`.", field.declared_on)
    } else {
        format!(" {description}")
    };

    let unraw = ident.to_string();
    let rename_attr = if unraw.trim_start_matches("r#") != field.name {
        let original = &field.name;
        Some(quote! { #[serde(rename = #original)] })
    } else {
        None
    };

    Some(quote! {
        #[doc = #doc_comment]
        #rename_attr
        pub #ident: #ty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;

    fn render(options: &EmitOptions) -> String {
        let (_tmp, schema) = sample_schema();
        let tokens = generate_structs(&schema, options);
        let file: syn::File = syn::parse2(tokens).expect("structs should parse");
        prettyplease::unparse(&file)
    }

    #[test]
    fn test_struct_per_entity() {
        let code = render(&EmitOptions::default());
        for name in ["Item", "Person", "Student", "Place"] {
            assert!(code.contains(&format!("pub struct {name}")), "Missing {name}");
        }
    }

    #[test]
    fn test_inherited_fields_and_types() {
        let code = render(&EmitOptions::default());
        let student = code
            .split("pub struct Student")
            .nth(1)
            .and_then(|rest| rest.split("pub struct").next())
            .unwrap();

        assert!(student.contains("pub uid: Option<i64>"), "{student}");
        assert!(student.contains("pub date_created: Option<i64>"), "{student}");
        assert!(student.contains("pub label: Vec<u64>"), "{student}");
        assert!(student.contains("pub friend: Vec<u64>"), "{student}");
        assert!(student.contains("pub spouse: Option<u64>"), "{student}");
        assert!(student.contains("pub school: Option<String>"), "{student}");
        assert!(student.contains("Inherited from `Person`"), "{student}");
    }

    #[test]
    fn test_keyword_and_camel_case_fields() {
        let code = render(&EmitOptions::default());
        assert!(code.contains("pub r#type: Option<String>"));
        assert!(code.contains(r#"#[serde(rename = "dateCreated")]"#));
        assert!(!code.contains(r#"#[serde(rename = "uid")]"#));
    }
}
