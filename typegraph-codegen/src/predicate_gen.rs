use proc_macro2::TokenStream;
use quote::quote;
use typegraph::schema::{PredicateType, PrimitiveType, Schema};

/// Generate the predicate lookup functions and the type table.
pub fn generate_lookups(schema: &Schema, options: &crate::EmitOptions) -> TokenStream {
    let mut edges = Vec::new();
    let mut strings = Vec::new();
    let mut others = Vec::new();

    for predicate in schema.predicates().iter() {
        if !options.includes_field(&predicate.name) {
            continue;
        }
        match schema.predicate_type(&predicate.name) {
            Some(t) if t.is_relation() => edges.push(predicate.name.as_str()),
            Some(PredicateType::Primitive(PrimitiveType::String)) => {
                strings.push(predicate.name.as_str())
            }
            Some(PredicateType::Primitive(p)) => others.push((predicate.name.as_str(), p.as_str())),
            _ => {}
        }
    }

    let other_names = others.iter().map(|(name, _)| name);
    let other_types = others.iter().map(|(_, ty)| ty);

    let inserts = options.entities(schema).map(|entity| {
        let name = &entity.name;
        let fields = options
            .fields(schema, name)
            .into_iter()
            .map(|f| f.name.as_str());
        quote! {
            types.insert(#name, vec![#(#fields),*]);
        }
    });

    quote! {
        /// Predicates stored as graph edges.
        pub fn edge_predicates() -> &'static [&'static str] {
            &[#(#edges),*]
        }

        /// Predicates holding a string value.
        pub fn string_predicates() -> &'static [&'static str] {
            &[#(#strings),*]
        }

        /// Remaining primitive predicates with their type names.
        pub fn other_predicates() -> &'static [(&'static str, &'static str)] {
            &[#((#other_names, #other_types)),*]
        }

        /// Every entity with its fields, inherited ones first.
        pub fn all_types() -> HashMap<&'static str, Vec<&'static str>> {
            let mut types = HashMap::new();
            #(#inserts)*
            types
        }
    }
}
