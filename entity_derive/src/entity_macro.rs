//! Expansion of `#[entity]`

use crate::parsing::{
    has_attribute, parse_entity_args, parse_field, ColumnInfo, FieldKind, IncludeInfo,
    AUDIT_COLUMNS, AUDIT_FIELD,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{parse_quote, Error, Fields, ItemStruct, Result};

pub fn expand(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    let args = parse_entity_args(attr)?;
    let mut input: ItemStruct = syn::parse2(item)?;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "entity cannot be used on generic structs",
        ));
    }

    let fields = match &mut input.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "entity can only be used on structs with named fields",
            ))
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    let mut relations: Vec<(ColumnInfo, IncludeInfo)> = Vec::new();
    let mut primary_key: Option<ColumnInfo> = None;

    for field in fields.named.iter_mut() {
        let is_primary_key = has_attribute(&field.attrs, "primary_key");

        match parse_field(field)? {
            FieldKind::Column(column) => {
                if is_primary_key {
                    if primary_key.is_some() {
                        return Err(Error::new_spanned(&*field, "only one #[primary_key] is allowed"));
                    }
                    primary_key = Some(ColumnInfo {
                        ident: column.ident.clone(),
                        ty: column.ty.clone(),
                    });
                }
                columns.push(column);
            }
            FieldKind::Relation(column, include) => {
                // Only filled when the path is included; absent otherwise
                field.attrs.push(parse_quote!(#[sqlx(json, default)]));
                field.attrs.push(parse_quote!(#[serde(default)]));
                relations.push((column, include));
            }
        }

        field
            .attrs
            .retain(|attr| !attr.path().is_ident("primary_key") && !attr.path().is_ident("include"));
    }

    let primary_key = match primary_key {
        Some(pk) => pk,
        None => columns
            .iter()
            .find(|column| column.ident == "id")
            .map(|column| ColumnInfo {
                ident: column.ident.clone(),
                ty: column.ty.clone(),
            })
            .ok_or_else(|| {
                Error::new_spanned(
                    &input.ident,
                    "entity needs a field named `id` or one marked #[primary_key]",
                )
            })?,
    };

    for (_, include) in &relations {
        if !columns.iter().any(|column| column.ident == include.local_key.as_str())
            && !AUDIT_COLUMNS.contains(&include.local_key.as_str())
        {
            return Err(Error::new_spanned(
                &input.ident,
                format!(
                    "include '{}' uses local key '{}', which is not a column",
                    include.path, include.local_key
                ),
            ));
        }
    }

    let audit_ident = format_ident!("{}", AUDIT_FIELD);
    fields.named.push(syn::Field::parse_named.parse2(quote! {
        #[serde(flatten)]
        #[sqlx(flatten)]
        pub #audit_ident: entity_store::AuditFields
    })?);

    let name = &input.ident;
    let entity_name = args.name.unwrap_or_else(|| name.to_string());
    let table_name = &args.table;
    let pk_ident = &primary_key.ident;
    let pk_name = pk_ident.to_string();
    let pk_type = &primary_key.ty;

    let column_names = columns
        .iter()
        .map(|column| column.ident.to_string())
        .chain(AUDIT_COLUMNS.iter().map(|c| c.to_string()));

    let relation_entries = relations.iter().map(|(_, include)| {
        let IncludeInfo {
            path,
            table,
            local_key,
            foreign_key,
            many,
        } = include;
        let kind = if *many {
            quote!(entity_store::RelationKind::Many)
        } else {
            quote!(entity_store::RelationKind::One)
        };
        quote! {
            entity_store::Relation {
                path: #path,
                table: #table,
                local_key: #local_key,
                foreign_key: #foreign_key,
                kind: #kind,
            }
        }
    });

    let ctor_params = columns.iter().map(|ColumnInfo { ident, ty }| quote!(#ident: #ty));
    let ctor_columns = columns.iter().map(|column| &column.ident);
    let ctor_relations = relations.iter().map(|(column, _)| &column.ident);

    let vis = &input.vis;
    let expanded = quote! {
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
        #input

        impl entity_store::Entity for #name {
            type Id = #pk_type;

            fn entity_name() -> &'static str {
                #entity_name
            }

            fn table_name() -> &'static str {
                #table_name
            }

            fn primary_key() -> &'static str {
                #pk_name
            }

            fn columns() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn relations() -> &'static [entity_store::Relation] {
                const RELATIONS: &[entity_store::Relation] = &[#(#relation_entries),*];
                RELATIONS
            }

            fn id(&self) -> &Self::Id {
                &self.#pk_ident
            }

            fn audit(&self) -> &entity_store::AuditFields {
                &self.#audit_ident
            }

            fn audit_mut(&mut self) -> &mut entity_store::AuditFields {
                &mut self.#audit_ident
            }
        }

        impl #name {
            /// New active entity with default audit fields; relations start empty
            #[allow(clippy::too_many_arguments)]
            #vis fn new(#(#ctor_params),*) -> Self {
                Self {
                    #(#ctor_columns,)*
                    #(#ctor_relations: ::core::default::Default::default(),)*
                    #audit_ident: entity_store::AuditFields::default(),
                }
            }
        }
    };

    Ok(expanded)
}
