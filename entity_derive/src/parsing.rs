//! Parsing utilities for entity and field attributes
//!
//! This module handles the parsing of `#[entity(...)]`, `#[primary_key]` and
//! `#[include(...)]`, and the compile-time validation of table and column names.

use proc_macro2::{Span, TokenStream};
use syn::meta::ParseNestedMeta;
use syn::parse::Parser;
use syn::{Attribute, Error, Field, Ident, LitStr, Result, Type};

/// Columns contributed by the injected audit field; must match `entity_store::AUDIT_COLUMNS`
pub const AUDIT_COLUMNS: [&str; 8] = [
    "is_active",
    "created_at",
    "created_by",
    "modified_at",
    "modified_by",
    "deleted_at",
    "deleted_by",
    "version",
];

/// Name of the injected audit field
pub const AUDIT_FIELD: &str = "audit";

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

/// Same rules `entity_store::validation` applies at runtime
fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;

    // PostgreSQL limit
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

/// Check if a name is a reserved SQL keyword
/// This mirrors the list in entity_store::validation
fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
        "CONSTRAINT", "CREATE", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END",
        "EXISTS", "FALSE", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INSERT", "INTO",
        "IS", "JOIN", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "PRIMARY",
        "REFERENCES", "RETURNING", "SELECT", "SET", "TABLE", "THEN", "TRUE", "UNION", "UNIQUE",
        "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

fn parse_identifier_value(meta: &ParseNestedMeta) -> Result<LitStr> {
    let value: LitStr = meta.value()?.parse()?;
    validate_identifier(&value.value()).map_err(|e| Error::new(value.span(), e))?;
    Ok(value)
}

/// Arguments of `#[entity(table = "...", name = "...")]`
#[derive(Debug)]
pub struct EntityArgs {
    pub table: String,
    /// Overrides the struct name as the entity (and cache key) name
    pub name: Option<String>,
}

pub fn parse_entity_args(tokens: TokenStream) -> Result<EntityArgs> {
    let mut table: Option<LitStr> = None;
    let mut name: Option<LitStr> = None;

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("table") {
            table = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported entity property, expected `table` or `name`"))
        }
    });
    parser.parse2(tokens)?;

    let table = table.ok_or_else(|| {
        Error::new(
            Span::call_site(),
            "table is required: use #[entity(table = \"table_name\")]",
        )
    })?;
    validate_table_name_syn(&table.value(), table.span())?;

    Ok(EntityArgs {
        table: table.value(),
        name: name.map(|n| n.value()),
    })
}

/// Metadata of one `#[include(...)]` field
#[derive(Debug)]
pub struct IncludeInfo {
    pub path: String,
    pub table: String,
    pub local_key: String,
    pub foreign_key: String,
    pub many: bool,
}

/// A stored column of the entity
#[derive(Debug)]
pub struct ColumnInfo {
    pub ident: Ident,
    pub ty: Type,
}

#[derive(Debug)]
pub enum FieldKind {
    Column(ColumnInfo),
    Relation(ColumnInfo, IncludeInfo),
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

fn parse_include(attr: &Attribute, path: &str) -> Result<IncludeInfo> {
    let mut table = None;
    let mut local_key = None;
    let mut foreign_key = None;
    let mut many = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("table") {
            table = Some(parse_identifier_value(&meta)?.value());
        } else if meta.path.is_ident("local") {
            local_key = Some(parse_identifier_value(&meta)?.value());
        } else if meta.path.is_ident("foreign") {
            foreign_key = Some(parse_identifier_value(&meta)?.value());
        } else if meta.path.is_ident("many") {
            many = true;
        } else {
            return Err(meta.error(
                "unsupported include property, expected `table`, `local`, `foreign` or `many`",
            ));
        }
        Ok(())
    })?;

    let missing = |what: &str| Error::new_spanned(attr, format!("include requires `{}`", what));
    Ok(IncludeInfo {
        path: path.to_string(),
        table: table.ok_or_else(|| missing("table"))?,
        local_key: local_key.ok_or_else(|| missing("local"))?,
        foreign_key: foreign_key.ok_or_else(|| missing("foreign"))?,
        many,
    })
}

/// Classify a field and validate its name
pub fn parse_field(field: &Field) -> Result<FieldKind> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
    let name = ident.to_string();

    validate_field_name_syn(&name, ident.span())?;
    if name == AUDIT_FIELD || AUDIT_COLUMNS.contains(&name.as_str()) {
        return Err(Error::new(
            ident.span(),
            format!("'{}' is provided by the injected audit fields", name),
        ));
    }

    let column = ColumnInfo {
        ident,
        ty: field.ty.clone(),
    };

    match field.attrs.iter().find(|attr| attr.path().is_ident("include")) {
        Some(attr) => {
            if has_attribute(&field.attrs, "primary_key") {
                return Err(Error::new_spanned(attr, "a relation cannot be the primary key"));
            }
            let include = parse_include(attr, &name)?;
            Ok(FieldKind::Relation(column, include))
        }
        None => Ok(FieldKind::Column(column)),
    }
}
