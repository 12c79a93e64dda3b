use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use syn::{
    Attribute, Expr, ExprLit, Fields, GenericArgument, Item, ItemEnum, ItemStruct, Lit, LitBool,
    LitStr, Meta, PathArguments, Token, Type, UseTree, ext::IdentExt,
};
use tracing::{debug, info};

use crate::{
    codegen::naming::{to_pascal_case, to_snake_case, unraw},
    errors::SyncError,
    types::{EntityField, EntityModel, EntityRelation, FieldType, IndexDescriptor, ModelRegistry},
};

/// Reads a generated entity file back into a [`ModelRegistry`].
///
/// Every inline module holding a `Model` struct with
/// `#[sea_orm(table_name = "...")]` becomes one entity. Class names come from
/// the `pub use <module>::Entity as <Class>;` re-exports, falling back to the
/// PascalCase module name.
pub struct ModelLoader {
    prefix: String,
}

struct ParsedField {
    variant: String,
    field: EntityField,
}

struct ParsedRelation {
    name: String,
    table_hint: Option<String>,
    target_module: String,
    from: Vec<String>,
    to: Vec<String>,
}

struct ParsedModule {
    module: String,
    table_name: String,
    fields: Vec<ParsedField>,
    relations: Vec<ParsedRelation>,
    indexes: Vec<IndexDescriptor>,
}

impl ParsedModule {
    fn column_for(&self, variant: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.variant == variant)
            .map(|f| f.field.name.as_str())
    }
}

impl ModelLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn load(&self, path: &Path) -> Result<ModelRegistry, SyncError> {
        let source = fs::read_to_string(path).map_err(|e| SyncError::load(path, e.to_string()))?;
        let registry = self.load_str(&source, path)?;
        info!(
            "📦 Loaded {} entities from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parses `source`; `path` only labels errors.
    pub fn load_str(&self, source: &str, path: &Path) -> Result<ModelRegistry, SyncError> {
        let ctx = LoadContext { path };
        let file = syn::parse_file(source).map_err(|e| ctx.err(format!("not valid Rust: {}", e)))?;

        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut modules: Vec<ParsedModule> = Vec::new();

        for item in &file.items {
            match item {
                Item::Use(item_use) => collect_alias(&item_use.tree, &mut aliases),
                Item::Mod(item_mod) => {
                    let Some((_, items)) = &item_mod.content else {
                        continue;
                    };
                    let module = item_mod.ident.unraw().to_string();
                    if let Some(parsed) = ctx.parse_module(&module, items)? {
                        modules.push(parsed);
                    }
                }
                _ => {}
            }
        }

        if modules.is_empty() {
            return Err(ctx.err("no entities found"));
        }

        let by_module: HashMap<&str, &ParsedModule> =
            modules.iter().map(|m| (m.module.as_str(), m)).collect();

        let mut registry = ModelRegistry::new();
        for parsed in &modules {
            let class_name = aliases
                .get(&parsed.module)
                .cloned()
                .unwrap_or_else(|| to_pascal_case(&parsed.module));

            let relations = parsed
                .relations
                .iter()
                .map(|r| self.resolve_relation(&ctx, parsed, r, &by_module))
                .collect::<Result<Vec<_>, _>>()?;

            let entity = EntityModel {
                class_name: class_name.clone(),
                module_name: parsed.module.clone(),
                table_name: parsed.table_name.clone(),
                fields: parsed.fields.iter().map(|f| f.field.clone()).collect(),
                relations,
                indexes: parsed.indexes.clone(),
            };

            if entity.primary_key().is_empty() {
                return Err(ctx.err(format!("entity {} declares no primary key", class_name)));
            }
            if registry.insert(entity).is_some() {
                return Err(ctx.err(format!("class {} is defined twice", class_name)));
            }
            debug!(class = %class_name, table = %parsed.table_name, "Loaded entity");
        }

        Ok(registry)
    }

    fn resolve_relation(
        &self,
        ctx: &LoadContext,
        owner: &ParsedModule,
        relation: &ParsedRelation,
        by_module: &HashMap<&str, &ParsedModule>,
    ) -> Result<EntityRelation, SyncError> {
        let target_module = if relation.target_module.is_empty() {
            owner.module.as_str()
        } else {
            relation.target_module.as_str()
        };
        let target = by_module.get(target_module);

        let referenced_table = relation
            .table_hint
            .clone()
            .or_else(|| target.map(|t| t.table_name.clone()))
            .unwrap_or_else(|| format!("{}{}", self.prefix, target_module));

        let columns = relation
            .from
            .iter()
            .map(|variant| {
                owner.column_for(variant).map(str::to_string).ok_or_else(|| {
                    ctx.err(format!(
                        "relation {}::{} uses unknown column {}",
                        owner.module, relation.name, variant
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let referenced_columns = relation
            .to
            .iter()
            .map(|variant| {
                target
                    .and_then(|t| t.column_for(variant))
                    .map(str::to_string)
                    .unwrap_or_else(|| to_snake_case(variant))
            })
            .collect();

        Ok(EntityRelation {
            name: relation.name.clone(),
            columns,
            referenced_table,
            referenced_columns,
        })
    }
}

struct LoadContext<'a> {
    path: &'a Path,
}

impl LoadContext<'_> {
    fn err(&self, reason: impl Into<String>) -> SyncError {
        SyncError::Load {
            path: PathBuf::from(self.path),
            reason: reason.into(),
        }
    }

    fn parse_module(&self, module: &str, items: &[Item]) -> Result<Option<ParsedModule>, SyncError> {
        let model = items.iter().find_map(|item| match item {
            Item::Struct(s) if s.ident == "Model" => Some(s),
            _ => None,
        });
        let Some(model) = model else {
            return Ok(None);
        };
        let Some(table_name) = self.table_name(module, model)? else {
            return Ok(None);
        };

        let fields = self.parse_fields(module, model)?;
        let indexes = model
            .attrs
            .iter()
            .filter_map(doc_text)
            .filter_map(|doc| parse_index_doc(&doc))
            .collect();

        let relations = match items.iter().find_map(|item| match item {
            Item::Enum(e) if e.ident == "Relation" => Some(e),
            _ => None,
        }) {
            Some(relation_enum) => self.parse_relations(module, relation_enum)?,
            None => Vec::new(),
        };

        Ok(Some(ParsedModule {
            module: module.to_string(),
            table_name,
            fields,
            relations,
            indexes,
        }))
    }

    fn table_name(&self, module: &str, model: &ItemStruct) -> Result<Option<String>, SyncError> {
        let mut table_name = None;
        for attr in model.attrs.iter().filter(|a| a.path().is_ident("sea_orm")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table_name") {
                    let value: LitStr = meta.value()?.parse()?;
                    table_name = Some(value.value());
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })
            .map_err(|e| self.err(format!("{}::Model: {}", module, e)))?;
        }
        Ok(table_name)
    }

    fn parse_fields(&self, module: &str, model: &ItemStruct) -> Result<Vec<ParsedField>, SyncError> {
        let Fields::Named(named) = &model.fields else {
            return Err(self.err(format!("{}::Model must have named fields", module)));
        };

        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            let Some(ident) = &field.ident else { continue };
            let ident = ident.unraw().to_string();
            let (optional, inner) = unwrap_option(&field.ty);

            let mut primary_key = false;
            let mut auto_increment = None;
            let mut column_name = None;
            let mut column_type = None;
            let mut nullable = optional;
            let mut unique = false;
            let mut indexed = false;

            for attr in field.attrs.iter().filter(|a| a.path().is_ident("sea_orm")) {
                attr.parse_nested_meta(|meta| {
                    let path = &meta.path;
                    if path.is_ident("primary_key") {
                        primary_key = true;
                    } else if path.is_ident("auto_increment") {
                        let value: LitBool = meta.value()?.parse()?;
                        auto_increment = Some(value.value);
                    } else if path.is_ident("column_name") {
                        let value: LitStr = meta.value()?.parse()?;
                        column_name = Some(value.value());
                    } else if path.is_ident("column_type") {
                        let value: LitStr = meta.value()?.parse()?;
                        column_type = Some(value.value());
                    } else if path.is_ident("nullable") {
                        nullable = true;
                    } else if path.is_ident("unique") {
                        unique = true;
                    } else if path.is_ident("indexed") {
                        indexed = true;
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                })
                .map_err(|e| self.err(format!("{}::Model.{}: {}", module, ident, e)))?;
            }

            let field_type = match &column_type {
                Some(text) => FieldType::parse_column_type(text),
                None => type_name(inner).as_deref().and_then(FieldType::from_rust_type),
            }
            .ok_or_else(|| {
                self.err(format!(
                    "{}::Model.{} has an unknown column type {}",
                    module,
                    ident,
                    column_type.as_deref().unwrap_or("(none)")
                ))
            })?;

            let default = field.attrs.iter().filter_map(doc_text).find_map(|doc| {
                doc.trim()
                    .strip_prefix("SQL default:")
                    .map(|d| d.trim().to_string())
            });

            fields.push(ParsedField {
                variant: to_pascal_case(&ident),
                field: EntityField {
                    name: column_name.unwrap_or_else(|| ident.clone()),
                    field_type,
                    nullable: nullable && !primary_key,
                    primary_key,
                    auto_increment: auto_increment.unwrap_or(primary_key),
                    unique,
                    indexed,
                    default,
                },
            });
        }
        Ok(fields)
    }

    fn parse_relations(&self, module: &str, relation_enum: &ItemEnum) -> Result<Vec<ParsedRelation>, SyncError> {
        let mut relations = Vec::new();
        for variant in &relation_enum.variants {
            let mut belongs_to = None;
            let mut from = None;
            let mut to = None;

            for attr in variant.attrs.iter().filter(|a| a.path().is_ident("sea_orm")) {
                attr.parse_nested_meta(|meta| {
                    let slot = if meta.path.is_ident("belongs_to") {
                        &mut belongs_to
                    } else if meta.path.is_ident("from") {
                        &mut from
                    } else if meta.path.is_ident("to") {
                        &mut to
                    } else {
                        return skip_value(&meta);
                    };
                    let value: LitStr = meta.value()?.parse()?;
                    *slot = Some(value.value());
                    Ok(())
                })
                .map_err(|e| self.err(format!("{}::Relation::{}: {}", module, variant.ident, e)))?;
            }

            // has_many and friends carry no foreign key of their own.
            let Some(belongs_to) = belongs_to else {
                continue;
            };
            let (Some(from), Some(to)) = (from, to) else {
                return Err(self.err(format!(
                    "{}::Relation::{} needs both `from` and `to`",
                    module, variant.ident
                )));
            };

            let table_hint = variant.attrs.iter().filter_map(doc_text).find_map(|doc| {
                let rest = doc.trim().strip_prefix("References table `")?;
                rest.split_once('`').map(|(table, _)| table.to_string())
            });

            relations.push(ParsedRelation {
                name: variant.ident.unraw().to_string(),
                table_hint,
                target_module: target_module(&belongs_to),
                from: column_variants(&from),
                to: column_variants(&to),
            });
        }
        Ok(relations)
    }
}

/// Records `pub use <module>::Entity as <Class>;`.
fn collect_alias(tree: &UseTree, aliases: &mut HashMap<String, String>) {
    match tree {
        UseTree::Path(path) => {
            if let UseTree::Rename(rename) = path.tree.as_ref() {
                if rename.ident == "Entity" {
                    aliases.insert(path.ident.unraw().to_string(), rename.rename.unraw().to_string());
                }
            }
        }
        UseTree::Group(group) => {
            for item in &group.items {
                collect_alias(item, aliases);
            }
        }
        _ => {}
    }
}

/// Consumes `= <expr>` after an attribute key we do not interpret.
fn skip_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

fn doc_text(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

/// ``Unique index `name` on (`a`, `b`).`` → index `name` over `a`, `b`.
fn parse_index_doc(doc: &str) -> Option<IndexDescriptor> {
    let doc = doc.trim();
    let (unique, rest) = if let Some(rest) = doc.strip_prefix("Unique index ") {
        (true, rest)
    } else {
        (false, doc.strip_prefix("Index ")?)
    };

    // Names sit at the odd positions between backticks.
    let mut names = rest.split('`').skip(1).step_by(2).map(str::to_string);
    let name = names.next()?;
    let columns: Vec<String> = names.collect();
    if columns.is_empty() {
        return None;
    }
    Some(IndexDescriptor {
        name,
        columns,
        unique,
    })
}

/// `Option<T>` → `(true, T)`, anything else → `(false, ty)`.
fn unwrap_option(ty: &Type) -> (bool, &Type) {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return (true, inner);
                    }
                }
            }
        }
    }
    (false, ty)
}

/// Last path segment of a type, with `Vec<u8>` spelled out.
fn type_name(ty: &Type) -> Option<String> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let name = segment.ident.to_string();
    if name != "Vec" {
        return Some(name);
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(format!("Vec<{}>", type_name(inner)?)),
            _ => None,
        },
        _ => None,
    }
}

/// `super::orders::Entity` → `orders`; a bare `Entity` refers to the own module (empty).
fn target_module(belongs_to: &str) -> String {
    let segments: Vec<&str> = belongs_to.split("::").map(str::trim).collect();
    match segments.as_slice() {
        [.., module, "Entity"] if *module != "super" && *module != "self" => unraw(module).to_string(),
        _ => String::new(),
    }
}

/// `Column::OrderId` → `["OrderId"]`, `(Column::A, Column::B)` → `["A", "B"]`.
fn column_variants(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.rsplit("::").next())
        .map(str::to_string)
        .collect()
}
