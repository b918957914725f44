//! CRUD code generator
//!
//! Reflects a table through [`db_inspector::table_columns`] and renders a
//! Rust model, a sqlx repository and a TypeScript client for it. Preview only;
//! nothing is written to disk.

use std::fmt::Write;

use shared::error::{AppError, AppResult};
use shared::models::{GenRequest, GeneratedFile, TableColumn};
use sqlx::SqlitePool;

use super::db_inspector;

const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Rust and TypeScript type pair for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub rust: &'static str,
    pub ts: &'static str,
}

/// Map a declared SQLite column type to field types
///
/// Follows SQLite affinity rules loosely: anything containing INT is an
/// integer, REAL/FLOA/DOUB is a float, and so on. Unknown types are text.
pub fn field_type(data_type: &str) -> FieldType {
    let upper = data_type.to_ascii_uppercase();
    if upper.starts_with("BOOL") {
        FieldType { rust: "bool", ts: "boolean" }
    } else if upper.contains("INT") {
        FieldType { rust: "i64", ts: "number" }
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        FieldType { rust: "f64", ts: "number" }
    } else if upper.contains("BLOB") {
        FieldType { rust: "Vec<u8>", ts: "string" }
    } else {
        FieldType { rust: "String", ts: "string" }
    }
}

/// `sys_dict_item` -> `SysDictItem`
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `sys_dict_item` -> `sysDictItem`
pub fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `SysDictItem` -> `sys_dict_item`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Words that cannot be used as a bare Rust identifier
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that are not allowed as raw identifiers either
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super", "_"];

/// Rust field identifier for a column
///
/// Keywords become raw identifiers (`r#type`), which sqlx and serde both read
/// as the plain column name. The few words that cannot be raw get a trailing
/// `_` and an explicit rename from [`field_renames`].
pub fn rust_ident(name: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Rename attributes needed when [`rust_ident`] had to change the name
fn field_renames(column: &TableColumn, from_row: bool) -> Vec<String> {
    if !NON_RAW_KEYWORDS.contains(&column.name.as_str()) {
        return Vec::new();
    }
    let mut attrs = vec![format!("#[serde(rename = \"{}\")]", camel_case(&column.name))];
    if from_row {
        attrs.push(format!("#[sqlx(rename = \"{}\")]", column.name));
    }
    attrs
}

fn write_field(out: &mut String, column: &TableColumn, ty: &str, from_row: bool) {
    for attr in field_renames(column, from_row) {
        let _ = writeln!(out, "    {attr}");
    }
    let _ = writeln!(out, "    pub {}: {ty},", rust_ident(&column.name));
}

fn rust_field(column: &TableColumn) -> String {
    let ty = field_type(&column.data_type).rust;
    if column.primary_key || column.not_null {
        ty.to_string()
    } else {
        format!("Option<{ty}>")
    }
}

fn is_optional(column: &TableColumn) -> bool {
    !column.primary_key && !column.not_null
}

/// Everything a template needs about the target table
struct Target<'a> {
    table: &'a str,
    name: String,
    module: String,
    api_prefix: String,
    pk: Option<&'a TableColumn>,
    columns: &'a [TableColumn],
}

impl<'a> Target<'a> {
    fn new(req: &'a GenRequest, columns: &'a [TableColumn]) -> AppResult<Self> {
        let name = match req.struct_name.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => pascal_case(custom),
            _ => pascal_case(&req.table),
        };
        if name.is_empty() {
            return Err(AppError::validation("structName is invalid"));
        }
        let api_prefix = req
            .api_prefix
            .as_deref()
            .map(|p| p.trim().trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_API_PREFIX)
            .to_string();

        Ok(Self {
            table: &req.table,
            module: snake_case(&name),
            name,
            api_prefix,
            pk: columns.iter().find(|c| c.primary_key),
            columns,
        })
    }

    /// Columns the caller supplies on insert
    fn writable(&self) -> impl Iterator<Item = &'a TableColumn> + '_ {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    fn pk_name(&self) -> &str {
        self.pk.map(|c| c.name.as_str()).unwrap_or("id")
    }

    fn pk_rust(&self) -> &'static str {
        self.pk
            .map(|c| field_type(&c.data_type).rust)
            .unwrap_or("i64")
    }

    fn pk_ts(&self) -> &'static str {
        self.pk.map(|c| field_type(&c.data_type).ts).unwrap_or("number")
    }
}

fn render_rust_model(t: &Target<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "//! {} Model\n", t.name);
    let _ = writeln!(out, "use serde::{{Deserialize, Serialize}};\n");

    let _ = writeln!(out, "/// One row of `{}`", t.table);
    let _ = writeln!(out, "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]");
    let _ = writeln!(out, "#[serde(rename_all = \"camelCase\")]");
    let _ = writeln!(out, "pub struct {} {{", t.name);
    for column in t.columns {
        write_field(&mut out, column, &rust_field(column), true);
    }
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(out, "/// Create payload");
    let _ = writeln!(out, "#[derive(Debug, Clone, Serialize, Deserialize)]");
    let _ = writeln!(out, "#[serde(rename_all = \"camelCase\")]");
    let _ = writeln!(out, "pub struct {}Create {{", t.name);
    for column in t.writable() {
        write_field(&mut out, column, &rust_field(column), false);
    }
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(out, "/// Update payload (omitted fields keep their value)");
    let _ = writeln!(out, "#[derive(Debug, Clone, Default, Serialize, Deserialize)]");
    let _ = writeln!(out, "#[serde(rename_all = \"camelCase\")]");
    let _ = writeln!(out, "pub struct {}Update {{", t.name);
    for column in t.writable() {
        let ty = field_type(&column.data_type).rust;
        write_field(&mut out, column, &format!("Option<{ty}>"), false);
    }
    let _ = writeln!(out, "}}");
    out
}

fn render_rust_repository(t: &Target<'_>) -> String {
    let name = &t.name;
    let table = t.table;
    let pk = t.pk_name();
    let pk_ty = t.pk_rust();
    let writable: Vec<&TableColumn> = t.writable().collect();
    let select_cols = t
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let insert_cols = writable
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; writable.len()].join(", ");
    let assignments = writable
        .iter()
        .map(|c| format!("{0} = COALESCE(?, {0})", c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    let _ = writeln!(out, "//! {name} Repository\n");
    let _ = writeln!(out, "use sqlx::SqlitePool;\n");
    let _ = writeln!(out, "use super::{{RepoError, RepoResult}};");
    let _ = writeln!(
        out,
        "use crate::models::{}::{{{name}, {name}Create, {name}Update}};\n",
        t.module
    );
    let _ = writeln!(out, "const COLUMNS: &str = \"{select_cols}\";\n");

    let _ = writeln!(out, "pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<{name}>> {{");
    let _ = writeln!(
        out,
        "    let rows = sqlx::query_as(&format!(\"SELECT {{COLUMNS}} FROM {table} ORDER BY {pk}\"))"
    );
    let _ = writeln!(out, "        .fetch_all(pool)\n        .await?;");
    let _ = writeln!(out, "    Ok(rows)\n}}\n");

    let _ = writeln!(
        out,
        "pub async fn find_by_id(pool: &SqlitePool, id: {pk_ty}) -> RepoResult<Option<{name}>> {{"
    );
    let _ = writeln!(
        out,
        "    let row = sqlx::query_as(&format!(\"SELECT {{COLUMNS}} FROM {table} WHERE {pk} = ?\"))"
    );
    let _ = writeln!(out, "        .bind(id)\n        .fetch_optional(pool)\n        .await?;");
    let _ = writeln!(out, "    Ok(row)\n}}\n");

    let _ = writeln!(
        out,
        "pub async fn create(pool: &SqlitePool, data: &{name}Create) -> RepoResult<{name}> {{"
    );
    if writable.is_empty() {
        let _ = writeln!(
            out,
            "    let id: {pk_ty} = sqlx::query_scalar(\"INSERT INTO {table} DEFAULT VALUES RETURNING {pk}\")"
        );
    } else {
        let _ = writeln!(
            out,
            "    let id: {pk_ty} = sqlx::query_scalar(\n        \"INSERT INTO {table} ({insert_cols}) VALUES ({placeholders}) RETURNING {pk}\",\n    )"
        );
        for column in &writable {
            let _ = writeln!(out, "    .bind(&data.{})", rust_ident(&column.name));
        }
    }
    let _ = writeln!(out, "    .fetch_one(pool)\n    .await?;");
    let _ = writeln!(out, "    find_by_id(pool, id)");
    let _ = writeln!(out, "        .await?");
    let _ = writeln!(
        out,
        "        .ok_or_else(|| RepoError::Database(\"created row not found\".into()))\n}}\n"
    );

    let _ = writeln!(
        out,
        "pub async fn update(pool: &SqlitePool, id: {pk_ty}, data: &{name}Update) -> RepoResult<{name}> {{"
    );
    if !writable.is_empty() {
        let _ = writeln!(
            out,
            "    let result = sqlx::query(\"UPDATE {table} SET {assignments} WHERE {pk} = ?\")"
        );
        for column in &writable {
            let _ = writeln!(out, "        .bind(&data.{})", rust_ident(&column.name));
        }
        let _ = writeln!(out, "        .bind(id)\n        .execute(pool)\n        .await?;");
        let _ = writeln!(out, "    if result.rows_affected() == 0 {{");
        let _ = writeln!(
            out,
            "        return Err(RepoError::NotFound(format!(\"{table} {{id}} not found\")));\n    }}"
        );
    }
    let _ = writeln!(out, "    find_by_id(pool, id)");
    let _ = writeln!(out, "        .await?");
    let _ = writeln!(
        out,
        "        .ok_or_else(|| RepoError::NotFound(format!(\"{table} {{id}} not found\")))\n}}\n"
    );

    let _ = writeln!(out, "pub async fn delete(pool: &SqlitePool, id: {pk_ty}) -> RepoResult<bool> {{");
    let _ = writeln!(out, "    let result = sqlx::query(\"DELETE FROM {table} WHERE {pk} = ?\")");
    let _ = writeln!(out, "        .bind(id)\n        .execute(pool)\n        .await?;");
    let _ = writeln!(out, "    Ok(result.rows_affected() > 0)\n}}");
    out
}

fn render_ts_types(t: &Target<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "export interface {} {{", t.name);
    for column in t.columns {
        let ty = field_type(&column.data_type).ts;
        let opt = if is_optional(column) { "?" } else { "" };
        let _ = writeln!(out, "  {}{opt}: {ty};", camel_case(&column.name));
    }
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(out, "export type {0}Create = Omit<{0}, '{1}'>;", t.name, camel_case(t.pk_name()));
    let _ = writeln!(out, "export type {0}Update = Partial<{0}Create>;", t.name);
    out
}

fn render_ts_api(t: &Target<'_>) -> String {
    let name = &t.name;
    let var = camel_case(name);
    let base = format!("{}/{}", t.api_prefix, t.module.replace('_', "-"));
    let pk_ts = t.pk_ts();

    let mut out = String::new();
    let _ = writeln!(out, "import request from '@/utils/request';");
    let _ = writeln!(
        out,
        "import type {{ {name}, {name}Create, {name}Update }} from './types';\n"
    );
    let _ = writeln!(out, "export const list{name} = () =>");
    let _ = writeln!(out, "  request.get<{name}[]>('{base}');\n");
    let _ = writeln!(out, "export const get{name} = (id: {pk_ts}) =>");
    let _ = writeln!(out, "  request.get<{name}>(`{base}/${{id}}`);\n");
    let _ = writeln!(out, "export const create{name} = ({var}: {name}Create) =>");
    let _ = writeln!(out, "  request.post<{name}>('{base}', {var});\n");
    let _ = writeln!(out, "export const update{name} = (id: {pk_ts}, {var}: {name}Update) =>");
    let _ = writeln!(out, "  request.put<{name}>(`{base}/${{id}}`, {var});\n");
    let _ = writeln!(out, "export const delete{name} = (id: {pk_ts}) =>");
    let _ = writeln!(out, "  request.delete<null>(`{base}/${{id}}`);");
    out
}

/// Render every file for one table
pub fn render(req: &GenRequest, columns: &[TableColumn]) -> AppResult<Vec<GeneratedFile>> {
    let t = Target::new(req, columns)?;
    let ts_dir = t.module.replace('_', "-");

    Ok(vec![
        GeneratedFile {
            path: format!("src/models/{}.rs", t.module),
            language: "rust".into(),
            content: render_rust_model(&t),
        },
        GeneratedFile {
            path: format!("src/db/repository/{}.rs", t.module),
            language: "rust".into(),
            content: render_rust_repository(&t),
        },
        GeneratedFile {
            path: format!("web/src/api/{ts_dir}/types.ts"),
            language: "typescript".into(),
            content: render_ts_types(&t),
        },
        GeneratedFile {
            path: format!("web/src/api/{ts_dir}/index.ts"),
            language: "typescript".into(),
            content: render_ts_api(&t),
        },
    ])
}

/// Generate CRUD sources for an existing table
pub async fn preview(pool: &SqlitePool, req: &GenRequest) -> AppResult<Vec<GeneratedFile>> {
    let columns = db_inspector::table_columns(pool, &req.table).await?;
    render(req, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::error::ErrorCode;

    fn column(name: &str, data_type: &str, not_null: bool, pk: bool) -> TableColumn {
        TableColumn {
            name: name.into(),
            data_type: data_type.into(),
            not_null,
            default_value: None,
            primary_key: pk,
        }
    }

    fn request(table: &str) -> GenRequest {
        GenRequest {
            table: table.into(),
            struct_name: None,
            api_prefix: None,
        }
    }

    #[test]
    fn test_naming() {
        assert_eq!(pascal_case("sys_dict_item"), "SysDictItem");
        assert_eq!(camel_case("sys_dict_item"), "sysDictItem");
        assert_eq!(snake_case("SysDictItem"), "sys_dict_item");
        assert_eq!(camel_case("created_at"), "createdAt");
        assert_eq!(pascal_case("__a__b"), "AB");
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(field_type("INTEGER").rust, "i64");
        assert_eq!(field_type("bigint").ts, "number");
        assert_eq!(field_type("REAL").rust, "f64");
        assert_eq!(field_type("DOUBLE PRECISION").rust, "f64");
        assert_eq!(field_type("BOOLEAN"), FieldType { rust: "bool", ts: "boolean" });
        assert_eq!(field_type("BLOB").rust, "Vec<u8>");
        assert_eq!(field_type("VARCHAR(64)").rust, "String");
        assert_eq!(field_type("").ts, "string");
    }

    #[test]
    fn test_render_nullable_columns() {
        let columns = vec![
            column("id", "INTEGER", false, true),
            column("dict_label", "TEXT", true, false),
            column("remark", "TEXT", false, false),
            column("price", "REAL", true, false),
        ];
        let files = render(&request("sys_dict_item"), &columns).unwrap();
        assert_eq!(files.len(), 4);

        let model = &files[0];
        assert_eq!(model.path, "src/models/sys_dict_item.rs");
        assert!(model.content.contains("pub struct SysDictItem {"));
        assert!(model.content.contains("pub id: i64,"));
        assert!(model.content.contains("pub remark: Option<String>,"));
        assert!(model.content.contains("pub price: f64,"));
        assert!(model.content.contains("pub struct SysDictItemCreate {"));
        assert!(model.content.contains("pub price: Option<f64>,"));

        let repo = &files[1];
        assert!(repo.content.contains(
            "INSERT INTO sys_dict_item (dict_label, remark, price) VALUES (?, ?, ?) RETURNING id"
        ));
        assert!(repo.content.contains("dict_label = COALESCE(?, dict_label)"));

        let types = &files[2];
        assert_eq!(types.path, "web/src/api/sys-dict-item/types.ts");
        assert!(types.content.contains("export interface SysDictItem {"));
        assert!(types.content.contains("  dictLabel: string;"));
        assert!(types.content.contains("  remark?: string;"));
        assert!(types.content.contains("Omit<SysDictItem, 'id'>"));

        let api = &files[3];
        assert!(api.content.contains("'/api/v1/sys-dict-item'"));
        assert!(api.content.contains("export const deleteSysDictItem = (id: number)"));
    }

    #[test]
    fn test_keyword_columns_are_escaped() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("self"), "self_");
        assert_eq!(rust_ident("dict_type"), "dict_type");

        let columns = vec![
            column("id", "INTEGER", false, true),
            column("type", "TEXT", true, false),
            column("match", "INTEGER", false, false),
            column("self", "TEXT", true, false),
        ];
        let files = render(&request("sys_rule"), &columns).unwrap();

        let model = &files[0].content;
        assert!(model.contains("pub r#type: String,"));
        assert!(model.contains("pub r#match: Option<i64>,"));
        assert!(model.contains("#[sqlx(rename = \"self\")]\n    pub self_: String,"));
        assert!(!model.contains("pub type:"));

        let repo = &files[1].content;
        assert!(repo.contains("INSERT INTO sys_rule (type, match, self)"));
        assert!(repo.contains(".bind(&data.r#type)"));
        assert!(repo.contains(".bind(&data.self_)"));

        assert!(files[2].content.contains("  type: string;"));
    }

    #[test]
    fn test_render_overrides() {
        let columns = vec![column("id", "INTEGER", false, true)];
        let req = GenRequest {
            table: "sys_dict_item".into(),
            struct_name: Some("dict_entry".into()),
            api_prefix: Some("/admin/".into()),
        };
        let files = render(&req, &columns).unwrap();
        assert_eq!(files[0].path, "src/models/dict_entry.rs");
        assert!(files[0].content.contains("pub struct DictEntry {"));
        assert!(files[3].content.contains("'/admin/dict-entry'"));
    }

    #[tokio::test]
    async fn test_preview_reads_live_schema() {
        let db = DbService::in_memory().await.unwrap();
        let files = preview(&db.pool, &request("sys_role")).await.unwrap();
        let model = &files[0].content;
        assert!(model.contains("pub struct SysRole {"));
        assert!(model.contains("pub role_key: String,"));
        assert!(model.contains("pub status: i64,"));

        let err = preview(&db.pool, &request("nope")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }
}
