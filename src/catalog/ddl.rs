//! A [`Catalog`] backed by parsed SQL DDL.
//!
//! `CREATE TABLE`, `ALTER TABLE ... ADD CONSTRAINT`, `CREATE UNIQUE INDEX`,
//! and `COMMENT ON` statements are folded into the catalog records. This is
//! the adapter used for pre-captured schemas and by every test; live
//! database drivers implement [`Catalog`] themselves.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use sqlparser::ast::{
    AlterTableOperation, ColumnOption, CommentObject, ObjectName, Statement, TableConstraint,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::catalog::adapter::Catalog;
use crate::catalog::names;
use crate::catalog::types::{Column, ForeignKey, Table, UniqueConstraint};
use crate::error::Error;

/// Method names every generated row class inherits from its base class.
///
/// Matches the accessor surface of the ActiveRecord-style classes the
/// emitter targets.
pub const DEFAULT_RESERVED_METHODS: &[&str] = &[
    "columns",
    "copy",
    "delete",
    "discard_changes",
    "find",
    "get_column",
    "id",
    "in_storage",
    "insert",
    "new",
    "result_source",
    "search",
    "set_column",
    "table",
    "update",
];

/// Catalog built from SQL DDL text.
#[derive(Debug)]
pub struct DdlCatalog {
    tables: Vec<Table>,
    foreign_keys: BTreeMap<String, Vec<ForeignKey>>,
    reserved_methods: BTreeSet<String>,
    dump_dir: Option<PathBuf>,
    db_schema: Option<String>,
}

impl DdlCatalog {
    /// Parse PostgreSQL-flavor DDL into a catalog.
    pub fn parse(sql: &str) -> Result<Self, Error> {
        let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
            .map_err(|e| Error::Ddl(e.to_string()))?;

        let mut builder = CatalogBuilder::default();
        for statement in statements {
            builder.apply(statement);
        }
        let (tables, foreign_keys) = builder.finish();

        Ok(Self {
            tables,
            foreign_keys,
            reserved_methods: DEFAULT_RESERVED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            dump_dir: None,
            db_schema: None,
        })
    }

    /// Replace the inherited-method list consulted by
    /// [`Catalog::is_result_class_method`].
    pub fn with_reserved_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Directory holding previously emitted `<Moniker>.rels` files.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    /// Restrict [`Catalog::list_tables`] to one schema.
    pub fn with_db_schema(mut self, schema: impl Into<String>) -> Self {
        self.db_schema = Some(schema.into());
        self
    }

    fn table_by_raw(&self, raw_name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.raw_name == raw_name)
    }
}

impl Catalog for DdlCatalog {
    fn list_tables(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .tables
            .iter()
            .filter(|t| match (&self.db_schema, &t.schema) {
                (Some(wanted), Some(schema)) => wanted == schema,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .map(|t| t.raw_name.clone())
            .collect())
    }

    fn describe_table(&self, raw_name: &str) -> Result<Table, Error> {
        self.table_by_raw(raw_name)
            .cloned()
            .ok_or_else(|| Error::Catalog(format!("unknown table: {raw_name}")))
    }

    fn foreign_keys(&self, raw_name: &str) -> Result<Vec<ForeignKey>, Error> {
        if self.table_by_raw(raw_name).is_none() {
            return Err(Error::Catalog(format!("unknown table: {raw_name}")));
        }
        Ok(self.foreign_keys.get(raw_name).cloned().unwrap_or_default())
    }

    fn is_result_class_method(&self, name: &str, _moniker: &str) -> bool {
        self.reserved_methods.contains(name)
    }

    fn dump_filename(&self, moniker: &str) -> Option<PathBuf> {
        let path = self.dump_dir.as_ref()?.join(format!("{moniker}.rels"));
        path.is_file().then_some(path)
    }
}

/// Accumulates statements into table records, then resolves column-less
/// `REFERENCES` shorthands against primary keys.
#[derive(Default)]
struct CatalogBuilder {
    tables: Vec<Table>,
    foreign_keys: Vec<(String, ForeignKey)>,
}

impl CatalogBuilder {
    fn apply(&mut self, statement: Statement) {
        match statement {
            Statement::CreateTable(create) => {
                let table = self.new_table(&create.name);
                let raw_name = table.raw_name.clone();
                let local = table.sanitized_name.clone();
                self.tables.push(table);

                for column_def in &create.columns {
                    let name = names::sanitize(
                        &column_def.name.value,
                        column_def.name.quote_style.is_some(),
                    );
                    let mut column = Column {
                        name: name.clone(),
                        nullable: true,
                        type_hint: column_def.data_type.to_string(),
                        default: None,
                        comment: None,
                    };
                    for option in &column_def.options {
                        match &option.option {
                            ColumnOption::NotNull => column.nullable = false,
                            ColumnOption::Null => column.nullable = true,
                            ColumnOption::Default(expr) => {
                                column.default = Some(expr.to_string());
                            }
                            ColumnOption::Comment(text) => {
                                column.comment = Some(text.clone());
                            }
                            ColumnOption::Unique { is_primary, .. } => {
                                let table = self.tables.last_mut().expect("just pushed");
                                if *is_primary {
                                    column.nullable = false;
                                    table.primary_key.push(name.clone());
                                } else {
                                    table.unique_constraints.push(UniqueConstraint {
                                        name: format!("{local}_{name}_key"),
                                        columns: vec![name.clone()],
                                    });
                                }
                            }
                            ColumnOption::ForeignKey {
                                foreign_table,
                                referred_columns,
                                ..
                            } => {
                                let fk = ForeignKey {
                                    local_table: local.clone(),
                                    local_columns: vec![name.clone()],
                                    remote_table: sanitized_relation(foreign_table),
                                    remote_columns: referred_columns
                                        .iter()
                                        .map(|c| c.value.clone())
                                        .collect(),
                                };
                                self.foreign_keys.push((raw_name.clone(), fk));
                            }
                            _ => {}
                        }
                    }
                    self.tables
                        .last_mut()
                        .expect("just pushed")
                        .columns
                        .push(column);
                }

                for constraint in create.constraints {
                    self.apply_constraint(&raw_name, constraint);
                }
            }
            Statement::AlterTable {
                name, operations, ..
            } => {
                let Some(raw_name) = self.raw_name_of(&name) else {
                    tracing::debug!(table = %name, "ALTER TABLE on unknown table ignored");
                    return;
                };
                for operation in operations {
                    if let AlterTableOperation::AddConstraint(constraint) = operation {
                        self.apply_constraint(&raw_name, constraint);
                    }
                }
            }
            Statement::CreateIndex(index) if index.unique => {
                let Some(raw_name) = self.raw_name_of(&index.table_name) else {
                    return;
                };
                let columns: Vec<String> = index
                    .columns
                    .iter()
                    .map(|c| {
                        let printed = c.expr.to_string();
                        names::sanitize(
                            names::unquote_identifier(&printed),
                            printed.contains('"'),
                        )
                    })
                    .collect();
                let table = self.table_mut(&raw_name).expect("resolved above");
                let name = index
                    .name
                    .as_ref()
                    .map(sanitized_relation)
                    .unwrap_or_else(|| {
                        format!("{}_{}_idx", table.sanitized_name, columns.join("_"))
                    });
                table
                    .unique_constraints
                    .push(UniqueConstraint { name, columns });
            }
            Statement::Comment {
                object_type,
                object_name,
                comment,
                ..
            } => self.apply_comment(object_type, &object_name, comment),
            _ => {}
        }
    }

    fn apply_constraint(&mut self, raw_name: &str, constraint: TableConstraint) {
        match constraint {
            TableConstraint::PrimaryKey { columns, .. } => {
                let table = self.table_mut(raw_name).expect("caller resolved");
                table.primary_key = columns.iter().map(|c| c.value.clone()).collect();
                for key_column in &table.primary_key.clone() {
                    if let Some(column) =
                        table.columns.iter_mut().find(|c| &c.name == key_column)
                    {
                        column.nullable = false;
                    }
                }
            }
            TableConstraint::Unique { name, columns, .. } => {
                let table = self.table_mut(raw_name).expect("caller resolved");
                let columns: Vec<String> = columns.iter().map(|c| c.value.clone()).collect();
                let name = name.map(|n| n.value).unwrap_or_else(|| {
                    format!("{}_{}_key", table.sanitized_name, columns.join("_"))
                });
                table
                    .unique_constraints
                    .push(UniqueConstraint { name, columns });
            }
            TableConstraint::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
                ..
            } => {
                let local = self
                    .table_mut(raw_name)
                    .expect("caller resolved")
                    .sanitized_name
                    .clone();
                let fk = ForeignKey {
                    local_table: local,
                    local_columns: columns.iter().map(|c| c.value.clone()).collect(),
                    remote_table: sanitized_relation(&foreign_table),
                    remote_columns: referred_columns
                        .iter()
                        .map(|c| c.value.clone())
                        .collect(),
                };
                self.foreign_keys.push((raw_name.to_string(), fk));
            }
            _ => {}
        }
    }

    fn apply_comment(
        &mut self,
        object_type: CommentObject,
        object_name: &ObjectName,
        comment: Option<String>,
    ) {
        match object_type {
            CommentObject::Table => {
                if let Some(raw_name) = self.raw_name_of(object_name) {
                    if let Some(table) = self.table_mut(&raw_name) {
                        table.comment = comment;
                    }
                }
            }
            CommentObject::Column => {
                // Printed form is `[schema.]table.column`.
                let printed = object_name.to_string();
                let (qualifier, column_part) = names::split_qualified(&printed);
                let Some(table_name) = qualifier else {
                    return;
                };
                let (_, relation) = names::split_qualified(&table_name);
                let sanitized = names::sanitize(
                    names::unquote_identifier(&relation),
                    relation.contains('"'),
                );
                let column_name = names::unquote_identifier(&column_part).to_string();
                if let Some(table) =
                    self.tables.iter_mut().find(|t| t.sanitized_name == sanitized)
                {
                    if let Some(column) =
                        table.columns.iter_mut().find(|c| c.name == column_name)
                    {
                        column.comment = comment;
                    }
                }
            }
            _ => {}
        }
    }

    fn new_table(&self, name: &ObjectName) -> Table {
        let printed = name.to_string();
        let (schema, relation) = names::split_qualified(&printed);
        let quoted = relation.contains('"');
        let mut table = Table::new(printed, false);
        table.sanitized_name =
            names::sanitize(names::unquote_identifier(&relation), quoted);
        table.schema = schema
            .as_deref()
            .map(names::unquote_identifier)
            .map(str::to_string);
        table
    }

    /// Resolve a statement's table reference to the stored raw name.
    fn raw_name_of(&self, name: &ObjectName) -> Option<String> {
        let printed = name.to_string();
        if let Some(table) = self.tables.iter().find(|t| t.raw_name == printed) {
            return Some(table.raw_name.clone());
        }
        let (_, relation) = names::split_qualified(&printed);
        let sanitized =
            names::sanitize(names::unquote_identifier(&relation), relation.contains('"'));
        self.tables
            .iter()
            .find(|t| t.sanitized_name == sanitized)
            .map(|t| t.raw_name.clone())
    }

    fn table_mut(&mut self, raw_name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.raw_name == raw_name)
    }

    /// Fill `REFERENCES t` shorthands (no column list) with the remote
    /// primary key, dropping edges that cannot be resolved.
    fn finish(self) -> (Vec<Table>, BTreeMap<String, Vec<ForeignKey>>) {
        let tables = self.tables;
        let mut by_table: BTreeMap<String, Vec<ForeignKey>> = BTreeMap::new();

        for (raw_name, mut fk) in self.foreign_keys {
            if fk.remote_columns.is_empty() {
                let remote_pk = tables
                    .iter()
                    .find(|t| t.sanitized_name == fk.remote_table)
                    .map(|t| t.primary_key.clone())
                    .unwrap_or_default();
                if remote_pk.is_empty() {
                    tracing::debug!(
                        table = raw_name.as_str(),
                        remote = fk.remote_table.as_str(),
                        "dropping column-less foreign key with no resolvable primary key"
                    );
                    continue;
                }
                fk.remote_columns = remote_pk;
            }
            by_table.entry(raw_name).or_default().push(fk);
        }
        (tables, by_table)
    }
}

fn sanitized_relation(name: &ObjectName) -> String {
    let printed = name.to_string();
    let (_, relation) = names::split_qualified(&printed);
    names::sanitize(names::unquote_identifier(&relation), relation.contains('"'))
}
