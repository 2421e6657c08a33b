//! Attribute edits issued through `ogrinfo -sql`.
//!
//! The rewrite stage needs exactly three statements, so they are modelled as a
//! typed query rather than free-form SQL. Identifiers are always double-quoted.

use std::fmt;
use std::path::Path;

use crate::domain::FieldType;
use crate::gdal::Invocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeEdit {
    /// `ALTER TABLE <layer> ADD COLUMN <field> <type>`
    AddColumn { field: String, field_type: FieldType },
    /// `UPDATE <layer> SET <target> = <source>[*1.0/<divisor>]`
    Rescale {
        target: String,
        source: String,
        divisor: Option<u64>,
    },
    /// `ALTER TABLE <layer> DROP COLUMN <field>`
    DropColumn { field: String },
}

impl AttributeEdit {
    pub fn statement(&self, layer: &str) -> String {
        let layer = quote_ident(layer);
        match self {
            AttributeEdit::AddColumn { field, field_type } => format!(
                "ALTER TABLE {layer} ADD COLUMN {} {}",
                quote_ident(field),
                field_type.sql_keyword()
            ),
            AttributeEdit::Rescale {
                target,
                source,
                divisor,
            } => {
                let value = match divisor {
                    Some(d) => format!("{}*1.0/{d}", quote_ident(source)),
                    None => quote_ident(source),
                };
                format!("UPDATE {layer} SET {}={value}", quote_ident(target))
            }
            AttributeEdit::DropColumn { field } => {
                format!("ALTER TABLE {layer} DROP COLUMN {}", quote_ident(field))
            }
        }
    }

    /// `UPDATE` needs the SQLite dialect; the DDL runs in OGR SQL.
    fn dialect(&self) -> Option<&'static str> {
        match self {
            AttributeEdit::Rescale { .. } => Some("SQLite"),
            AttributeEdit::AddColumn { .. } | AttributeEdit::DropColumn { .. } => None,
        }
    }

    pub fn invocation(&self, program: &str, datasource: &Path, layer: &str) -> Invocation {
        let inv = Invocation::new(program)
            .arg(datasource.to_string_lossy())
            .arg("-sql")
            .arg(self.statement(layer));
        match self.dialect() {
            Some(dialect) => inv.arg("-dialect").arg(dialect),
            None => inv,
        }
    }
}

impl fmt::Display for AttributeEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeEdit::AddColumn { field, .. } => write!(f, "add column {field}"),
            AttributeEdit::Rescale { target, .. } => write!(f, "populate {target}"),
            AttributeEdit::DropColumn { field } => write!(f, "drop column {field}"),
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
