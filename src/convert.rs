//! Per-dialect rewriting of generated SQL lines.
//!
//! Liquibase's `updateSql` output doesn't always match the column types we
//! deploy with, so each statement line is patched before it is written.
//!
//! | Dialect   | Rewrites                                                      |
//! |-----------|---------------------------------------------------------------|
//! | mysql     | schema qualifier removed                                      |
//! | oracle    | `VARCHAR2(n)` → `VARCHAR2(n char)`, `DECIMAL` → `NUMBER`, qualifier removed |
//! | sqlserver | `varchar(max)` → `ntext`, `varchar` → `nvarchar`, `datetime` → `datetime2` |

use crate::dialect::Dialect;
use crate::parser::rewrite_varchar2;
use crate::qualifier::Qualifiers;

/// `varchar(max)` spellings emitted by Liquibase for SQL Server.
const SQLSERVER_MAX_FORMS: &[&str] = &[
    "varchar (max)",
    "varchar(max)",
    "varchar (MAX)",
    "varchar(MAX)",
];

/// Rewrites statement lines for one dialect.
#[derive(Debug, Clone)]
pub struct Converter {
    dialect: Dialect,
    qualifiers: Qualifiers,
}

impl Converter {
    pub fn new(dialect: Dialect, qualifiers: Qualifiers) -> Self {
        Self { dialect, qualifiers }
    }

    /// A converter that strips nothing.
    pub fn without_qualifiers(dialect: Dialect) -> Self {
        Self::new(dialect, Qualifiers::default())
    }

    /// Convert one line. Never fails; unmatched text passes through.
    pub fn convert(&self, line: &str) -> String {
        match self.dialect {
            Dialect::Mysql => self.qualifiers.strip(line),
            Dialect::Oracle => self.qualifiers.strip(&convert_oracle(line)),
            Dialect::SqlServer => convert_sqlserver(line),
        }
    }
}

/// Oracle type fixes: character-length semantics and `NUMBER`.
pub fn convert_oracle(sql: &str) -> String {
    rewrite_varchar2(sql).replace("DECIMAL", "NUMBER")
}

/// SQL Server type fixes: unicode strings and `datetime2`.
///
/// The `(max)` forms are matched on the input before the blanket
/// `varchar` rewrite, with or without a leading `n`.
pub fn convert_sqlserver(sql: &str) -> String {
    let mut sql = sql.to_string();

    for form in SQLSERVER_MAX_FORMS {
        sql = sql.replace(&format!("n{}", form), "ntext");
        sql = sql.replace(form, "ntext");
    }

    sql = sql.replace("varchar", "nvarchar").replace("nnvarchar", "nvarchar");
    sql = sql.replace("nntext", "ntext");

    replace_word(&sql, "datetime", "datetime2")
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace `word` only where it isn't part of a longer identifier, so
/// `datetime2`, `smalldatetime` and `datetimeoffset` are left alone.
fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;

    for (start, _) in haystack.match_indices(word) {
        let end = start + word.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        let bounded = !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char);
        if bounded {
            out.push_str(&haystack[last..start]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&haystack[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sqlserver() -> Converter {
        Converter::without_qualifiers(Dialect::SqlServer)
    }

    #[test]
    fn test_mysql_identity_without_qualifier() {
        let c = Converter::new(Dialect::Mysql, Qualifiers::from_names(["inventory"]));
        let sql = "CREATE TABLE orders (id INT NOT NULL, note VARCHAR(255) NULL, price DECIMAL(10, 2));";
        assert_eq!(c.convert(sql), sql);
    }

    #[test]
    fn test_mysql_strips_qualifier() {
        let c = Converter::new(Dialect::Mysql, Qualifiers::from_names(["inventory"]));
        assert_eq!(
            c.convert("CREATE TABLE inventory.orders (id INT NOT NULL);"),
            "CREATE TABLE orders (id INT NOT NULL);"
        );
    }

    #[test]
    fn test_oracle_varchar2_char_semantics() {
        let c = Converter::without_qualifiers(Dialect::Oracle);
        let out = c.convert("CREATE TABLE ORDERS (NAME VARCHAR2(50) NOT NULL, CODE VARCHAR2(8));");
        assert_eq!(
            out,
            "CREATE TABLE ORDERS (NAME VARCHAR2(50 char) NOT NULL, CODE VARCHAR2(8 char));"
        );
    }

    #[test]
    fn test_oracle_decimal_to_number() {
        let c = Converter::new(Dialect::Oracle, Qualifiers::from_names(["HR"]));
        let out = c.convert("ALTER TABLE HR.ORDERS ADD PRICE DECIMAL(10, 2);");
        assert_eq!(out, "ALTER TABLE ORDERS ADD PRICE NUMBER(10, 2);");
        assert!(!out.contains("DECIMAL"));
    }

    #[test]
    fn test_sqlserver_max_forms_become_ntext() {
        for input in [
            "ALTER TABLE orders ADD note varchar(max)",
            "ALTER TABLE orders ADD note varchar (max)",
            "ALTER TABLE orders ADD note varchar(MAX)",
            "ALTER TABLE orders ADD note nvarchar(max)",
        ] {
            let out = sqlserver().convert(input);
            assert_eq!(out, "ALTER TABLE orders ADD note ntext", "input: {}", input);
            assert!(!out.contains("nvarchar"));
        }
    }

    #[test]
    fn test_sqlserver_types() {
        let out =
            sqlserver().convert("CREATE TABLE orders (name varchar(50), created datetime NOT NULL)");
        assert_eq!(out, "CREATE TABLE orders (name nvarchar(50), created datetime2 NOT NULL)");
    }

    #[test]
    fn test_sqlserver_keeps_existing_nvarchar() {
        assert_eq!(sqlserver().convert("name nvarchar(20)"), "name nvarchar(20)");
    }

    #[test]
    fn test_sqlserver_leaves_related_types() {
        let sql = "a smalldatetime, b datetimeoffset, c datetime2";
        assert_eq!(sqlserver().convert(sql), sql);
    }

    #[test]
    fn test_sqlserver_keeps_qualifier() {
        let c = Converter::new(Dialect::SqlServer, Qualifiers::from_names(["dbo"]));
        assert_eq!(
            c.convert("CREATE TABLE dbo.orders (id int)"),
            "CREATE TABLE dbo.orders (id int)"
        );
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let line = "CREATE TABLE orders (a varchar(10), b varchar (max), c datetime, d VARCHAR2(5), e DECIMAL)";
        for dialect in Dialect::ALL {
            let c = Converter::without_qualifiers(dialect);
            let once = c.convert(line);
            let twice = c.convert(&once);
            assert_eq!(once, twice, "dialect: {}", dialect);
            for artifact in ["nnvarchar", "nntext", "datetime22", "char char"] {
                assert!(!twice.contains(artifact), "{} in {}", artifact, twice);
            }
        }
    }
}
