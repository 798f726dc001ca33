//! # migrender
//!
//! > **Diff once, render three dialects.**
//!
//! migrender drives Liquibase to diff two databases into a changelog, then
//! renders that changelog for MySQL, SQL Server and Oracle in parallel and
//! patches the generated SQL so it matches the column types we deploy with.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use migrender::prelude::*;
//!
//! let settings = Settings::default();
//! let report = Pipeline::new(Liquibase::from_settings(&settings), settings)
//!     .run()
//!     .await;
//! ```
//!
//! ## Post-processing
//!
//! | Dialect   | Rewrites                                             |
//! |-----------|------------------------------------------------------|
//! | mysql     | schema qualifier removed                             |
//! | oracle    | `VARCHAR2(n char)`, `NUMBER`, schema qualifier removed |
//! | sqlserver | `nvarchar`, `ntext`, `datetime2`                     |

pub mod config;
pub mod convert;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod parser;
pub mod pipeline;
pub mod qualifier;
pub mod tool;
pub mod writer;

pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::convert::Converter;
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::extract::{DEFAULT_MARKER, extract_statements};
    pub use crate::pipeline::{
        CleanupOutcome, DialectOutcome, DiffOutcome, Pipeline, RunReport, converter_for,
    };
    pub use crate::qualifier::Qualifiers;
    pub use crate::tool::{Liquibase, MigrationTool};
    pub use crate::writer::write_lines;
}
