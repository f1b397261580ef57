//! KQL - query assembly, schema resolution, and the remote backend

mod backend;
mod builder;
mod dry_run;
mod kusto;
mod schema;

pub use backend::{ColumnMap, QueryBackend};
pub use builder::{DEFAULT_PARAMETER, QueryBuilder, placeholders, render};
pub use dry_run::DryRunBackend;
pub use kusto::{KustoBackend, primary_rows, schema_from_rows};
pub use schema::{SchemaDescription, SchemaResolver, table_name};
