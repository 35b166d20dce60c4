pub mod builder;
pub mod params;

pub use builder::{delete, insert, select_by_id, select_where, update, QueryBuf};
pub use params::{bind_all, PgBindValue};
