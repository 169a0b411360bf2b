/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Table-level operations live in the `models` module; the transactional
/// recipe writes live in `store::postgres`.

pub mod migrations;
pub mod pool;
