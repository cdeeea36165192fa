mod pool;

pub use pool::create_pool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
