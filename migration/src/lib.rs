pub use sea_orm_migration::prelude::*;

mod m20250601_000001_baseline_schema;
mod m20250612_000002_add_admin_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_baseline_schema::Migration),
            Box::new(m20250612_000002_add_admin_settings::Migration),
        ]
    }
}
