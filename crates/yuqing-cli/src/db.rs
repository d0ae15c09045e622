//! `db` sub-commands: connectivity, migrations, task seeding.

use clap::Subcommand;
use yuqing_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert monitoring tasks from the tasks file
    Seed,
}

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    Ok(yuqing_db::connect_pool_from_config(config).await?)
}

pub(crate) async fn run(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;

    match command {
        DbCommands::Ping => {
            yuqing_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = yuqing_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            let tasks = yuqing_core::load_tasks(&config.tasks_path)?;
            let count = yuqing_db::seed_tasks(&pool, &tasks.tasks).await?;
            println!(
                "seeded {count} task(s) from {}",
                config.tasks_path.display()
            );
        }
    }

    Ok(())
}
