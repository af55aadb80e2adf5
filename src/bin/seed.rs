//! Standalone database seeder: `seed [users] [pets]` (defaults 20/20).
//! Reuses the mock generator without going through the HTTP service.

use std::collections::HashSet;

use adoptme::mocks::generator;
use adoptme::pets::repo::Pet;
use adoptme::users::repo::User;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "adoptme=info,seed=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let users: usize = match args.next() {
        Some(v) => v.parse()?,
        None => 20,
    };
    let pets: usize = match args.next() {
        Some(v) => v.parse()?,
        None => 20,
    };

    let database_url = std::env::var("DATABASE_URL")?;
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    // Seeding is re-runnable; emails already present are skipped.
    let batch = generator::generate_users(users)?;
    let emails: Vec<String> = batch.iter().map(|u| u.email.clone()).collect();
    let existing: HashSet<String> = User::existing_emails(&db, &emails)
        .await?
        .into_iter()
        .collect();

    let mut created_users = 0;
    for new_user in generator::skip_existing(batch, &existing) {
        User::create(&db, &new_user).await?;
        created_users += 1;
    }

    for new_pet in generator::generate_pets(pets) {
        Pet::create(&db, &new_pet).await?;
    }

    tracing::info!(users = created_users, pets, "database seeded");
    Ok(())
}
