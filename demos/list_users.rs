//! Lists every user, then lists them again to show the cache at work.
//!
//! Configuration comes from `reqres.toml` and `REQRES_*` variables:
//!
//! Run with: `REQRES_API_KEY=reqres-free-v1 cargo run --example list_users`

use reqres_client::{Config, Error, UserService};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("reqres_client=debug,list_users=info")
        .init();

    let config = Config::load()?;
    let service = config.build_service()?;

    println!("Fetching all users from {}...", config.base_url);
    let start = Instant::now();
    let users = service.get_all_users().await?;

    for user in &users {
        println!(
            "ID: {}, Name: {} {}, Email: {}",
            user.id, user.first_name, user.last_name, user.email
        );
    }
    println!("{} users in {:?}", users.len(), start.elapsed());

    let start = Instant::now();
    let again = service.get_all_users().await?;
    println!(
        "Second listing: {} users in {:?} (cached for {:?})",
        again.len(),
        start.elapsed(),
        service.ttl()
    );

    match service.get_user_by_id(23).await {
        Ok(user) => println!("User 23: {} {}", user.first_name, user.last_name),
        Err(Error::NotFound { id }) => println!("User {} does not exist", id),
        Err(e) => return Err(e),
    }

    println!("Done.");
    Ok(())
}
