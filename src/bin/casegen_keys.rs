//! CLI tool to manage API keys directly in the database.
//!
//! Usage:
//!   cargo run --bin casegen-keys -- create --name "QA laptop" --expires-in 365d
//!   cargo run --bin casegen-keys -- list
//!   cargo run --bin casegen-keys -- revoke --id <key-id>

use std::env;

use uuid::Uuid;

use casegen_lib::config::Config;
use casegen_lib::db::DbPool;
use casegen_lib::models::ApiKeyListItem;
use casegen_lib::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    match command {
        "create" => {
            let Some(name) = flag_value(&args, &["--name", "-n"]) else {
                eprintln!("Error: --name is required");
                print_usage();
                std::process::exit(1);
            };
            let expires_in = flag_value(&args, &["--expires-in", "-e"]);
            create_key(&pool, name, expires_in).await;
        }
        "list" | "ls" => list_keys(&pool).await,
        "revoke" => {
            let Some(raw_id) = flag_value(&args, &["--id", "-i"]) else {
                eprintln!("Error: --id is required");
                std::process::exit(1);
            };
            let id = match Uuid::parse_str(raw_id) {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("Error: invalid key id '{}': {}", raw_id, e);
                    std::process::exit(1);
                }
            };
            revoke_key(&pool, id).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Value following the first occurrence of any of `names`.
fn flag_value<'a>(args: &'a [String], names: &[&str]) -> Option<&'a str> {
    args.iter()
        .skip(2)
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 3))
        .map(String::as_str)
}

async fn create_key(pool: &DbPool, name: &str, expires_in: Option<&str>) {
    let (full_key, key) = match api_key::create_key(pool, name, expires_in).await {
        Ok(created) => created,
        Err(e) => {
            eprintln!("Error creating key: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("API key created. Store it now; it cannot be shown again.");
    println!();
    println!("  ID:      {}", key.id);
    println!("  Name:    {}", key.name);
    match key.expires_at {
        Some(at) => println!("  Expires: {}", at.to_rfc3339()),
        None => println!("  Expires: never"),
    }
    println!();
    println!("  {}", full_key);
    println!();
}

async fn list_keys(pool: &DbPool) {
    let keys = match pool.list_api_keys().await {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error listing keys: {}", e);
            std::process::exit(1);
        }
    };

    if keys.is_empty() {
        println!("No API keys found.");
        return;
    }

    println!();
    println!(
        "{:<36} {:<10} {:<24} {:<10}",
        "ID", "PREFIX", "NAME", "STATUS"
    );
    println!("{}", "-".repeat(82));

    for key in keys {
        let item = ApiKeyListItem::from(key);
        let status = if item.is_revoked { "revoked" } else { "active" };

        let name = if item.name.chars().count() > 22 {
            format!("{}...", item.name.chars().take(19).collect::<String>())
        } else {
            item.name.clone()
        };

        println!(
            "{:<36} {:<10} {:<24} {:<10}",
            item.id, item.key_prefix, name, status
        );
    }
    println!();
}

async fn revoke_key(pool: &DbPool, id: Uuid) {
    match pool.revoke_api_key(id).await {
        Ok(true) => println!("API key {} revoked successfully.", id),
        Ok(false) => {
            eprintln!("API key {} not found or already revoked.", id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error revoking key: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: casegen-keys <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  create --name <name> [--expires-in <365d|6m|1y>]   Create an API key");
    eprintln!("  list, ls                                           List all API keys");
    eprintln!("  revoke --id <id>                                   Revoke an API key");
    eprintln!("  help                                               Show this help");
    eprintln!();
}
