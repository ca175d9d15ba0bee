use dash_auth::{AuthService, AuthSettings, NewUser};
use dash_common::Config;
use serde_json::{Value, json};
use std::env;
use std::path::Path;

fn usage() -> ! {
    eprintln!("Usage: dash-cli <command> [options]");
    eprintln!("Commands:");
    eprintln!("  list-users");
    eprintln!("  create-user --email <email> --name <name> --password <password> [--image <url>]");
    eprintln!("  disable-user --email <email>");
    eprintln!("  enable-user --email <email>");
    eprintln!("  purge-sessions");
    std::process::exit(1);
}

fn print(value: Value) {
    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
}

fn fail(message: impl std::fmt::Display) -> ! {
    let result = json!({ "success": false, "error": message.to_string() });
    eprintln!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    std::process::exit(1);
}

/// Value following `--name` in `args`.
fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn required(args: &[String], name: &str) -> String {
    flag(args, name).unwrap_or_else(|| fail(format!("missing {name}")))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let command = args[1].as_str();
    let rest = &args[2..];

    let config = Config::load().unwrap_or_else(|e| fail(e));
    let settings = AuthSettings::new(
        config.auth.session_cookie.clone(),
        config.auth.session_ttl_hours,
        config.auth.remember_days,
    )
    .unwrap_or_else(|e| fail(e));
    let auth = AuthService::open(Path::new(&config.auth.database_path), settings)
        .unwrap_or_else(|e| fail(e));

    match command {
        "list-users" => match auth.users.list() {
            Ok(users) => print(json!({ "success": true, "users": users })),
            Err(e) => fail(e),
        },

        "create-user" => {
            let new = NewUser {
                email: required(rest, "--email"),
                name: required(rest, "--name"),
                password: required(rest, "--password"),
                image: flag(rest, "--image"),
            };
            match auth.users.create(new) {
                Ok(user) => print(json!({ "success": true, "user": user })),
                Err(e) => fail(e),
            }
        }

        "disable-user" | "enable-user" => {
            let email = required(rest, "--email");
            let disable = command == "disable-user";
            match auth.users.set_disabled(&email, disable) {
                Ok(true) => {}
                Ok(false) => fail(format!("no user with email {email}")),
                Err(e) => fail(e),
            }
            let mut revoked = 0;
            if disable {
                let user = auth.users.get_by_email(&email).unwrap_or_else(|e| fail(e));
                if let Some(user) = user {
                    revoked = auth
                        .sessions
                        .delete_for_user(&user.id)
                        .unwrap_or_else(|e| fail(e));
                }
            }
            print(json!({ "success": true, "email": email, "disabled": disable, "revokedSessions": revoked }));
        }

        "purge-sessions" => match auth.sessions.purge_expired() {
            Ok(removed) => print(json!({ "success": true, "removed": removed })),
            Err(e) => fail(e),
        },

        _ => usage(),
    }
}
