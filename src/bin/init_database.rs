use std::env;
use std::process::ExitCode;

use dotenvy::dotenv;
use event_feedback::config::DEFAULT_DATABASE_URL;
use event_feedback::Storage;

fn main() -> ExitCode {
    dotenv().ok();
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    match Storage::new(database_url.as_str()).ensure_schema() {
        Ok(()) => {
            println!("Feedback table is ready in {database_url}.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to initialize {database_url}: {e}");
            ExitCode::FAILURE
        }
    }
}
