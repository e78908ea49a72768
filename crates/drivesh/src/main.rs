use std::path::PathBuf;

use drivesh_lib::cli::create_root_command;
use drivesh_lib::cloud::gdrive::auth::ConsolePrompt;
use drivesh_lib::cloud::gdrive::GDriveSession;
use drivesh_lib::commands::{run_shell, CommandReader};
use drivesh_lib::config::credentials::CredentialsFile;
use drivesh_lib::config::settings::Settings;
use drivesh_lib::errors::{handle_fatal, DriveshError};
use drivesh_lib::http_client::HttpClient;
use drivesh_lib::output;
use drivesh_lib::storage::LocalStorage;
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    // Step 1: Resolve settings from environment, then flags
    let matches = create_root_command().get_matches();
    let settings = Settings::from_env().apply_matches(&matches);

    // Step 2: Initialize logger
    drivesh_lib::logger::set_verbose(settings.verbose);
    if let Err(e) = drivesh_lib::logger::init(&settings.log_file, settings.verbose) {
        handle_fatal(e);
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "drivesh starting");

    let mut reader = CommandReader::new(BufReader::new(tokio::io::stdin()));

    // Step 3: Local storage, prompting for the root when none is configured
    let local_root = match settings.local_root.clone() {
        Some(root) => root,
        None => {
            output::prompt("Local root: ");
            match reader.read_line().await {
                Ok(true) => PathBuf::from(reader.line()),
                Ok(false) => handle_fatal(DriveshError::Config("no local root given".into())),
                Err(e) => handle_fatal(e),
            }
        }
    };
    let mut local = LocalStorage::open(local_root)
        .await
        .unwrap_or_else(|e| handle_fatal(e));

    // Step 4: Google Drive session
    let http = HttpClient::new(&settings.http).unwrap_or_else(|e| handle_fatal(e));
    let mut credentials = CredentialsFile::load(&settings.credentials_path)
        .await
        .unwrap_or_else(|e| handle_fatal(e));
    let mut drive = GDriveSession::connect(
        &mut credentials,
        settings.endpoints.clone(),
        http,
        &ConsolePrompt,
    )
    .await
    .unwrap_or_else(|e| handle_fatal(e));
    output::success("Connected to Google Drive. Type `help` for commands.");

    // Step 5: Command loop until an empty line or EOF
    if let Err(e) = run_shell(&mut reader, &mut local, &mut drive).await {
        handle_fatal(e);
    }
}
