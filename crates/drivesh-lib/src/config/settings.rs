use std::path::PathBuf;

use clap::ArgMatches;

use super::endpoints::DriveEndpoints;
use super::http::HttpSettings;

pub const DEFAULT_CREDENTIALS_FILE: &str = "./client_secret.json";
pub const DEFAULT_LOG_FILE: &str = "./log.txt";

/// Process settings, resolved once at startup.
///
/// Precedence: command-line flag, then environment variable, then default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials_path: PathBuf,
    pub log_file: PathBuf,
    /// Starting directory of the local backend. Prompted for when unset.
    pub local_root: Option<PathBuf>,
    pub verbose: bool,
    pub http: HttpSettings,
    pub endpoints: DriveEndpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            local_root: None,
            verbose: false,
            http: HttpSettings::default(),
            endpoints: DriveEndpoints::default(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `DRIVESH_CREDENTIALS`, `DRIVESH_LOG_FILE` and
    /// `DRIVESH_LOCAL_ROOT`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(path) = std::env::var("DRIVESH_CREDENTIALS") {
            settings.credentials_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("DRIVESH_LOG_FILE") {
            settings.log_file = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("DRIVESH_LOCAL_ROOT") {
            settings.local_root = Some(PathBuf::from(path));
        }
        settings
    }

    /// Apply flags parsed by [`crate::cli::create_root_command`].
    pub fn apply_matches(mut self, matches: &ArgMatches) -> Self {
        if let Some(path) = matches.get_one::<PathBuf>("credentials") {
            self.credentials_path = path.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("log-file") {
            self.log_file = path.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("local-root") {
            self.local_root = Some(path.clone());
        }
        self.verbose = crate::cli::is_verbose(matches);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::create_root_command;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.credentials_path, PathBuf::from("./client_secret.json"));
        assert_eq!(settings.log_file, PathBuf::from("./log.txt"));
        assert!(settings.local_root.is_none());
        assert!(!settings.verbose);
        assert_eq!(settings.endpoints, DriveEndpoints::default());
    }

    #[test]
    fn test_apply_matches_overrides() {
        let matches = create_root_command()
            .try_get_matches_from([
                "drivesh",
                "--credentials",
                "/etc/drivesh/secret.json",
                "--local-root",
                "/srv/saves",
                "--log-file",
                "/tmp/drivesh.log",
                "-v",
            ])
            .unwrap();
        let settings = Settings::default().apply_matches(&matches);
        assert_eq!(
            settings.credentials_path,
            PathBuf::from("/etc/drivesh/secret.json")
        );
        assert_eq!(settings.local_root, Some(PathBuf::from("/srv/saves")));
        assert_eq!(settings.log_file, PathBuf::from("/tmp/drivesh.log"));
        assert!(settings.verbose);
    }

    #[test]
    fn test_apply_matches_keeps_defaults_when_absent() {
        let matches = create_root_command()
            .try_get_matches_from(["drivesh"])
            .unwrap();
        let settings = Settings::default().apply_matches(&matches);
        assert_eq!(settings.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_FILE));
        assert!(settings.local_root.is_none());
    }
}
