use std::path::PathBuf;

/// Creates the root clap Command for the `drivesh` binary.
///
/// Every flag is optional; see [`crate::config::settings::Settings`] for the
/// environment fallbacks.
pub fn create_root_command() -> clap::Command {
    clap::Command::new("drivesh")
        .about("Navigate and transfer files across a local directory and Google Drive")
        .arg(
            clap::Arg::new("credentials")
                .short('c')
                .long("credentials")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to the OAuth client_secret.json"),
        )
        .arg(
            clap::Arg::new("local-root")
                .short('r')
                .long("local-root")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Starting directory of the local storage"),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Log file, truncated at startup"),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Log at debug level"),
        )
}

/// Returns whether verbose mode is active based on parsed matches.
pub fn is_verbose(matches: &clap::ArgMatches) -> bool {
    matches.get_flag("verbose")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_command_has_verbose_flag() {
        let cmd = create_root_command();
        let matches = cmd.try_get_matches_from(["drivesh", "--verbose"]).unwrap();
        assert!(is_verbose(&matches));
    }

    #[test]
    fn test_short_verbose_flag() {
        let cmd = create_root_command();
        let matches = cmd.try_get_matches_from(["drivesh", "-v"]).unwrap();
        assert!(is_verbose(&matches));
    }

    #[test]
    fn test_no_flags_not_verbose() {
        let cmd = create_root_command();
        let matches = cmd.try_get_matches_from(["drivesh"]).unwrap();
        assert!(!is_verbose(&matches));
        assert!(matches.get_one::<PathBuf>("credentials").is_none());
    }

    #[test]
    fn test_credentials_path_parsed() {
        let cmd = create_root_command();
        let matches = cmd
            .try_get_matches_from(["drivesh", "-c", "secret.json"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("credentials"),
            Some(&PathBuf::from("secret.json"))
        );
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let cmd = create_root_command();
        assert!(cmd.try_get_matches_from(["drivesh", "--json"]).is_err());
    }
}
