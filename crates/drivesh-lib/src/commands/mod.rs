//! Interactive shell: `<local|drive> <command> [args...]` per line.

pub mod parser;
pub mod reader;

use tokio::io::AsyncBufRead;

pub use parser::{DeleteKind, ShellCommand, Target};
pub use reader::CommandReader;

use crate::errors::{handle_command_error, Result};
use crate::output;
use crate::storage::{Item, Storage};

const HELP: &str = "\
Usage: <local|drive> <command> [arguments]

Commands:
  list                               List the current directory
  chdir <name|..>                    Enter a directory, or go up with ..
  mkdir <name>                       Create a directory
  delete <dir|folder|directory|file> <name>
                                     Delete a directory or a file
  upload <path>                      Upload a local file (drive only)
  download <name> <path>             Download a file to <path> (drive only)
  root                               Return to the root directory
  reload                             Re-read the directory listing
  help                               Show this help

An empty line ends the session.";

pub fn print_help() {
    println!("{HELP}");
}

/// Render items in the listing format.
pub fn format_listing(items: &[&Item]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_listing(items: &[&Item]) {
    if items.is_empty() {
        output::info("(empty)");
    } else {
        println!("{}", format_listing(items));
    }
}

/// Run one parsed command against `storage`.
pub async fn execute_command(storage: &mut dyn Storage, command: ShellCommand) -> Result<()> {
    tracing::debug!(storage = storage.label(), command = ?command, "execute");
    match command {
        ShellCommand::List => {
            print_listing(&storage.list_contents());
        }
        ShellCommand::ChangeDirectory(name) => {
            storage.change_directory(&name).await?;
        }
        ShellCommand::MakeDirectory(name) => {
            storage.create_directory(&name).await?;
            output::success(&format!("Created directory {name}"));
        }
        ShellCommand::Delete { kind, name } => {
            match kind {
                DeleteKind::Directory => storage.delete_directory(&name).await?,
                DeleteKind::File => storage.delete_file(&name).await?,
            }
            output::success(&format!("Deleted {name}"));
        }
        ShellCommand::Upload(path) => {
            storage.upload_file(&path).await?;
            output::success(&format!("Uploaded {}", path.display()));
        }
        ShellCommand::Download { name, path } => {
            storage.download_file(&name, &path).await?;
            output::success(&format!("Downloaded {name} to {}", path.display()));
        }
        ShellCommand::Root => {
            storage.return_to_root().await?;
        }
        ShellCommand::Reload => {
            storage.reload().await?;
            output::success(&format!(
                "Reloaded {} storage ({} entries)",
                storage.label(),
                storage.state().tree().len()
            ));
        }
        ShellCommand::Help => print_help(),
    }
    Ok(())
}

/// Parse and run one line's words. Failures are printed, never fatal.
pub async fn dispatch_line<'a>(
    words: Vec<String>,
    local: &'a mut dyn Storage,
    drive: &'a mut dyn Storage,
) -> Result<()> {
    let mut words = words.into_iter();
    let Some(selector) = words.next() else {
        return Ok(());
    };
    if selector == "help" {
        print_help();
        return Ok(());
    }

    let storage: &mut dyn Storage = match selector.parse::<Target>()? {
        Target::Local => local,
        Target::Drive => drive,
    };
    let command = ShellCommand::parse(words)?;
    execute_command(storage, command).await
}

/// Read and run commands until an empty line or end of input.
pub async fn run_shell<R>(
    reader: &mut CommandReader<R>,
    local: &mut dyn Storage,
    drive: &mut dyn Storage,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    loop {
        output::prompt("> ");
        if !reader.read_line().await? {
            break;
        }
        tracing::info!(line = reader.line(), "command");
        let words = reader.parameters();
        if let Err(err) = dispatch_line(words, &mut *local, &mut *drive).await {
            handle_command_error(&err);
        }
    }
    tracing::info!("shell finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DriveshError;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    async fn two_roots() -> (TempDir, TempDir, LocalStorage, LocalStorage) {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        std::fs::create_dir(a.path().join("Saves")).unwrap();
        let local = LocalStorage::open(a.path()).await.unwrap();
        let other = LocalStorage::open(b.path()).await.unwrap();
        (a, b, local, other)
    }

    #[test]
    fn test_format_listing() {
        let dir = Item::new("Saves", "D1", "R", true);
        let file = Item::new("a.txt", "F1", "R", false);
        assert_eq!(
            format_listing(&[&dir, &file]),
            "Saves:\n\tID: D1\n\tParent: R\n\tDirectory: true\n\
             a.txt:\n\tID: F1\n\tParent: R\n\tDirectory: false"
        );
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_selector() {
        let (a, b, mut local, mut other) = two_roots().await;

        dispatch_line(words("drive mkdir Backups"), &mut local, &mut other)
            .await
            .unwrap();
        assert!(b.path().join("Backups").is_dir());
        assert!(!a.path().join("Backups").exists());

        dispatch_line(words("local chdir Saves"), &mut local, &mut other)
            .await
            .unwrap();
        assert_eq!(local.current_dir(), a.path().join("Saves"));
    }

    #[tokio::test]
    async fn test_unknown_selector_is_command_error() {
        let (_a, _b, mut local, mut other) = two_roots().await;
        let err = dispatch_line(words("cloud list"), &mut local, &mut other)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveshError::Command(_)));
    }

    #[tokio::test]
    async fn test_upload_on_local_is_unsupported() {
        let (_a, _b, mut local, mut other) = two_roots().await;
        let err = dispatch_line(words("local upload x.bin"), &mut local, &mut other)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveshError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_run_shell_survives_errors_and_stops_on_empty_line() {
        let (a, _b, mut local, mut other) = two_roots().await;
        let script = "bogus\nlocal chdir Missing\nlocal mkdir Made\n\nlocal mkdir Never\n";
        let mut reader = CommandReader::new(script.as_bytes());

        run_shell(&mut reader, &mut local, &mut other).await.unwrap();
        assert!(a.path().join("Made").is_dir());
        assert!(!a.path().join("Never").exists());
    }

    #[tokio::test]
    async fn test_reload_then_delete() {
        let (a, _b, mut local, mut other) = two_roots().await;
        std::fs::write(a.path().join("late.txt"), b"x").unwrap();

        let err = dispatch_line(words("local delete file late.txt"), &mut local, &mut other)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveshError::NotFound(_)));

        dispatch_line(words("local reload"), &mut local, &mut other)
            .await
            .unwrap();
        dispatch_line(words("local delete file late.txt"), &mut local, &mut other)
            .await
            .unwrap();
        assert!(!a.path().join("late.txt").exists());
    }
}
