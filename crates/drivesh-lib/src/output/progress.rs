use indicatif::{ProgressBar, ProgressStyle};

const TRANSFER_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Create a progress bar for an upload or download of `total` bytes.
///
/// The bar draws to stderr and stays hidden when stderr is not a terminal.
pub fn create_transfer_progress(total: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(TRANSFER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.set_message(name.to_string());
    pb
}
