//! Progress reporting for the per-year processing loop.
//!
//! Purely cosmetic: a fixed-width bar redrawn on one line while the files
//! of a year are processed. Nothing reads it back.

use indicatif::{ProgressBar, ProgressStyle};

/// The style of the per-year bar: 50 characters wide, block/dash fill,
/// percentage and file counts after it.
fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("Processing {prefix}: [{bar:50}] {percent}% ({pos}/{len})")
        .expect("invalid template")
        .progress_chars("█-")
}

/// Creates the progress bar for one year's file loop.
pub fn year_bar(total: u64, year: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(bar_style());
    bar.set_prefix(year.to_string());
    bar
}
