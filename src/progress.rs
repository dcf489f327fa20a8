// Progress bar management using indicatif.
// We keep all bars under one MultiProgress so they render on separate lines.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgressManager {
    multi: Option<Arc<MultiProgress>>,
}

impl ProgressManager {
    // Create a new manager. If enabled=false, no bars are created.
    pub fn new(enabled: bool) -> Self {
        let multi = if enabled {
            Some(Arc::new(MultiProgress::new()))
        } else {
            None
        };
        Self { multi }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    // Create a bar counting converted input files.
    pub fn new_file_bar(&self, total: u64) -> Option<ProgressBar> {
        let mp = self.multi.as_ref()?;
        let bar = mp.add(ProgressBar::new(total));
        bar.set_style(file_style());
        bar.set_prefix("Converting files".to_string());
        Some(bar)
    }
}

fn file_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:20} {pos:>5}/{len:<5} [{bar:50}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█ ")
}
