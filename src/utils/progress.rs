use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress bar for the frames of one worker
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        Self::style(&bar, description);
        ProgressTracker { bar }
    }

    /// Creates a bar drawn as one line of a multi-bar display
    pub fn in_group(group: &MultiProgress, total: u64, description: &str) -> Self {
        let bar = group.add(ProgressBar::new(total));
        Self::style(&bar, description);
        ProgressTracker { bar }
    }

    /// A tracker that draws nothing
    pub fn hidden() -> Self {
        ProgressTracker { bar: ProgressBar::hidden() }
    }

    fn style(bar: &ProgressBar, description: &str) {
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(description.to_string());
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }
}
