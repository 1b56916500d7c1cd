//! Spinner shown while a request is in flight

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a ticking spinner with `message`
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner on stderr, or nothing when quiet
pub struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: &str, quiet: bool) -> Self {
        Self {
            pb: (!quiet).then(|| create_spinner(message)),
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(pb) = &self.pb {
            pb.set_message(message.to_string());
        }
    }

    /// Stop and replace the spinner line with `message`
    pub fn finish(self, message: &str) {
        if let Some(pb) = self.pb {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Stop and erase the spinner line
    pub fn clear(self) {
        if let Some(pb) = self.pb {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner_template() {
        let pb = create_spinner("Planning route");
        assert_eq!(pb.message(), "Planning route");
        pb.finish_and_clear();
    }

    #[test]
    fn test_quiet_spinner_is_inert() {
        let spinner = Spinner::start("Planning route", true);
        assert!(spinner.pb.is_none());
        spinner.set_message("still quiet");
        spinner.finish("done");
    }
}
