//! Per-group render logging.
//!
//! Every line carries the group title as a `group` field; batch lines add
//! `chunk`, `chunks` and `pairs` so a render can be followed per batch.

use std::path::Path;

use tracing::{error, info, warn, Span};

/// Structured render log for one clip group.
#[derive(Debug, Clone)]
pub struct GroupLogger {
    group: String,
}

impl GroupLogger {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
        }
    }

    pub fn log_start(&self, pairs: usize, chunks: usize) {
        info!(group = %self.group, pairs, chunks, "Render started");
    }

    /// One batch render is about to run.
    pub fn log_batch(&self, chunk: usize, chunks: usize, pairs: usize, output: &Path) {
        info!(
            group = %self.group,
            chunk,
            chunks,
            pairs,
            output = %output.display(),
            "Rendering batch"
        );
    }

    pub fn log_merge(&self, parts: usize, output: &Path) {
        info!(
            group = %self.group,
            parts,
            output = %output.display(),
            "Merging batch files"
        );
    }

    pub fn log_skip(&self, output: &Path) {
        info!(
            group = %self.group,
            output = %output.display(),
            "Final video exists, skipping group"
        );
    }

    /// Clips left out because they have no partner on the other view.
    pub fn log_unpaired(&self, dropped_front: usize, dropped_back: usize) {
        warn!(
            group = %self.group,
            dropped_front,
            dropped_back,
            "Missing pair, dropping unpaired clips"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(group = %self.group, "{}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(group = %self.group, "Render failed: {}", message);
    }

    pub fn log_completion(&self, output: &Path) {
        info!(
            group = %self.group,
            output = %output.display(),
            "Render completed"
        );
    }

    /// Span wrapping every encoder call of the group.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("render", group = %self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_json(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_batch_line_has_chunk_fields() {
        let logger = GroupLogger::new("05 Mar 2023 10-00-00");
        let out = capture_json(|| {
            logger.log_batch(1, 3, 4, Path::new("05 Mar 2023 10-00-00_1.mp4"))
        });

        assert!(out.contains(r#""group":"05 Mar 2023 10-00-00""#));
        assert!(out.contains(r#""chunk":1"#));
        assert!(out.contains(r#""chunks":3"#));
        assert!(out.contains(r#""pairs":4"#));
        assert!(out.contains("Rendering batch"));
    }

    #[test]
    fn test_unpaired_counts_are_fields() {
        let logger = GroupLogger::new("05 Mar 2023 10-00-00");
        let out = capture_json(|| logger.log_unpaired(2, 0));

        assert!(out.contains(r#""dropped_front":2"#));
        assert!(out.contains(r#""dropped_back":0"#));
        assert!(out.contains(r#""level":"WARN""#));
    }
}
