use std::path::PathBuf;

use tempfile::TempDir;

/// Isolated temporary directory, usable as a vault root.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created temp directory: {data_path:?}");
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a file (and its parent directories) relative to the root.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Create a markdown note from `(id, text)` paragraphs, each ending in
    /// its `^id` anchor.
    pub fn create_note(&self, name: &str, blocks: &[(&str, &str)]) -> PathBuf {
        let body: Vec<String> = blocks
            .iter()
            .map(|(id, text)| format!("{text} ^{id}"))
            .collect();
        self.create_file(&format!("{name}.md"), &format!("{}\n", body.join("\n\n")))
    }

    pub fn read_file(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.data_path.join(relative_path)).expect("Failed to read file")
    }
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.data_path);
    }
}
