use cpf_core::{CpfError, Document, Result};
use std::path::Path;

/// A source format that can be read into a CPF `Document`.
pub trait DocumentParser: Send + Sync {
    /// Short format name for diagnostics.
    fn name(&self) -> &'static str;

    fn parse_content(&self, content: &str) -> Result<Document>;

    /// Read and parse a file. I/O failures carry the path.
    fn parse_file(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CpfError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
        })?;
        self.parse_content(&content)
    }

    /// Extensions without the leading dot, lowercase.
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Extension check, case-insensitive.
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
    }
}
