use crate::error::IngestError;
use crate::models::DocumentSection;
use lopdf::Document;
use std::path::Path;

pub trait PdfExtractor {
    fn extract_sections(&self, path: &Path) -> Result<Vec<DocumentSection>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_sections(&self, path: &Path) -> Result<Vec<DocumentSection>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;
        let source_path = path.to_string_lossy().to_string();

        let mut sections = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                sections.push(DocumentSection {
                    source_path: source_path.clone(),
                    page: Some(page_no),
                    text,
                });
            }
        }

        if sections.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(sections)
    }
}

pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Load a single document: one section per page for PDFs, one section for
/// the whole file otherwise. Non-PDF files must decode as UTF-8.
pub fn load_document(path: &Path) -> Result<Vec<DocumentSection>, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;

    if is_pdf_path(path) {
        return LopdfExtractor::default().extract_sections(path);
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|error| {
        IngestError::Decode(format!("{} is not valid utf-8: {error}", path.display()))
    })?;

    Ok(vec![DocumentSection {
        source_path: path.to_string_lossy().to_string(),
        page: None,
        text,
    }])
}

#[cfg(test)]
mod tests {
    use super::{is_pdf_path, load_document};
    use crate::error::IngestError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn pdf_extension_check_ignores_case() {
        assert!(is_pdf_path(Path::new("manual.pdf")));
        assert!(is_pdf_path(Path::new("manual.PDF")));
        assert!(!is_pdf_path(Path::new("notes.txt")));
        assert!(!is_pdf_path(Path::new("no_extension")));
    }

    #[test]
    fn text_file_becomes_one_section() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("sample.txt");
        fs::write(&path, "The sky is blue. Water is wet.")?;

        let sections = load_document(&path)?;
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].page, None);
        assert_eq!(sections[0].text, "The sky is blue. Water is wet.");
        assert!(sections[0].source_path.ends_with("sample.txt"));
        Ok(())
    }

    #[test]
    fn non_utf8_text_is_a_decode_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("binary.dat");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41])?;

        let result = load_document(&path);
        assert!(matches!(result, Err(IngestError::Decode(_))));
        Ok(())
    }

    #[test]
    fn unreadable_pdf_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = load_document(&path);
        assert!(matches!(result, Err(IngestError::PdfParse(_))));
        Ok(())
    }
}
