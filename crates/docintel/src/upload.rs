use crate::error::UploadError;

/// A document received for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Rejects an empty batch, names without an allowed extension (all of them
/// listed in one error), and empty files.
pub fn validate_uploads(
    files: &[UploadedFile],
    allowed_extensions: &[String],
) -> Result<(), UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    let invalid: Vec<String> = files
        .iter()
        .filter(|file| !has_allowed_extension(&file.filename, allowed_extensions))
        .map(|file| file.filename.clone())
        .collect();
    if !invalid.is_empty() {
        return Err(UploadError::InvalidExtensions {
            allowed: allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_uppercase())
                .collect::<Vec<_>>()
                .join("/"),
            files: invalid,
        });
    }

    if let Some(empty) = files.iter().find(|file| file.content.is_empty()) {
        return Err(UploadError::EmptyFile(empty.filename.clone()));
    }

    Ok(())
}

fn has_allowed_extension(filename: &str, allowed_extensions: &[String]) -> bool {
    let lower = filename.to_lowercase();
    allowed_extensions
        .iter()
        .any(|ext| lower.ends_with(&ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_only() -> Vec<String> {
        vec![".pdf".to_string()]
    }

    #[test]
    fn test_accepts_pdfs() {
        let files = vec![
            UploadedFile::new("bill.pdf", b"%PDF".to_vec()),
            UploadedFile::new("SCAN.PDF", b"%PDF".to_vec()),
        ];
        assert_eq!(validate_uploads(&files, &pdf_only()), Ok(()));
    }

    #[test]
    fn test_rejects_empty_batch() {
        assert_eq!(validate_uploads(&[], &pdf_only()), Err(UploadError::NoFiles));
    }

    #[test]
    fn test_lists_every_invalid_file() {
        let files = vec![
            UploadedFile::new("bill.pdf", b"%PDF".to_vec()),
            UploadedFile::new("notes.txt", b"hi".to_vec()),
            UploadedFile::new("photo.jpg", b"\xff".to_vec()),
        ];
        let err = validate_uploads(&files, &pdf_only()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only PDF files are supported. Received invalid files: notes.txt, photo.jpg"
        );
    }

    #[test]
    fn test_rejects_empty_file() {
        let files = vec![
            UploadedFile::new("bill.pdf", b"%PDF".to_vec()),
            UploadedFile::new("blank.pdf", Vec::new()),
        ];
        assert_eq!(
            validate_uploads(&files, &pdf_only()),
            Err(UploadError::EmptyFile("blank.pdf".to_string()))
        );
    }

    #[test]
    fn test_multiple_allowed_extensions() {
        let allowed = vec![".pdf".to_string(), ".PNG".to_string()];
        let files = vec![UploadedFile::new("scan.png", b"\x89PNG".to_vec())];
        assert_eq!(validate_uploads(&files, &allowed), Ok(()));

        let files = vec![UploadedFile::new("scan.gif", b"GIF".to_vec())];
        let err = validate_uploads(&files, &allowed).unwrap_err();
        assert!(err.to_string().starts_with("Only PDF/PNG files are supported."));
    }
}
