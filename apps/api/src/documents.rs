//! Uploaded documents: multipart form reading, text extraction and S3 storage.
//! Used by both CV and project request uploads.

use std::collections::HashMap;
use std::future::Future;

use aws_sdk_s3::primitives::ByteStream;
use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::errors::AppError;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file part from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(PDF_CONTENT_TYPE)
            || self
                .file_name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
            || self.bytes.starts_with(b"%PDF-")
    }
}

/// Text fields plus an optional `file` part.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedDocument>,
}

impl UploadForm {
    /// Trimmed, non-empty text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_field(&self, name: &str) -> Result<&str, AppError> {
        self.field(name)
            .ok_or_else(|| AppError::Validation(format!("'{name}' is required")))
    }
}

pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
            debug!(
                "Received file part {:?} ({} bytes)",
                file_name,
                bytes.len()
            );
            form.file = Some(UploadedDocument {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Extracts plain text from a PDF or UTF-8 text upload. Blank results are rejected.
pub async fn extract_text(document: &UploadedDocument) -> Result<String, AppError> {
    let text = if document.is_pdf() {
        extract_pdf_text(document.bytes.clone()).await?
    } else {
        String::from_utf8(document.bytes.to_vec()).map_err(|_| {
            AppError::Validation("Uploaded file must be a PDF or UTF-8 text".to_string())
        })?
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Uploaded document contains no text".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// PDF parsing is CPU-bound and pdf-extract may panic on malformed input, so it runs
/// on the blocking pool. A panic there is reported as an unreadable PDF.
async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::UnprocessableEntity("Could not read PDF: malformed document".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))
}

/// Stores the original upload under `key`.
pub async fn store_document(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    document: &UploadedDocument,
) -> Result<(), AppError> {
    let content_type = if document.is_pdf() {
        PDF_CONTENT_TYPE
    } else {
        "text/plain"
    };

    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(document.bytes.clone()))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Upload of {key} failed: {e}")))?;

    info!("Stored document at s3://{bucket}/{key}");
    Ok(())
}

/// Finishes archiving an upload whose row is already committed: when the store
/// succeeded, `record_key` saves `key` on the row. Failures in either step are logged
/// and reported as `false`; the upload itself stands.
pub async fn finish_archive<F, Fut>(
    key: &str,
    stored: Result<(), AppError>,
    record_key: F,
) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    if let Err(e) = stored {
        warn!("Original document not archived at {key}: {e}");
        return false;
    }
    match record_key().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Archived {key} but could not record its key: {e}");
            false
        }
    }
}

/// S3 key for an upload: `{prefix}/{id}.pdf` or `.txt`.
pub fn document_key(prefix: &str, id: i64, document: &UploadedDocument) -> String {
    let extension = if document.is_pdf() { "pdf" } else { "txt" };
    format!("{prefix}/{id}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_doc(text: &str) -> UploadedDocument {
        UploadedDocument {
            file_name: Some("request.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_extract_plain_text_is_trimmed() {
        let text = extract_text(&text_doc("  Trenger Rust-utvikler \n")).await.unwrap();
        assert_eq!(text, "Trenger Rust-utvikler");
    }

    #[tokio::test]
    async fn test_extract_blank_text_is_rejected() {
        assert!(matches!(
            extract_text(&text_doc(" \n\t ")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_non_utf8_is_rejected() {
        let doc = UploadedDocument {
            file_name: Some("blob.bin".to_string()),
            content_type: None,
            bytes: Bytes::from_static(&[0xff, 0xfe, 0x00]),
        };
        assert!(matches!(extract_text(&doc).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_unprocessable() {
        let doc = UploadedDocument {
            file_name: Some("broken.pdf".to_string()),
            content_type: Some(PDF_CONTENT_TYPE.to_string()),
            bytes: Bytes::from_static(b"%PDF-1.7\nthis is not a real pdf body"),
        };
        assert!(matches!(
            extract_text(&doc).await,
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn test_pdf_detection() {
        let by_name = UploadedDocument {
            file_name: Some("CV.PDF".to_string()),
            content_type: None,
            bytes: Bytes::new(),
        };
        let by_magic = UploadedDocument {
            file_name: None,
            content_type: Some("application/octet-stream".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.7 ..."),
        };
        assert!(by_name.is_pdf());
        assert!(by_magic.is_pdf());
        assert!(!text_doc("hello").is_pdf());
    }

    #[tokio::test]
    async fn test_finish_archive_records_key_after_store() {
        let recorded = std::sync::atomic::AtomicBool::new(false);
        let ok = finish_archive("cvs/1.pdf", Ok(()), || async {
            recorded.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(ok);
        assert!(recorded.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_finish_archive_skips_record_when_store_failed() {
        let recorded = std::sync::atomic::AtomicBool::new(false);
        let ok = finish_archive("cvs/1.pdf", Err(AppError::S3("bucket missing".into())), || async {
            recorded.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(!ok);
        assert!(!recorded.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_finish_archive_swallows_key_update_error() {
        let ok = finish_archive("project-requests/9.pdf", Ok(()), || async {
            Err(sqlx::Error::PoolTimedOut)
        })
        .await;
        assert!(!ok);
    }

    #[test]
    fn test_document_key() {
        assert_eq!(document_key("cvs", 12, &text_doc("x")), "cvs/12.txt");
    }

    #[test]
    fn test_form_field_trims_and_requires() {
        let mut form = UploadForm::default();
        form.fields.insert("customer_name".into(), "  Sparebank1 ".into());
        form.fields.insert("title".into(), "   ".into());
        assert_eq!(form.field("customer_name"), Some("Sparebank1"));
        assert_eq!(form.field("title"), None);
        assert!(form.require_field("title").is_err());
    }
}
