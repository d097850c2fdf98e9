use crate::helper::WorkflowError;
use actix_multipart::Multipart;
use actix_web::web::BytesMut;
use futures_util::StreamExt;

/// Text fields longer than this are rejected while streaming.
const MAX_TEXT_FIELD_BYTES: usize = 4096;

/// A photo upload read from a multipart form.
#[derive(Debug, Default)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub original_filename: Option<String>,
    pub title: String,
    pub description: Option<String>,
}

fn multipart_error(e: actix_multipart::MultipartError) -> WorkflowError {
    WorkflowError::InvalidInput(format!("malformed upload: {}", e))
}

/// Reads the `file`, `title` and `description` fields of an upload form.
/// The file is kept in memory and capped at `max_file_bytes`.
pub async fn read_photo_upload(mut payload: Multipart, max_file_bytes: u64) -> Result<PhotoUpload, WorkflowError> {
    let mut upload = PhotoUpload::default();
    let mut saw_file = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let field_name = field.content_disposition().get_name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                saw_file = true;
                upload.original_filename = field.content_disposition().get_filename().map(str::to_string);
                let mut data = BytesMut::new();
                while let Some(chunk) = field.next().await {
                    data.extend_from_slice(&chunk.map_err(multipart_error)?);
                    if data.len() as u64 > max_file_bytes {
                        return Err(WorkflowError::InvalidInput(format!(
                            "photo is too large, the maximum is {} MB",
                            max_file_bytes / (1024 * 1024)
                        )));
                    }
                }
                upload.bytes = data.to_vec();
            }
            "title" | "description" => {
                let mut data = BytesMut::new();
                while let Some(chunk) = field.next().await {
                    data.extend_from_slice(&chunk.map_err(multipart_error)?);
                    if data.len() > MAX_TEXT_FIELD_BYTES {
                        return Err(WorkflowError::InvalidInput(format!("{} is too long", field_name)));
                    }
                }
                let value = String::from_utf8(data.to_vec())
                    .map_err(|_| WorkflowError::InvalidInput(format!("{} is not valid UTF-8", field_name)))?;
                if field_name == "title" {
                    upload.title = value;
                } else {
                    upload.description = Some(value);
                }
            }
            _ => {
                // Drain unknown fields so the stream can advance.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(multipart_error)?;
                }
            }
        }
    }

    if !saw_file {
        return Err(WorkflowError::InvalidInput("no photo file was uploaded".to_string()));
    }
    Ok(upload)
}
