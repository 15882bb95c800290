use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use shared::ImageExtension;

use crate::error::PredictError;

pub const FILE_FIELD: &str = "file";

/// Raw bytes of the `file` form field and the filename the client claimed.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Pulls the first `file` part carrying a filename out of the form. Parts
/// without a filename are plain form values and are skipped. The filename is
/// validated before the body is read, so a bad name wins over the size cap.
pub async fn read_upload(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<UploadedFile, PredictError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(mut field) = payload.try_next().await? {
        let filename = field
            .content_disposition()
            .filter(|cd| cd.get_name() == Some(FILE_FIELD))
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let Some(filename) = filename.filter(|_| upload.is_none()) else {
            while field.try_next().await?.is_some() {}
            continue;
        };
        if filename.is_empty() {
            return Err(PredictError::NoFileSelected);
        }
        if ImageExtension::from_filename(&filename).is_none() {
            return Err(PredictError::UnsupportedFileType);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(PredictError::FileTooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        upload = Some(UploadedFile { filename, bytes });
    }

    upload.ok_or(PredictError::NoFileUploaded)
}
