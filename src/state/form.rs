/// "New drawing" form state
///
/// Holds the three text fields, the compressed image waiting to be
/// uploaded, and whether compression is still running.
///
/// Every compression run gets an `Upload` ticket. Picking another file or
/// resetting the form supersedes all earlier tickets, so a slow result from
/// a previous pick (or a previous opening of the modal) is never attached.

use thiserror::Error;

use super::data::{ClientInfo, NewDraw};
use crate::media::{EncodedImage, MediaError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("type is required")]
    MissingType,
    #[error("client name is required")]
    MissingClientName,
    #[error("client address is required")]
    MissingClientAddress,
    #[error("an image is required")]
    MissingImage,
}

/// Identifies one compression run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upload(u64);

/// What became of a compression result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Image attached to the form
    Attached,
    /// Superseded by another pick or a reset; ignored
    Stale,
    Failed(MediaError),
}

#[derive(Debug, Clone, Default)]
pub struct DrawForm {
    pub kind: String,
    pub client_name: String,
    pub client_address: String,
    /// Pending upload, set once compression succeeds
    pub image: Option<EncodedImage>,
    /// True while the compression task is running
    pub compressing: bool,
    /// Latest issued upload ticket; survives `reset`
    upload: u64,
}

impl DrawForm {
    /// Start a compression run, superseding any earlier one
    pub fn begin_upload(&mut self) -> Upload {
        self.upload += 1;
        self.compressing = true;
        Upload(self.upload)
    }

    #[cfg(test)]
    pub fn current_upload(&self) -> Upload {
        Upload(self.upload)
    }

    /// Accept the result of `upload` if it is still the latest run.
    /// Stale results leave the form untouched.
    pub fn finish_upload(
        &mut self,
        upload: Upload,
        result: Result<EncodedImage, MediaError>,
    ) -> UploadOutcome {
        if upload != Upload(self.upload) {
            return UploadOutcome::Stale;
        }
        self.compressing = false;

        match result {
            Ok(image) => {
                self.image = Some(image);
                UploadOutcome::Attached
            }
            Err(err) => UploadOutcome::Failed(err),
        }
    }

    /// Whether the submit button should be enabled
    pub fn can_submit(&self, busy: bool) -> bool {
        self.image.is_some() && !self.compressing && !busy
    }

    /// Build the create payload, checking required fields
    pub fn validate(&self) -> Result<NewDraw, FormError> {
        let kind = required(&self.kind, FormError::MissingType)?;
        let name = required(&self.client_name, FormError::MissingClientName)?;
        let address = required(&self.client_address, FormError::MissingClientAddress)?;
        let image = self.image.as_ref().ok_or(FormError::MissingImage)?;

        Ok(NewDraw {
            kind,
            client: ClientInfo { name, address },
            image: image.data_uri.clone(),
        })
    }

    /// Clear every field, including the pending image, and invalidate
    /// any compression still running
    pub fn reset(&mut self) {
        *self = Self {
            upload: self.upload + 1,
            ..Self::default()
        };
    }
}

fn required(value: &str, err: FormError) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}
