//! Build outputs handed to the output processor.
//!
//! The packaging pipeline shifts every output's version code above the highest
//! one already published on the track, then hands each output to the
//! configured [`OutputProcessor`](crate::OutputProcessor). The processor may
//! change presentation fields such as the version name; identity fields only
//! have getters.

use std::path::{Path, PathBuf};

use playship_types::ConfigError;

use crate::publisher::PublisherSnapshot;

/// One packaged artifact of a build variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    variant: String,
    file: PathBuf,
    version_code: i64,
    version_name: Option<String>,
}

impl BuildOutput {
    pub fn new(variant: impl Into<String>, file: impl Into<PathBuf>, version_code: i64) -> Self {
        Self {
            variant: variant.into(),
            file: file.into(),
            version_code,
            version_name: None,
        }
    }

    pub fn with_version_name(mut self, version_name: impl Into<String>) -> Self {
        self.version_name = Some(version_name.into());
        self
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn version_code(&self) -> i64 {
        self.version_code
    }

    pub fn version_name(&self) -> Option<&str> {
        self.version_name.as_deref()
    }

    pub fn set_version_name(&mut self, version_name: impl Into<String>) {
        self.version_name = Some(version_name.into());
    }
}

/// Shift all version codes by one common offset so the smallest becomes
/// `max_known + 1`. Relative order and gaps are preserved.
///
/// Fails without touching any output when a shifted code would not fit in an
/// `i64`.
pub fn shift_version_codes(
    outputs: &mut [BuildOutput],
    max_known: i64,
) -> Result<(), ConfigError> {
    let Some(smallest) = outputs.iter().map(|o| o.version_code).min() else {
        return Ok(());
    };
    let overflow = ConfigError::VersionCodeOverflow {
        smallest,
        max_known,
    };

    let offset = max_known
        .checked_add(1)
        .and_then(|next| next.checked_sub(smallest))
        .ok_or_else(|| overflow.clone())?;
    let shifted = outputs
        .iter()
        .map(|o| o.version_code.checked_add(offset))
        .collect::<Option<Vec<_>>>()
        .ok_or(overflow)?;

    for (output, code) in outputs.iter_mut().zip(shifted) {
        output.version_code = code;
    }
    Ok(())
}

impl PublisherSnapshot {
    /// Shift version codes, then run the output processor on every output.
    pub fn process_outputs(
        &self,
        outputs: &mut [BuildOutput],
        max_known: i64,
    ) -> Result<(), ConfigError> {
        shift_version_codes(outputs, max_known)?;
        if let Some(processor) = self.output_processor() {
            for output in outputs.iter_mut() {
                processor.call(output);
            }
        }
        Ok(())
    }
}
