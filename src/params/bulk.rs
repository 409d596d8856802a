//! Parameters for the bulk message endpoints.

use crate::error::{Error, Result};
use crate::model::ValidationErrors;
use crate::params::ParamValue;

pub(crate) const BULK_CONTEXT_PATH: &str = "/messages/bulks";

/// Parameters for starting a bulk send from an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkMessageCreateParams {
    pub bulk_file_id: String,
}

impl BulkMessageCreateParams {
    pub fn builder() -> BulkMessageCreateParamsBuilder {
        BulkMessageCreateParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        BULK_CONTEXT_PATH.to_owned()
    }

    pub fn to_data(&self) -> Vec<(String, ParamValue)> {
        vec![(
            "bulk_file_id".to_owned(),
            ParamValue::Single(self.bulk_file_id.clone()),
        )]
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.bulk_file_id.is_empty() {
            errors.push(
                "bulkFileId",
                &["bulkFileId is required.", "Enter a string (UUID)."],
            );
        }
        match errors.into_detail() {
            None => Ok(()),
            Some(error) => Err(Error::InvalidParams { error }),
        }
    }
}

/// Builder for [`BulkMessageCreateParams`].
#[derive(Debug, Default)]
pub struct BulkMessageCreateParamsBuilder {
    params: BulkMessageCreateParams,
}

impl BulkMessageCreateParamsBuilder {
    pub fn bulk_file_id(mut self, bulk_file_id: impl Into<String>) -> Self {
        self.params.bulk_file_id = bulk_file_id.into();
        self
    }

    pub fn build(self) -> BulkMessageCreateParams {
        self.params
    }
}

/// Parameters for fetching a bulk send's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkMessageShowParams {
    pub id: String,
}

impl BulkMessageShowParams {
    pub fn builder() -> BulkMessageShowParamsBuilder {
        BulkMessageShowParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        format!("{BULK_CONTEXT_PATH}/{}", self.id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(&self.id)
    }
}

/// Builder for [`BulkMessageShowParams`].
#[derive(Debug, Default)]
pub struct BulkMessageShowParamsBuilder {
    params: BulkMessageShowParams,
}

impl BulkMessageShowParamsBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.params.id = id.into();
        self
    }

    pub fn build(self) -> BulkMessageShowParams {
        self.params
    }
}

/// Parameters for locating a bulk send's result file.
///
/// The endpoint answers with a redirect to the result once it is ready; the
/// client surfaces the `Location` header rather than a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkMessageListMessageParams {
    pub id: String,
}

impl BulkMessageListMessageParams {
    pub fn builder() -> BulkMessageListMessageParamsBuilder {
        BulkMessageListMessageParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        format!("{BULK_CONTEXT_PATH}/{}/messages", self.id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(&self.id)
    }
}

/// Builder for [`BulkMessageListMessageParams`].
#[derive(Debug, Default)]
pub struct BulkMessageListMessageParamsBuilder {
    params: BulkMessageListMessageParams,
}

impl BulkMessageListMessageParamsBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.params.id = id.into();
        self
    }

    pub fn build(self) -> BulkMessageListMessageParams {
        self.params
    }
}

fn validate_id(id: &str) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if id.is_empty() {
        errors.push("id", &["id is required.", "Enter a string (UUID)."]);
    }
    match errors.into_detail() {
        None => Ok(()),
        Some(error) => Err(Error::InvalidParams { error }),
    }
}
