use thiserror::Error;

/// Data-integrity failures in the reference price list.
///
/// Missing listings and empty inputs are not errors: they surface as
/// [`ComplianceStatus::Undetermined`](crate::model::ComplianceStatus) records
/// and zero-valued metrics in the report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Two reference products normalize to the same join key.
    #[error("duplicate reference product: '{product_name}'")]
    DuplicateProduct { product_name: String },

    /// A reference price below zero.
    #[error("reference product '{product_name}': negative price {price}")]
    NegativeReferencePrice { product_name: String, price: f64 },

    /// A reference price that is NaN or infinite.
    #[error("reference product '{product_name}': price is not a finite number")]
    NonFiniteReferencePrice { product_name: String },

    /// A reference product whose name is blank after normalization.
    #[error("reference product #{position}: empty product name")]
    EmptyProductName { position: usize },
}

impl ReconError {
    /// True for errors the caller must fix in the source data.
    ///
    /// Every current variant is a data-integrity violation; the method exists so
    /// callers can map errors to exit codes without matching on variants.
    pub fn is_data_integrity(&self) -> bool {
        match self {
            Self::DuplicateProduct { .. }
            | Self::NegativeReferencePrice { .. }
            | Self::NonFiniteReferencePrice { .. }
            | Self::EmptyProductName { .. } => true,
        }
    }
}
