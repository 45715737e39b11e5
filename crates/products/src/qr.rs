use serde::{Deserialize, Serialize};

use chaintrack_core::{DomainError, DomainResult, ProductId};

/// URI template a product's QR code is rendered from. `{id}` is replaced by the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrCodeTemplate(String);

impl QrCodeTemplate {
    pub const PLACEHOLDER: &'static str = "{id}";
    pub const DEFAULT: &'static str = "https://supply-chain.example/product/{id}";

    pub fn new(template: impl Into<String>) -> DomainResult<Self> {
        let template = template.into();
        if !template.contains(Self::PLACEHOLDER) {
            return Err(DomainError::invalid_input(format!(
                "qr code template must contain {}",
                Self::PLACEHOLDER
            )));
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic: the same id always renders the same code.
    pub fn render(&self, id: ProductId) -> String {
        self.0.replace(Self::PLACEHOLDER, &id.to_string())
    }
}

impl Default for QrCodeTemplate {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}
