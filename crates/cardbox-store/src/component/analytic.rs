use cardbox_types::ComponentHash;

use crate::canonical::{CanonicalForm, ComponentKind};
use crate::error::StoreResult;

use super::HashCell;

/// Plain text leaf. No children; always loaded.
#[derive(Clone, Debug, Default)]
pub struct Analytic {
    text: String,
    hash: HashCell,
}

impl Analytic {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hash: HashCell::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.hash.invalidate();
    }

    pub fn label(&self) -> String {
        self.text.clone()
    }

    pub fn content_hash(&self) -> ComponentHash {
        self.hash
            .get_or_compute(|| ComponentKind::Analytic.hasher().hash(self.text.as_bytes()))
    }

    pub fn to_canonical_form(&self) -> CanonicalForm {
        CanonicalForm::leaf(self.text.clone())
    }

    pub fn from_canonical_form(form: &CanonicalForm) -> StoreResult<Self> {
        if !form.is_leaf() {
            return Err(crate::StoreError::decode("analytic form must not carry children"));
        }
        Ok(Self::new(form.own_value()?))
    }
}

impl PartialEq for Analytic {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Analytic {}
