use serde::{Deserialize, Serialize};

use super::{SerializationError, Subject};
use crate::core::data::{Recipient, RecipientType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecipient {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
}

impl From<&Recipient> for WireRecipient {
    fn from(recipient: &Recipient) -> Self {
        Self {
            kind: recipient.kind.wire().to_string(),
            target: recipient.target.clone(),
        }
    }
}

impl WireRecipient {
    pub fn into_recipient(self, subject: &Subject) -> Result<Recipient, SerializationError> {
        let kind = RecipientType::parse(&self.kind).ok_or_else(|| {
            subject.invalid("recipients", format!("unknown recipient type '{}'", self.kind))
        })?;
        Ok(Recipient::new(kind, self.target))
    }
}

pub fn recipients_to_wire(recipients: &[Recipient]) -> Vec<WireRecipient> {
    recipients.iter().map(WireRecipient::from).collect()
}

pub fn recipients_from_wire(
    recipients: Vec<WireRecipient>,
    subject: &Subject,
) -> Result<Vec<Recipient>, SerializationError> {
    recipients
        .into_iter()
        .map(|r| r.into_recipient(subject))
        .collect()
}
