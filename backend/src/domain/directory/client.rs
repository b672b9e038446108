//! Client accounts and the properties they own.

use serde::{Deserialize, Serialize};

use super::{ClientId, DirectoryError, PropertyId, email_address, required_text};

/// A serviced location owned by exactly one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property identifier.
    pub id: PropertyId,
    /// Name, unique within the owning client.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Access notes shown to technicians.
    pub special_instructions: String,
}

/// Unvalidated input for a new property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDraft {
    /// Property name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Optional access notes.
    pub special_instructions: Option<String>,
}

/// A customer account.
///
/// # Examples
/// ```
/// use fieldcrew::domain::{Client, ClientDraft, ClientId, PropertyDraft, PropertyId};
///
/// let mut client = Client::new(
///     ClientId::new("CLIENT-001"),
///     ClientDraft {
///         name: "Acme Corp".to_owned(),
///         contact_person: "John Smith".to_owned(),
///         email: "john@acme.com".to_owned(),
///         phone: "(555) 123-4567".to_owned(),
///         main_address: "123 Business Ave".to_owned(),
///     },
/// )
/// .expect("valid client");
/// client
///     .add_property(
///         PropertyId::new("PROP-001"),
///         PropertyDraft {
///             name: "Main Office Building".to_owned(),
///             address: "123 Business Ave".to_owned(),
///             special_instructions: None,
///         },
///     )
///     .expect("unique property");
/// assert!(client.property(&PropertyId::new("PROP-001")).is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client identifier.
    pub id: ClientId,
    /// Company or household name.
    pub name: String,
    /// Primary contact.
    pub contact_person: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Billing address.
    pub main_address: String,
    properties: Vec<Property>,
}

/// Unvalidated input for a new client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    /// Client name.
    pub name: String,
    /// Primary contact.
    pub contact_person: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Billing address.
    pub main_address: String,
}

impl Client {
    /// Validate a draft into a client with no properties.
    pub fn new(id: ClientId, draft: ClientDraft) -> Result<Self, DirectoryError> {
        Ok(Self {
            id,
            name: required_text("name", &draft.name)?,
            contact_person: required_text("contactPerson", &draft.contact_person)?,
            email: email_address("email", &draft.email)?,
            phone: draft.phone.trim().to_owned(),
            main_address: draft.main_address.trim().to_owned(),
            properties: Vec::new(),
        })
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> &[Property] {
        self.properties.as_slice()
    }

    /// Look up one of this client's properties.
    pub fn property(&self, id: &PropertyId) -> Option<&Property> {
        self.properties.iter().find(|property| &property.id == id)
    }

    /// Resolve a property or report that it does not belong to the client.
    pub fn require_property(&self, id: &PropertyId) -> Result<&Property, DirectoryError> {
        self.property(id).ok_or_else(|| DirectoryError::PropertyNotFound {
            client: self.id.clone(),
            property: id.clone(),
        })
    }

    /// Append a property; names are unique per client, ignoring case.
    pub fn add_property(
        &mut self,
        id: PropertyId,
        draft: PropertyDraft,
    ) -> Result<Property, DirectoryError> {
        let name = required_text("name", &draft.name)?;
        let address = required_text("address", &draft.address)?;
        if self
            .properties
            .iter()
            .any(|existing| existing.name.eq_ignore_ascii_case(&name))
        {
            return Err(DirectoryError::DuplicateProperty {
                client: self.id.clone(),
                name,
            });
        }
        let property = Property {
            id,
            name,
            address,
            special_instructions: draft
                .special_instructions
                .map(|text| text.trim().to_owned())
                .unwrap_or_default(),
        };
        self.properties.push(property.clone());
        Ok(property)
    }
}

/// Case-insensitive search over client name, contact person and email.
///
/// A blank term returns every client. Input order is preserved.
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let needle = term.trim().to_lowercase();
    clients
        .iter()
        .filter(|client| {
            needle.is_empty()
                || [&client.name, &client.contact_person, &client.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
