//! Client and property choice used while drafting or editing a job.

use super::{Client, ClientId, DirectoryError, Property, PropertyId};

/// A client/property pair being chosen for a job.
///
/// Choosing a different client always discards the property, so a selection
/// can never pair a property with a client that does not own it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSelection {
    client: Option<ClientId>,
    property: Option<PropertyId>,
}

impl SiteSelection {
    /// Start an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a client, resetting the property.
    pub fn select_client(&mut self, client: &Client) {
        self.client = Some(client.id.clone());
        self.property = None;
    }

    /// Choose a property belonging to the selected client.
    pub fn select_property(
        &mut self,
        client: &Client,
        property: &PropertyId,
    ) -> Result<(), DirectoryError> {
        if self.client.as_ref() != Some(&client.id) {
            return Err(DirectoryError::invalid(
                "propertyId",
                "select the owning client before choosing a property",
            ));
        }
        client.require_property(property)?;
        self.property = Some(property.clone());
        Ok(())
    }

    /// Selected client, if any.
    pub fn client(&self) -> Option<&ClientId> {
        self.client.as_ref()
    }

    /// Selected property, if any.
    pub fn property(&self) -> Option<&PropertyId> {
        self.property.as_ref()
    }

    /// Resolve a complete selection against the client record.
    pub fn resolve<'c>(
        &self,
        client: &'c Client,
    ) -> Result<(&'c Client, &'c Property), DirectoryError> {
        let Some(property) = self.property.as_ref() else {
            return Err(DirectoryError::invalid("propertyId", "a property must be selected"));
        };
        if self.client.as_ref() != Some(&client.id) {
            return Err(DirectoryError::PropertyNotFound {
                client: client.id.clone(),
                property: property.clone(),
            });
        }
        Ok((client, client.require_property(property)?))
    }
}
