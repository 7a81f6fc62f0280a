//! Trip domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// A posted trip record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Whether the trip carries coordinates usable for map rendering
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A trip joined with its author's username (feed, detail, admin views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripWithAuthor {
    #[serde(flatten)]
    pub trip: Trip,
    pub author_username: Option<String>,
}

/// Form input for creating a trip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTrip {
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewTrip {
    /// Validate required form fields before any network call
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location_name.trim().is_empty()
        {
            return Err(Error::validation(
                "title, description, and location name are required",
            ));
        }
        Ok(())
    }

    /// Build the row to insert for the given owner
    pub fn into_trip(self, user_id: Uuid, photo_url: Option<String>) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            description: self.description,
            location_name: self.location_name,
            latitude: self.latitude,
            longitude: self.longitude,
            photo_url,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of an existing trip
#[derive(Debug, Clone, Default, Serialize)]
pub struct TripUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<Option<String>>,
}

impl TripUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location_name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.photo_url.is_none()
    }

    /// Validate that no required field is being blanked out
    pub fn validate(&self) -> Result<()> {
        let blanked = |field: &Option<String>| {
            field
                .as_ref()
                .map(|value| value.trim().is_empty())
                .unwrap_or(false)
        };
        if blanked(&self.title) || blanked(&self.description) || blanked(&self.location_name) {
            return Err(Error::validation(
                "title, description, and location name cannot be empty",
            ));
        }
        Ok(())
    }
}
