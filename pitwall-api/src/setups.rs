use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitwall_core::CarSetup;

use crate::id::{CarId, SetupId, UserId};
use crate::{Client, Error, Result};

/// A row of the `setups` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetupRow {
    pub id: SetupId,
    pub name: String,
    pub car_id: Option<CarId>,
    pub parts: BTreeMap<String, String>,
    pub gear_ratios: BTreeMap<String, f64>,
    pub shift_points: BTreeMap<String, u32>,
    pub nos_points: BTreeMap<String, u32>,
    pub user_id: UserId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SetupRow {
    /// Strips the row down to the plain setup model.
    pub fn into_setup(self) -> CarSetup {
        CarSetup {
            name: self.name,
            parts: self.parts,
            gear_ratios: self.gear_ratios,
            shift_points: self.shift_points,
            nos_points: self.nos_points,
        }
    }
}

/// The insert/update payload for `setups`.
#[derive(Clone, Debug, Serialize)]
pub struct NewSetupRow {
    pub name: String,
    pub car_id: Option<CarId>,
    pub parts: BTreeMap<String, String>,
    pub gear_ratios: BTreeMap<String, f64>,
    pub shift_points: BTreeMap<String, u32>,
    pub nos_points: BTreeMap<String, u32>,
    pub user_id: UserId,
}

impl NewSetupRow {
    pub fn from_setup(setup: &CarSetup, car_id: Option<CarId>, owner: UserId) -> Self {
        Self {
            name: setup.name.clone(),
            car_id,
            parts: setup.parts.clone(),
            gear_ratios: setup.gear_ratios.clone(),
            shift_points: setup.shift_points.clone(),
            nos_points: setup.nos_points.clone(),
            user_id: owner,
        }
    }
}

/// A row of the read-only `cars` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub year: u16,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct SetupsClient<'a> {
    client: &'a Client,
}

impl<'a> SetupsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Returns the signed in owner's setups, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] if nobody is signed in, or an
    /// [`enum@Error`] if the request fails.
    pub async fn list(&self) -> Result<Vec<SetupRow>> {
        let owner = self.client.owner().ok_or(Error::Unauthenticated)?;

        let req = self
            .client
            .request()
            .uri(&format!(
                "/rest/v1/setups?select=*&user_id=eq.{}&order=created_at.desc",
                owner
            ))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Returns the setup with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists, or an
    /// [`enum@Error`] if the request fails.
    pub async fn get(&self, id: &SetupId) -> Result<SetupRow> {
        let req = self
            .client
            .request()
            .uri(&format!("/rest/v1/setups?select=*&id=eq.{}", id))
            .build();

        let rows: Vec<SetupRow> = self.client.send(req).await?.json().await?;
        rows.into_iter().next().ok_or(Error::NotFound)
    }

    /// Inserts a new setup row and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn insert(&self, setup: &NewSetupRow) -> Result<SetupRow> {
        let req = self
            .client
            .request()
            .post()
            .uri("/rest/v1/setups")
            .header("Prefer", "return=representation")
            .body(setup)
            .build();

        let rows: Vec<SetupRow> = self.client.send(req).await?.json().await?;
        rows.into_iter().next().ok_or(Error::NotFound)
    }

    /// Overwrites the setup with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn update(&self, id: &SetupId, setup: &NewSetupRow) -> Result<()> {
        let req = self
            .client
            .request()
            .patch()
            .uri(&format!("/rest/v1/setups?id=eq.{}", id))
            .body(setup)
            .build();

        self.client.send(req).await?;
        Ok(())
    }

    /// Deletes the setup with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn delete(&self, id: &SetupId) -> Result<()> {
        let req = self
            .client
            .request()
            .delete()
            .uri(&format!("/rest/v1/setups?id=eq.{}", id))
            .build();

        self.client.send(req).await?;
        Ok(())
    }
}

pub struct CarsClient<'a> {
    client: &'a Client,
}

impl<'a> CarsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Returns the car catalogue, ordered by brand and model.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn list(&self) -> Result<Vec<Car>> {
        let req = self
            .client
            .request()
            .uri("/rest/v1/cars?select=*&order=brand.asc,model.asc")
            .build();

        self.client.send(req).await?.json().await
    }
}

#[cfg(test)]
mod tests {
    use pitwall_core::CarSetup;

    use super::{NewSetupRow, SetupRow};
    use crate::id::UserId;

    #[test]
    fn test_setup_row_serde_round_trip() {
        let setup = CarSetup::rx7();
        let row = NewSetupRow::from_setup(&setup, None, UserId::from("u1"));

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"gear_ratios\""));
        assert!(json.contains("\"nos_points\""));

        // A representation response echoes the payload plus the
        // gateway-assigned columns.
        let echoed = format!(
            "{{\"id\":\"s1\",\"created_at\":null,{}",
            json.strip_prefix('{').unwrap()
        );
        let row: SetupRow = serde_json::from_str(&echoed).unwrap();

        assert_eq!(row.id.as_ref(), "s1");
        assert_eq!(row.into_setup(), setup);
    }
}
