use clap::Subcommand;
use pitwall_api::id::SetupId;
use pitwall_api::setups::NewSetupRow;
use pitwall_api::{Client, Error, Result};
use pitwall_core::CarSetup;

use crate::utils::Prompt;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List your saved setups.
    List,
    /// Print a setup sheet.
    Show { id: SetupId },
    /// Save a template setup under a new name.
    Create {
        /// Start from the rotary (RX-7) part list.
        #[clap(long)]
        rotary: bool,
    },
    /// Delete a saved setup.
    Delete { id: SetupId },
    /// List the car catalogue.
    Cars,
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List => {
                let setups = client.setups().list().await?;

                println!("ID | Name | Created");
                for setup in setups {
                    let created = setup
                        .created_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default();

                    println!("{} | {} | {}", setup.id, setup.name, created);
                }
            }
            Self::Show { id } => {
                let row = client.setups().get(id).await?;
                print!("{}", row.into_setup().sheet());
            }
            Self::Create { rotary } => {
                let owner = client.owner().ok_or(Error::Unauthenticated)?;

                let mut setup = if *rotary {
                    CarSetup::rx7()
                } else {
                    CarSetup::template()
                };
                setup.name = Prompt::new("Name").read_valid();

                let row = client
                    .setups()
                    .insert(&NewSetupRow::from_setup(&setup, None, owner))
                    .await?;

                println!("Saved setup {}", row.id);
            }
            Self::Delete { id } => {
                client.setups().delete(id).await?;
                println!("Deleted setup {}", id);
            }
            Self::Cars => {
                let cars = client.cars().list().await?;

                println!("ID | Car");
                for car in cars {
                    println!("{} | {} {} {}", car.id, car.year, car.brand, car.model);
                }
            }
        }

        Ok(())
    }
}
