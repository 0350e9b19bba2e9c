use clap::Subcommand;
use pitwall_api::Result;
use pitwall_core::{Drivetrain, Gearbox};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive gear ratios and drag figures from the drivetrain inputs.
    Calc {
        #[clap(long, default_value_t = 3.73)]
        final_drive: f64,
        #[clap(long, default_value_t = 2.66)]
        first_gear: f64,
        #[clap(long, default_value_t = 800.0)]
        horsepower: f64,
        /// Number of forward gears (5 or 6).
        #[clap(long, default_value_t = 6)]
        gears: u8,
    },
}

impl Command {
    pub fn run(&self) -> Result<()> {
        match self {
            Self::Calc {
                final_drive,
                first_gear,
                horsepower,
                gears,
            } => {
                let gearbox = match gears {
                    5 => Gearbox::FiveSpeed,
                    6 => Gearbox::SixSpeed,
                    n => {
                        println!("Unsupported gear count {}, expected 5 or 6", n);
                        return Ok(());
                    }
                };

                let drivetrain = Drivetrain {
                    final_drive: *final_drive,
                    first_gear: *first_gear,
                    horsepower: *horsepower,
                    gearbox,
                };

                println!("Gear | Ratio | Shift speed | Lands at | Efficiency");
                for figure in drivetrain.figures() {
                    let drop = figure
                        .rpm_drop
                        .map(|drop| format!("{:.0} rpm", drop))
                        .unwrap_or_else(|| "-".to_owned());

                    println!(
                        "{} | {:.2}:1 | {:.0} mph | {} | {:.0}%",
                        figure.gear, figure.ratio, figure.shift_speed, drop, figure.efficiency
                    );
                }

                println!();
                println!("0-60 mph: {:.1}s", drivetrain.zero_to_sixty());
                println!("1/4 mile speed: {:.0} mph", drivetrain.quarter_mile_speed());
                println!("Power/weight: {:.1} hp/1000 lb", drivetrain.power_to_weight());
            }
        }

        Ok(())
    }
}
