//! Gear ratio derivation and drag performance estimates.
//!
//! The numbers follow the community's calculator conventions: a 26 inch
//! tire, a 6500 RPM shift point and a 3200 lb reference weight.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tire diameter assumed by all speed calculations, in inches.
pub const TIRE_DIAMETER: f64 = 26.0;

/// The shift point used for shift speed and RPM drop figures.
pub const SHIFT_RPM: f64 = 6500.0;

/// Reference curb weight in pounds.
pub const CURB_WEIGHT: f64 = 3200.0;

const FIVE_SPEED_MULTIPLIERS: [f64; 5] = [1.0, 0.72, 0.52, 0.40, 0.30];
const SIX_SPEED_MULTIPLIERS: [f64; 6] = [1.0, 0.67, 0.49, 0.38, 0.28, 0.19];

/// The number of forward gears in the transmission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gearbox {
    FiveSpeed,
    SixSpeed,
}

impl Gearbox {
    #[inline]
    pub fn gears(self) -> usize {
        match self {
            Self::FiveSpeed => 5,
            Self::SixSpeed => 6,
        }
    }

    /// Progression multipliers applied to the first gear ratio.
    fn multipliers(self) -> &'static [f64] {
        match self {
            Self::FiveSpeed => &FIVE_SPEED_MULTIPLIERS,
            Self::SixSpeed => &SIX_SPEED_MULTIPLIERS,
        }
    }
}

/// Gearing inputs for the ratio calculator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Drivetrain {
    pub final_drive: f64,
    pub first_gear: f64,
    pub horsepower: f64,
    pub gearbox: Gearbox,
}

/// The derived figures for one gear.
#[derive(Clone, Debug, PartialEq)]
pub struct GearFigures {
    /// 1-based gear number.
    pub gear: usize,
    pub ratio: f64,
    /// Road speed at [`SHIFT_RPM`] in this gear, in mph.
    pub shift_speed: f64,
    /// RPM the engine falls to when shifting into the next gear.
    /// `None` for the top gear.
    pub rpm_drop: Option<f64>,
    /// 0..=100, derived from the RPM drop.
    pub efficiency: f64,
}

impl Default for Drivetrain {
    fn default() -> Self {
        Self {
            final_drive: 3.73,
            first_gear: 2.66,
            horsepower: 800.0,
            gearbox: Gearbox::SixSpeed,
        }
    }
}

impl Drivetrain {
    /// Derives the full ratio set from the first gear ratio using the
    /// fixed progression multipliers, rounded to two decimals.
    pub fn ratios(&self) -> Vec<f64> {
        self.gearbox
            .multipliers()
            .iter()
            .map(|m| round2(self.first_gear * m))
            .collect()
    }

    /// Road speed in mph at `rpm` through `ratio`.
    pub fn speed_at(&self, rpm: f64, ratio: f64) -> f64 {
        let tire_circumference = TIRE_DIAMETER * std::f64::consts::PI / 12.0;
        let mph = (rpm * tire_circumference * 60.0) / (self.final_drive * ratio * 5280.0);
        round2(mph)
    }

    /// Road speed at the shift point through `ratio`.
    #[inline]
    pub fn shift_speed(&self, ratio: f64) -> f64 {
        self.speed_at(SHIFT_RPM, ratio)
    }

    /// The RPM the engine falls to when shifting from `ratio` at the
    /// shift point into `next_ratio`.
    pub fn rpm_drop(&self, ratio: f64, next_ratio: f64) -> f64 {
        self.shift_speed(ratio) / self.speed_at(1000.0, next_ratio) * 1000.0
    }

    /// Rough 0 to 60 mph estimate in seconds at the reference weight.
    pub fn zero_to_sixty(&self) -> f64 {
        self.acceleration(60.0)
    }

    /// Trap speed estimate for the quarter mile: the shift speed in
    /// third gear.
    pub fn quarter_mile_speed(&self) -> f64 {
        self.shift_speed(self.ratios()[2])
    }

    /// Power to weight in hp per 1000 lb.
    pub fn power_to_weight(&self) -> f64 {
        self.horsepower / CURB_WEIGHT * 1000.0
    }

    /// Per-gear shift speeds, RPM drops and shift efficiency.
    pub fn figures(&self) -> Vec<GearFigures> {
        let ratios = self.ratios();

        ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| {
                let rpm_drop = ratios.get(i + 1).map(|&next| self.rpm_drop(ratio, next));
                let efficiency = match rpm_drop {
                    Some(drop) if drop > 0.0 => (100.0 - drop / 100.0).max(0.0),
                    _ => 100.0,
                };

                GearFigures {
                    gear: i + 1,
                    ratio,
                    shift_speed: self.shift_speed(ratio),
                    rpm_drop,
                    efficiency,
                }
            })
            .collect()
    }

    fn acceleration(&self, speed: f64) -> f64 {
        // Torque at the wheel over the reference weight, scaled into a
        // rough sprint time.
        let force = self.horsepower * 5252.0 / speed;
        force / CURB_WEIGHT * 0.0455
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{Drivetrain, Gearbox};

    #[test]
    fn test_ratio_progression() {
        let drivetrain = Drivetrain::default();
        let ratios = drivetrain.ratios();

        assert_eq!(ratios.len(), 6);
        assert_eq!(ratios[0], 2.66);
        assert_eq!(ratios[1], 1.78);
        assert_eq!(ratios[5], 0.51);

        // Ratios are strictly decreasing.
        for pair in ratios.windows(2) {
            assert!(pair[0] > pair[1]);
        }

        let five = Drivetrain {
            gearbox: Gearbox::FiveSpeed,
            ..Drivetrain::default()
        };
        assert_eq!(five.ratios().len(), 5);
    }

    #[test]
    fn test_speed_at_shift_point() {
        let drivetrain = Drivetrain::default();

        // 26 inch tire at 6500 RPM through 2.66:1 and 3.73:1.
        let speed = drivetrain.shift_speed(2.66);
        assert!((speed - 50.67).abs() < 0.01, "got {speed}");

        // Taller gears mean higher speed at the same RPM.
        assert!(drivetrain.shift_speed(1.0) > drivetrain.shift_speed(2.66));
    }

    #[test]
    fn test_figures_rpm_drop_and_efficiency() {
        let drivetrain = Drivetrain::default();
        let figures = drivetrain.figures();

        assert_eq!(figures.len(), 6);
        assert!(figures[0].rpm_drop.is_some());
        assert_eq!(figures[5].rpm_drop, None);
        assert_eq!(figures[5].efficiency, 100.0);

        for figure in &figures {
            assert!((0.0..=100.0).contains(&figure.efficiency));
        }
    }

    #[test]
    fn test_performance_estimates() {
        let drivetrain = Drivetrain::default();

        let sprint = drivetrain.zero_to_sixty();
        assert!(sprint > 0.0 && sprint < 10.0, "got {sprint}");

        assert_eq!(drivetrain.power_to_weight(), 250.0);
        assert!(drivetrain.quarter_mile_speed() > drivetrain.shift_speed(2.66));
    }
}
