//! The vehicle setup sheet model.
//!
//! A setup is a named collection of part grades, gear ratios, shift
//! points and nitrous activation points. Grades use the community scale
//! where `-3` means fully upgraded.

use std::collections::BTreeMap;
use std::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const COMMON_PARTS: [&str; 18] = [
    "Intake",
    "Throttle Body",
    "Supercharger",
    "Reinforcement",
    "Diverter Valves and BOV",
    "Nitrous Oxide",
    "Radiator",
    "Oil Catch System",
    "Catalytic Converter",
    "Exhaust Manifold",
    "ECU",
    "Weight Reduction",
    "Fuel System",
    "Brakes",
    "Differential",
    "Clutch",
    "Drivetrain",
    "Transmission",
];

const PISTON_PARTS: [&str; 4] = ["Camshafts", "Intercooler", "Turbo", "Top End Kit"];

const ROTARY_PARTS: [&str; 7] = [
    "Gears",
    "Rotor",
    "Porting",
    "Eccentric Shaft Kits",
    "Intercooler",
    "Turbo",
    "Top End Kit",
];

/// A complete setup sheet for one car.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CarSetup {
    pub name: String,
    pub parts: BTreeMap<String, String>,
    pub gear_ratios: BTreeMap<String, f64>,
    pub shift_points: BTreeMap<String, u32>,
    pub nos_points: BTreeMap<String, u32>,
}

impl CarSetup {
    /// The baseline template for piston engined cars, every part at the
    /// maximum grade.
    pub fn template() -> Self {
        Self {
            name: "New Setup".to_owned(),
            parts: part_grades(COMMON_PARTS.iter().chain(&PISTON_PARTS)),
            gear_ratios: BTreeMap::from([
                ("Final Drive".to_owned(), 4.23),
                ("1st Gear".to_owned(), 2.66),
                ("2nd Gear".to_owned(), 2.06),
                ("3rd Gear".to_owned(), 1.55),
                ("4th Gear".to_owned(), 1.22),
                ("5th Gear".to_owned(), 0.95),
                ("6th Gear".to_owned(), 0.74),
            ]),
            shift_points: BTreeMap::from([
                ("1st".to_owned(), 7200),
                ("2nd".to_owned(), 7200),
                ("3rd".to_owned(), 7200),
                ("4th".to_owned(), 7200),
                ("5th".to_owned(), 7200),
                ("6th".to_owned(), 7200),
            ]),
            nos_points: BTreeMap::from([
                ("1st".to_owned(), 0),
                ("2nd".to_owned(), 0),
                ("3rd".to_owned(), 6500),
                ("4th".to_owned(), 6800),
                ("5th".to_owned(), 7000),
                ("6th".to_owned(), 0),
            ]),
        }
    }

    /// The RX-7 variant of [`template`]: the rotary part list instead of
    /// the piston one, same gearing.
    ///
    /// [`template`]: Self::template
    pub fn rx7() -> Self {
        Self {
            name: "RX-7 Setup".to_owned(),
            parts: part_grades(COMMON_PARTS.iter().chain(&ROTARY_PARTS)),
            ..Self::template()
        }
    }

    /// Renders the setup as a plain text sheet: parts list, gear ratios,
    /// then shift and nitrous points per gear (`OFF` when the nitrous
    /// point is 0).
    pub fn sheet(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out);

        let _ = writeln!(out, "Parts List");
        for (part, grade) in &self.parts {
            let _ = writeln!(out, "  {}: {}", part, grade);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Gear Ratios");
        for (gear, ratio) in &self.gear_ratios {
            let _ = writeln!(out, "  {}: {}", gear, ratio);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Shift & NOS Points");
        for (gear, rpm) in &self.shift_points {
            let nos = match self.nos_points.get(gear) {
                Some(&rpm) if rpm > 0 => rpm.to_string(),
                _ => "OFF".to_owned(),
            };

            let _ = writeln!(out, "  {} Gear - Shift: {} RPM | NOS: {}", gear, rpm, nos);
        }

        out
    }
}

fn part_grades<'a, I>(parts: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a &'a str>,
{
    parts
        .into_iter()
        .map(|part| ((*part).to_owned(), "-3".to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::CarSetup;

    #[test]
    fn test_templates() {
        let setup = CarSetup::template();
        assert_eq!(setup.parts.len(), 22);
        assert!(setup.parts.contains_key("Camshafts"));
        assert_eq!(setup.gear_ratios["Final Drive"], 4.23);

        let rx7 = CarSetup::rx7();
        assert_eq!(rx7.name, "RX-7 Setup");
        assert!(rx7.parts.contains_key("Rotor"));
        assert!(!rx7.parts.contains_key("Camshafts"));
        assert_eq!(rx7.gear_ratios, setup.gear_ratios);
    }

    #[test]
    fn test_sheet_marks_disabled_nos() {
        let setup = CarSetup::template();
        let sheet = setup.sheet();

        assert!(sheet.starts_with("New Setup\n"));
        assert!(sheet.contains("3rd Gear - Shift: 7200 RPM | NOS: 6500"));
        assert!(sheet.contains("1st Gear - Shift: 7200 RPM | NOS: OFF"));
    }
}
