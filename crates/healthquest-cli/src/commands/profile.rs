//! Body metrics calculators.

use clap::Subcommand;
use healthquest_core::profile::{calculate_bmi, daily_calorie_needs};
use healthquest_core::{ActivityLevel, BmiCategory, BodyProfile, Gender};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Body mass index and category
    Bmi {
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
        /// Height in centimetres
        #[arg(long)]
        height: f64,
    },

    /// Estimated daily calorie needs
    Calories {
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
        /// Height in centimetres
        #[arg(long)]
        height: f64,
        /// Age in years
        #[arg(long)]
        age: u32,
        /// male, female or other
        #[arg(long)]
        gender: Gender,
        /// sedentary, lightly-active, moderately-active, very-active or extremely-active
        #[arg(long, default_value = "sedentary")]
        activity: ActivityLevel,
    },
}

pub fn run(action: ProfileAction) -> CmdResult {
    match action {
        ProfileAction::Bmi { weight, height } => {
            let bmi = calculate_bmi(weight, height)?;
            println!("BMI: {bmi:.1} ({})", BmiCategory::from_bmi(bmi).label());
        }
        ProfileAction::Calories {
            weight,
            height,
            age,
            gender,
            activity,
        } => {
            let profile = BodyProfile {
                weight_kg: weight,
                height_cm: height,
                age,
                gender,
                activity_level: activity,
            };
            println!("{} kcal/day", daily_calorie_needs(&profile)?);
        }
    }
    Ok(())
}
