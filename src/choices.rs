//! Enumerated text columns.
//!
//! Stored as their snake_case name in `TEXT` columns; rows keep the raw string
//! and these types validate input and provide display labels.

use std::{fmt, str::FromStr};

macro_rules! choices {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($value:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Human label for a stored value, falling back to the raw value.
            pub fn label_for(raw: &str) -> String {
                raw.parse::<$name>()
                    .map(|c| c.label().to_string())
                    .unwrap_or_else(|_| raw.to_string())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownChoice(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice")]
pub struct UnknownChoice(pub String);

choices! {
    pub enum GoalType {
        WeightLoss => ("weight_loss", "Weight loss"),
        MuscleGain => ("muscle_gain", "Muscle gain"),
        Endurance => ("endurance", "Endurance"),
        Strength => ("strength", "Strength"),
        Flexibility => ("flexibility", "Flexibility"),
        GeneralFitness => ("general_fitness", "General fitness"),
    }
}

choices! {
    pub enum Metric {
        WeightKg => ("weight_kg", "Weight (kg)"),
        WaistCm => ("waist_cm", "Waist (cm)"),
        HipCm => ("hip_cm", "Hip (cm)"),
        NeckCm => ("neck_cm", "Neck (cm)"),
        ArmCircumferenceCm => ("arm_circumference_cm", "Arm circumference (cm)"),
        ThighCircumferenceCm => ("thigh_circumference_cm", "Thigh circumference (cm)"),
        CalfCircumferenceCm => ("calf_circumference_cm", "Calf circumference (cm)"),
        BodyFatPercentage => ("body_fat_percentage", "Body fat (%)"),
        MuscleMassPercentage => ("muscle_mass_percentage", "Muscle mass (%)"),
        BmiValue => ("bmi_value", "BMI"),
    }
}

choices! {
    pub enum MeasurementType {
        Target => ("target", "Target"),
        Baseline => ("baseline", "Baseline"),
        Log => ("log", "Log"),
    }
}

choices! {
    pub enum MealType {
        Breakfast => ("breakfast", "Breakfast"),
        Lunch => ("lunch", "Lunch"),
        Dinner => ("dinner", "Dinner"),
        Snack => ("snack", "Snack"),
        Regular => ("regular", "Regular"),
    }
}

choices! {
    pub enum RecurrenceType {
        Never => ("none", "No recurrence"),
        Daily => ("daily", "Daily"),
        Weekly => ("weekly", "Weekly"),
        Monthly => ("monthly", "Monthly"),
    }
}

choices! {
    pub enum PreferenceType {
        Love => ("love", "Love"),
        Like => ("like", "Like"),
        Dislike => ("dislike", "Dislike"),
        Hate => ("hate", "Hate"),
        Restriction => ("restriction", "Restriction"),
        Allergy => ("allergy", "Allergy"),
    }
}

impl Default for MeasurementType {
    fn default() -> Self {
        MeasurementType::Log
    }
}

impl Default for MealType {
    fn default() -> Self {
        MealType::Regular
    }
}

impl Default for RecurrenceType {
    fn default() -> Self {
        RecurrenceType::Never
    }
}
