//! Catalog of known environmental variables
//!
//! Each variable is tagged with the groups it belongs to. Only variables in
//! [`GROUP_ENVIRONMENT`] carry scalar sensor readings worth smoothing; camera
//! feeds and recipe markers share the namespace but are never relayed.

/// Scalar readings from environment sensors and actuators
pub const GROUP_ENVIRONMENT: &str = "environment";
/// Image streams
pub const GROUP_CAMERA: &str = "camera";
/// Recipe bookkeeping events
pub const GROUP_RECIPE: &str = "recipe";

/// A named environmental variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub units: Option<&'static str>,
    pub groups: &'static [&'static str],
}

impl EnvVar {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| *g == group)
    }
}

const ENVIRONMENT_ONLY: &[&str] = &[GROUP_ENVIRONMENT];

const fn env(
    name: &'static str,
    description: &'static str,
    units: Option<&'static str>,
) -> EnvVar {
    EnvVar {
        name,
        description,
        units,
        groups: ENVIRONMENT_ONLY,
    }
}

/// Every variable known to the system
pub static VARIABLES: &[EnvVar] = &[
    env("air_temperature", "Temperature of the air", Some("degrees Celsius")),
    env("air_humidity", "Relative humidity of the air", Some("percent relative")),
    env("air_carbon_dioxide", "Amount of CO2 in the air", Some("ppm")),
    env("air_flush_on", "Whether the air flush fan is running", None),
    env("water_temperature", "Temperature of the water", Some("degrees Celsius")),
    env("water_level_high", "Whether the water is above the high level sensor", None),
    env("water_level_low", "Whether the water is above the low level sensor", None),
    env("water_potential_hydrogen", "pH of the water", None),
    env("water_electrical_conductivity", "Electrical conductivity of the water", Some("uS/cm")),
    env("water_oxidation_reduction_potential", "Oxidation reduction potential of the water", Some("mV")),
    env("water_dissolved_oxygen", "Dissolved oxygen in the water", Some("mg/L")),
    env("light_illuminance", "Illuminance at canopy level", Some("lux")),
    env("light_intensity_red", "Intensity of the red grow lights", None),
    env("light_intensity_blue", "Intensity of the blue grow lights", None),
    env("light_intensity_white", "Intensity of the white grow lights", None),
    env("nutrient_flora_duo_a", "Flora Duo A nutrient dosing", Some("mL")),
    env("nutrient_flora_duo_b", "Flora Duo B nutrient dosing", Some("mL")),
    EnvVar {
        name: "aerial_image",
        description: "Image from above the grow bed",
        units: None,
        groups: &[GROUP_CAMERA],
    },
    EnvVar {
        name: "frontal_image",
        description: "Image from in front of the grow bed",
        units: None,
        groups: &[GROUP_CAMERA],
    },
    EnvVar {
        name: "recipe_start",
        description: "Marks the start of a recipe",
        units: None,
        groups: &[GROUP_RECIPE],
    },
    EnvVar {
        name: "recipe_end",
        description: "Marks the end of a recipe",
        units: None,
        groups: &[GROUP_RECIPE],
    },
];

pub fn lookup(name: &str) -> Option<&'static EnvVar> {
    VARIABLES.iter().find(|var| var.name == name)
}

/// Names of all variables tagged with `group`, in catalog order
pub fn variables_in_group(group: &str) -> Vec<&'static str> {
    VARIABLES
        .iter()
        .filter(|var| var.in_group(group))
        .map(|var| var.name)
        .collect()
}

/// Names of the variables the relay smooths by default
pub fn environment_variables() -> Vec<&'static str> {
    variables_in_group(GROUP_ENVIRONMENT)
}
