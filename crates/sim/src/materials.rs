//! Material properties by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{MassDensity, SpecificHeatCapacity, ThermalConductivity},
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
};

/// Bulk thermal properties of a solid.
///
/// Quantities serialize as plain numbers in SI base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Material {
    pub density: MassDensity,
    pub specific_heat: SpecificHeatCapacity,
    pub conductivity: ThermalConductivity,
}

impl Material {
    /// Creates a material from values in kg/m³, J/(kg·K) and W/(m·K).
    #[must_use]
    pub fn from_si(density: f64, specific_heat: f64, conductivity: f64) -> Self {
        Self {
            density: MassDensity::new::<kilogram_per_cubic_meter>(density),
            specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(specific_heat),
            conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(conductivity),
        }
    }

    /// Returns `ρ·c`, in J/(m³·K).
    #[must_use]
    pub fn volumetric_heat_capacity(&self) -> f64 {
        (self.density * self.specific_heat).value
    }

    /// Returns the conductivity in W/(m·K).
    #[must_use]
    pub fn conductivity_si(&self) -> f64 {
        self.conductivity.get::<watt_per_meter_kelvin>()
    }
}

/// A set of named materials.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, Material>,
}

impl MaterialLibrary {
    /// Returns an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the library of common package materials.
    #[must_use]
    pub fn standard() -> Self {
        [
            ("Si", Material::from_si(2330.0, 703.0, 125.52)),
            ("Cu", Material::from_si(8940.0, 385.0, 397.48)),
            ("Resin epoxy", Material::from_si(1500.0, 900.0, 1.0)),
            ("Solder", Material::from_si(8500.0, 197.0, 50.208)),
            ("Aluminium", Material::from_si(2698.0, 921.0, 225.94)),
            ("Aluminium Silicate", Material::from_si(3200.0, 766.0, 6.276)),
            ("FR-4 epoxy", Material::from_si(1900.0, 1100.0, 0.3)),
            ("SiO2", Material::from_si(2270.0, 680.0, 1.3)),
        ]
        .into_iter()
        .fold(Self::new(), |library, (name, material)| library.with(name, material))
    }

    /// Adds or replaces a material, returning the library.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, material: Material) -> Self {
        self.insert(name, material);
        self
    }

    /// Adds or replaces a material.
    pub fn insert(&mut self, name: impl Into<String>, material: Material) -> Option<Material> {
        self.materials.insert(name.into(), material)
    }

    /// Adds every material of `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &MaterialLibrary) {
        self.materials
            .extend(other.materials.iter().map(|(k, v)| (k.clone(), *v)));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Iterates over material names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
