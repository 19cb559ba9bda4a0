//! Species catalog: static reference data, compiled in, never mutated.
//!
//! Only three species carry full data today. The remaining ids are
//! uncatalogued placeholders holding their names only; callers must check
//! `SpeciesData::is_catalogued()` before simulating them.

use crate::reptile::LifeStage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesId {
    PogonaVitticeps,
    LeopardGecko,
    CornSnake,
    BallPython,
    BlueTongueSkink,
    BeardedDragonGerman,
    CrestedGecko,
    RedEaredSlider,
    HermannTortoise,
    IguanaIguana,
}

impl SpeciesId {
    pub const ALL: [SpeciesId; 10] = [
        SpeciesId::PogonaVitticeps,
        SpeciesId::LeopardGecko,
        SpeciesId::CornSnake,
        SpeciesId::BallPython,
        SpeciesId::BlueTongueSkink,
        SpeciesId::BeardedDragonGerman,
        SpeciesId::CrestedGecko,
        SpeciesId::RedEaredSlider,
        SpeciesId::HermannTortoise,
        SpeciesId::IguanaIguana,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    Crickets,
    Mealworms,
    DubiaRoaches,
    Waxworms,
    FrozenMicePinkie,
    FrozenMiceFuzzy,
    FrozenMiceAdult,
    LeafyGreens,
    Vegetables,
    Fruits,
    CalciumSupplement,
    D3Supplement,
    Multivitamin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentProfile {
    pub temp_day_min:       f32,
    pub temp_day_max:       f32,
    pub temp_night_min:     f32,
    pub temp_night_max:     f32,
    pub humidity_min:       f32,
    pub humidity_max:       f32,
    pub uvb_min:            u8,
    pub uvb_max:            u8,
    pub photoperiod_summer: u16,
    pub photoperiod_winter: u16,
    /// Minimum enclosure length × width × height, centimetres.
    pub enclosure_min_cm:   (u32, u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiologyProfile {
    pub adult_mass_min_g:       u16,
    pub adult_mass_max_g:       u16,
    pub adult_length_min_mm:    u16,
    pub adult_length_max_mm:    u16,
    pub lifespan_years:         u16,
    pub sexual_maturity_months: u16,
    pub clutch_size_min:        u8,
    pub clutch_size_max:        u8,
    pub incubation_days:        u16,
    pub incubation_temp_c:      f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DietProfile {
    pub is_carnivore:         bool,
    pub is_herbivore:         bool,
    pub is_insectivore:       bool,
    /// Days between meals for egg, hatchling and juvenile stages.
    pub feeding_days_juvenile: u8,
    /// Days between meals from sub-adult on.
    pub feeding_days_adult:   u8,
    /// At most `MAX_PREFERRED_FOODS` entries.
    pub preferred_foods:      &'static [FoodType],
    pub needs_calcium:        bool,
    pub needs_d3:             bool,
}

pub const MAX_PREFERRED_FOODS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct LegalStatus {
    pub requires_capacity_certificate: bool,
    pub requires_authorization:        bool,
    pub cites_appendix:                &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesData {
    pub id:               SpeciesId,
    pub scientific_name:  &'static str,
    pub common_name_en:   &'static str,
    pub common_name_fr:   &'static str,
    pub environment:      EnvironmentProfile,
    pub biology:          BiologyProfile,
    pub diet:             DietProfile,
    /// 1 = easy … 5 = expert. 0 on uncatalogued placeholders.
    pub difficulty:       u8,
    pub legal:            LegalStatus,
}

impl SpeciesData {
    pub fn is_catalogued(&self) -> bool {
        self.difficulty > 0
    }

    pub fn accepts(&self, food: FoodType) -> bool {
        self.diet.preferred_foods.contains(&food)
    }

    pub fn feeding_interval_days(&self, stage: LifeStage) -> u8 {
        match stage {
            LifeStage::Egg | LifeStage::Hatchling | LifeStage::Juvenile => {
                self.diet.feeding_days_juvenile
            }
            _ => self.diet.feeding_days_adult,
        }
    }

    pub fn photoperiod(&self, season: Season) -> u16 {
        match season {
            Season::Summer => self.environment.photoperiod_summer,
            Season::Winter => self.environment.photoperiod_winter,
        }
    }

    /// Minimum enclosure volume in litres.
    pub fn min_enclosure_volume_l(&self) -> u32 {
        let (l, w, h) = self.environment.enclosure_min_cm;
        l * w * h / 1000
    }

    pub fn maturity_days(&self) -> u32 {
        self.biology.sexual_maturity_months as u32 * 30
    }

    pub fn lifespan_days(&self) -> u32 {
        self.biology.lifespan_years as u32 * 365
    }

    const fn uncatalogued(
        id: SpeciesId,
        scientific_name: &'static str,
        common_name_en: &'static str,
        common_name_fr: &'static str,
    ) -> Self {
        Self {
            id,
            scientific_name,
            common_name_en,
            common_name_fr,
            environment: EnvironmentProfile {
                temp_day_min: 0.0, temp_day_max: 0.0,
                temp_night_min: 0.0, temp_night_max: 0.0,
                humidity_min: 0.0, humidity_max: 0.0,
                uvb_min: 0, uvb_max: 0,
                photoperiod_summer: 0, photoperiod_winter: 0,
                enclosure_min_cm: (0, 0, 0),
            },
            biology: BiologyProfile {
                adult_mass_min_g: 0, adult_mass_max_g: 0,
                adult_length_min_mm: 0, adult_length_max_mm: 0,
                lifespan_years: 0, sexual_maturity_months: 0,
                clutch_size_min: 0, clutch_size_max: 0,
                incubation_days: 0, incubation_temp_c: 0.0,
            },
            diet: DietProfile {
                is_carnivore: false, is_herbivore: false, is_insectivore: false,
                feeding_days_juvenile: 0, feeding_days_adult: 0,
                preferred_foods: &[],
                needs_calcium: false, needs_d3: false,
            },
            difficulty: 0,
            legal: LegalStatus {
                requires_capacity_certificate: false,
                requires_authorization: false,
                cites_appendix: "",
            },
        }
    }
}

use FoodType::*;

/// Indexed by `SpeciesId as usize`.
static CATALOG: [SpeciesData; 10] = [
    SpeciesData {
        id: SpeciesId::PogonaVitticeps,
        scientific_name: "Pogona vitticeps",
        common_name_en: "Central Bearded Dragon",
        common_name_fr: "Dragon barbu central",
        environment: EnvironmentProfile {
            temp_day_min: 35.0, temp_day_max: 42.0,
            temp_night_min: 20.0, temp_night_max: 25.0,
            humidity_min: 30.0, humidity_max: 40.0,
            uvb_min: 10, uvb_max: 12,
            photoperiod_summer: 14, photoperiod_winter: 10,
            enclosure_min_cm: (120, 60, 60),
        },
        biology: BiologyProfile {
            adult_mass_min_g: 300, adult_mass_max_g: 600,
            adult_length_min_mm: 400, adult_length_max_mm: 600,
            lifespan_years: 12, sexual_maturity_months: 12,
            clutch_size_min: 15, clutch_size_max: 30,
            incubation_days: 65, incubation_temp_c: 29.0,
        },
        diet: DietProfile {
            is_carnivore: true, is_herbivore: true, is_insectivore: true,
            feeding_days_juvenile: 1, feeding_days_adult: 2,
            preferred_foods: &[Crickets, DubiaRoaches, LeafyGreens, Vegetables, Fruits],
            needs_calcium: true, needs_d3: true,
        },
        difficulty: 2,
        legal: LegalStatus {
            requires_capacity_certificate: false,
            requires_authorization: false,
            cites_appendix: "Not listed",
        },
    },
    SpeciesData {
        id: SpeciesId::LeopardGecko,
        scientific_name: "Eublepharis macularius",
        common_name_en: "Leopard Gecko",
        common_name_fr: "Gecko léopard",
        environment: EnvironmentProfile {
            temp_day_min: 28.0, temp_day_max: 32.0,
            temp_night_min: 20.0, temp_night_max: 24.0,
            humidity_min: 30.0, humidity_max: 40.0,
            uvb_min: 2, uvb_max: 5,
            photoperiod_summer: 12, photoperiod_winter: 10,
            enclosure_min_cm: (80, 40, 40),
        },
        biology: BiologyProfile {
            adult_mass_min_g: 60, adult_mass_max_g: 110,
            adult_length_min_mm: 180, adult_length_max_mm: 250,
            lifespan_years: 20, sexual_maturity_months: 10,
            clutch_size_min: 2, clutch_size_max: 2,
            incubation_days: 52, incubation_temp_c: 27.5,
        },
        diet: DietProfile {
            is_carnivore: false, is_herbivore: false, is_insectivore: true,
            feeding_days_juvenile: 1, feeding_days_adult: 3,
            preferred_foods: &[Crickets, Mealworms, DubiaRoaches, Waxworms],
            needs_calcium: true, needs_d3: false,
        },
        difficulty: 1,
        legal: LegalStatus {
            requires_capacity_certificate: false,
            requires_authorization: false,
            cites_appendix: "Not listed",
        },
    },
    SpeciesData::uncatalogued(
        SpeciesId::CornSnake, "Pantherophis guttatus", "Corn Snake", "Serpent des blés",
    ),
    SpeciesData {
        id: SpeciesId::BallPython,
        scientific_name: "Python regius",
        common_name_en: "Ball Python",
        common_name_fr: "Python royal",
        environment: EnvironmentProfile {
            temp_day_min: 28.0, temp_day_max: 32.0,
            temp_night_min: 24.0, temp_night_max: 27.0,
            humidity_min: 50.0, humidity_max: 65.0,
            uvb_min: 0, uvb_max: 2,
            photoperiod_summer: 12, photoperiod_winter: 8,
            enclosure_min_cm: (120, 60, 60),
        },
        biology: BiologyProfile {
            adult_mass_min_g: 1000, adult_mass_max_g: 2500,
            adult_length_min_mm: 900, adult_length_max_mm: 1500,
            lifespan_years: 30, sexual_maturity_months: 36,
            clutch_size_min: 4, clutch_size_max: 10,
            incubation_days: 55, incubation_temp_c: 31.5,
        },
        diet: DietProfile {
            is_carnivore: true, is_herbivore: false, is_insectivore: false,
            feeding_days_juvenile: 7, feeding_days_adult: 21,
            preferred_foods: &[FrozenMicePinkie, FrozenMiceFuzzy, FrozenMiceAdult],
            needs_calcium: false, needs_d3: false,
        },
        difficulty: 2,
        legal: LegalStatus {
            requires_capacity_certificate: true,
            requires_authorization: true,
            cites_appendix: "Appendix II",
        },
    },
    SpeciesData::uncatalogued(
        SpeciesId::BlueTongueSkink, "Tiliqua scincoides", "Blue-tongued Skink",
        "Scinque à langue bleue",
    ),
    SpeciesData::uncatalogued(
        SpeciesId::BeardedDragonGerman, "Pogona vitticeps", "German Giant Bearded Dragon",
        "Dragon barbu allemand",
    ),
    SpeciesData::uncatalogued(
        SpeciesId::CrestedGecko, "Correlophus ciliatus", "Crested Gecko", "Gecko à crête",
    ),
    SpeciesData::uncatalogued(
        SpeciesId::RedEaredSlider, "Trachemys scripta elegans", "Red-eared Slider",
        "Tortue de Floride",
    ),
    SpeciesData::uncatalogued(
        SpeciesId::HermannTortoise, "Testudo hermanni", "Hermann's Tortoise",
        "Tortue d'Hermann",
    ),
    SpeciesData::uncatalogued(
        SpeciesId::IguanaIguana, "Iguana iguana", "Green Iguana", "Iguane vert",
    ),
];

/// Reference record for `id`. Total over the closed id set.
pub fn get_species_data(id: SpeciesId) -> &'static SpeciesData {
    &CATALOG[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_id() {
        for id in SpeciesId::ALL {
            assert_eq!(get_species_data(id).id, id);
        }
    }

    #[test]
    fn exactly_three_species_are_catalogued() {
        let catalogued: Vec<SpeciesId> = SpeciesId::ALL
            .into_iter()
            .filter(|id| get_species_data(*id).is_catalogued())
            .collect();
        assert_eq!(
            catalogued,
            vec![SpeciesId::PogonaVitticeps, SpeciesId::LeopardGecko, SpeciesId::BallPython]
        );
    }

    #[test]
    fn preferred_food_lists_fit_the_record() {
        for id in SpeciesId::ALL {
            assert!(get_species_data(id).diet.preferred_foods.len() <= MAX_PREFERRED_FOODS);
        }
    }

    #[test]
    fn python_does_not_accept_insects() {
        let python = get_species_data(SpeciesId::BallPython);
        assert!(!python.accepts(FoodType::Crickets));
        assert!(python.accepts(FoodType::FrozenMiceFuzzy));
    }

    #[test]
    fn feeding_interval_follows_life_stage() {
        let python = get_species_data(SpeciesId::BallPython);
        assert_eq!(python.feeding_interval_days(LifeStage::Hatchling), 7);
        assert_eq!(python.feeding_interval_days(LifeStage::Adult), 21);
        assert_eq!(python.min_enclosure_volume_l(), 432);
        assert_eq!(python.photoperiod(Season::Winter), 8);
    }
}
