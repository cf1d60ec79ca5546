use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::{require_non_blank, validate_non_negative, validate_positive};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    #[serde(alias = "cachorro", alias = "cao")]
    Dog,
    #[serde(alias = "gato")]
    Cat,
    #[serde(alias = "ave", alias = "passaro")]
    Bird,
    #[serde(alias = "roedor")]
    Rodent,
    #[serde(alias = "reptil")]
    Reptile,
    #[serde(alias = "outro")]
    Other,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Dog => write!(f, "dog"),
            Species::Cat => write!(f, "cat"),
            Species::Bird => write!(f, "bird"),
            Species::Rodent => write!(f, "rodent"),
            Species::Reptile => write!(f, "reptile"),
            Species::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: i32,
    pub weight: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: i32,
    pub weight: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

impl Pet {
    pub fn from_request(owner_id: Uuid, request: CreatePetRequest) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let pet = Self {
            id: Uuid::new_v4(),
            owner_id,
            name: request.name,
            species: request.species,
            breed: request.breed,
            age: request.age,
            weight: request.weight,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        pet.validate()?;
        Ok(pet)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        validate_non_negative("age", self.age)?;
        validate_positive("weight", self.weight)?;
        Ok(())
    }

    /// Returns the updated pet without touching `self` when validation fails.
    pub fn with_update(&self, update: UpdatePetRequest) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name;
        }
        if let Some(species) = update.species {
            next.species = species;
        }
        if let Some(breed) = update.breed {
            next.breed = breed;
        }
        if let Some(age) = update.age {
            next.age = age;
        }
        if let Some(weight) = update.weight {
            next.weight = weight;
        }
        if update.notes.is_some() {
            next.notes = update.notes;
        }
        next.validate()?;
        next.updated_at = Utc::now();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePetRequest {
        CreatePetRequest {
            name: "Thor".into(),
            species: Species::Dog,
            breed: "Labrador".into(),
            age: 4,
            weight: 28.5,
            notes: None,
        }
    }

    #[test]
    fn test_pet_from_valid_request() {
        let owner = Uuid::new_v4();
        let pet = Pet::from_request(owner, request()).unwrap();
        assert_eq!(pet.owner_id, owner);
        assert_eq!(pet.species, Species::Dog);
    }

    #[test]
    fn test_pet_rejects_negative_age_and_non_positive_weight() {
        let err = Pet::from_request(Uuid::new_v4(), CreatePetRequest { age: -1, ..request() }).unwrap_err();
        assert_eq!(err.field, "age");

        let err = Pet::from_request(Uuid::new_v4(), CreatePetRequest { weight: 0.0, ..request() }).unwrap_err();
        assert_eq!(err.field, "weight");
    }

    #[test]
    fn test_species_is_closed_and_accepts_legacy_labels() {
        let species: Species = serde_json::from_str("\"gato\"").unwrap();
        assert_eq!(species, Species::Cat);
        assert!(serde_json::from_str::<Species>("\"dragon\"").is_err());
    }

    #[test]
    fn test_update_is_validated() {
        let pet = Pet::from_request(Uuid::new_v4(), request()).unwrap();
        let updated = pet
            .with_update(UpdatePetRequest { weight: Some(30.0), ..UpdatePetRequest::default() })
            .unwrap();
        assert_eq!(updated.weight, 30.0);

        assert!(pet
            .with_update(UpdatePetRequest { weight: Some(-2.0), ..UpdatePetRequest::default() })
            .is_err());
    }
}
