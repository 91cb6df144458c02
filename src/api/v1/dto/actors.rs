/*
 * Responsibility
 * - Actors request/response DTOs
 */
use serde::{Deserialize, Serialize};

use crate::repos::actor_repo::ActorRow;

const MAX_AGE: i32 = 150;

fn check_age(age: i32) -> Result<i32, &'static str> {
    if (0..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err("age is out of range")
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl CreateActorRequest {
    pub fn validate(&self) -> Result<(&str, i32, &str), &'static str> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or("name is required")?;
        let age = check_age(self.age.ok_or("age is required")?)?;
        let gender = self
            .gender
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or("gender is required")?;

        Ok((name, age, gender))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl UpdateActorRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_none() && self.age.is_none() && self.gender.is_none() {
            return Err("nothing to update");
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(gender) = &self.gender
            && gender.trim().is_empty()
        {
            return Err("gender cannot be empty");
        }
        if let Some(age) = self.age {
            check_age(age)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

impl From<ActorRow> for ActorResponse {
    fn from(row: ActorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorListEnvelope {
    pub success: bool,
    pub actors: Vec<ActorResponse>,
}

#[derive(Debug, Serialize)]
pub struct ActorEnvelope {
    pub success: bool,
    pub actor: ActorResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validates_every_field() {
        let ok = CreateActorRequest {
            name: Some("Emile Hirsch".into()),
            age: Some(35),
            gender: Some("male".into()),
        };
        assert_eq!(ok.validate(), Ok(("Emile Hirsch", 35, "male")));

        let no_age = CreateActorRequest { age: None, ..ok };
        assert_eq!(no_age.validate(), Err("age is required"));
    }

    #[test]
    fn update_rejects_blank_or_impossible_values() {
        let req: UpdateActorRequest = serde_json::from_str(r#"{"age": -3}"#).unwrap();
        assert_eq!(req.validate(), Err("age is out of range"));

        let req: UpdateActorRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(req.validate(), Err("name cannot be empty"));

        let req: UpdateActorRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.validate(), Err("nothing to update"));
    }
}
