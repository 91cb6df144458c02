/*
 * Responsibility
 * - Movies request/response DTOs
 * - validate() turns loosely-typed input into checked values (422 on failure)
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repos::movie_repo::MovieRow;

// ISO first; the month-first form is what existing clients send.
const RELEASE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m-%d-%Y"];

pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    RELEASE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> Result<(&str, NaiveDate), &'static str> {
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or("title is required")?;
        let release_date = self
            .release_date
            .as_deref()
            .ok_or("release_date is required")
            .and_then(|d| parse_release_date(d).ok_or("release_date is not a date"))?;

        Ok((title, release_date))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
}

impl UpdateMovieRequest {
    pub fn validate(&self) -> Result<(Option<&str>, Option<NaiveDate>), &'static str> {
        if self.title.is_none() && self.release_date.is_none() {
            return Err("nothing to update");
        }
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }
        let release_date = match &self.release_date {
            Some(d) => Some(parse_release_date(d).ok_or("release_date is not a date")?),
            None => None,
        };

        Ok((self.title.as_deref(), release_date))
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: i32,
    pub title: String,
    pub release_date: NaiveDate,
}

impl From<MovieRow> for MovieResponse {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListEnvelope {
    pub success: bool,
    pub movies: Vec<MovieResponse>,
}

#[derive(Debug, Serialize)]
pub struct MovieEnvelope {
    pub success: bool,
    pub movie: MovieResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_date_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2009, 10, 19).unwrap();
        assert_eq!(parse_release_date("2009-10-19"), Some(expected));
        assert_eq!(parse_release_date("10-19-2009"), Some(expected));
        assert_eq!(parse_release_date("19/10/2009"), None);
    }

    #[test]
    fn create_requires_both_fields() {
        let req = CreateMovieRequest {
            title: Some("Anansi Boys".into()),
            release_date: None,
        };
        assert_eq!(req.validate(), Err("release_date is required"));

        let req = CreateMovieRequest {
            title: Some("  ".into()),
            release_date: Some("2009-10-19".into()),
        };
        assert_eq!(req.validate(), Err("title is required"));
    }

    #[test]
    fn update_accepts_partial_input() {
        let req: UpdateMovieRequest = serde_json::from_str(r#"{"title": "Coraline"}"#).unwrap();
        assert_eq!(req.validate(), Ok((Some("Coraline"), None)));

        let req: UpdateMovieRequest = serde_json::from_str(r#"{"name": "ignored"}"#).unwrap();
        assert_eq!(req.validate(), Err("nothing to update"));

        let req: UpdateMovieRequest =
            serde_json::from_str(r#"{"release_date": "not a date"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
