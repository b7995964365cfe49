use crate::error::{AppError, Result};

/// Validates a new job posting's fields.
pub fn validate_job(
    title: &str,
    description: &str,
    location: &str,
    category: &str,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
) -> Result<()> {
    if title.len() < 3 || title.len() > 120 {
        return Err(AppError::Validation(
            "Job title must be between 3 and 120 characters".to_string(),
        ));
    }

    if description.is_empty() || description.len() > 5000 {
        return Err(AppError::Validation(
            "Job description must be between 1 and 5000 characters".to_string(),
        ));
    }

    if location.trim().is_empty() || location.len() > 120 {
        return Err(AppError::Validation(
            "Job location must be between 1 and 120 characters".to_string(),
        ));
    }

    if category.trim().is_empty() || category.len() > 60 {
        return Err(AppError::Validation(
            "Job category must be between 1 and 60 characters".to_string(),
        ));
    }

    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            return Err(AppError::Validation(
                "Minimum salary cannot exceed maximum salary".to_string(),
            ));
        }
    }

    if salary_min.is_some_and(|s| s < 0) || salary_max.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "Salary bounds cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Validates an application's cover letter.
pub fn validate_cover_letter(cover_letter: &str) -> Result<()> {
    if cover_letter.len() > 5000 {
        return Err(AppError::Validation(
            "Cover letter must be at most 5000 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_salary_bounds() {
        assert!(validate_job("Mason", "Build walls", "Nakuru", "construction", Some(50_000), Some(30_000)).is_err());
        assert!(validate_job("Mason", "Build walls", "Nakuru", "construction", Some(30_000), Some(50_000)).is_ok());
    }

    #[test]
    fn rejects_short_title() {
        assert!(validate_job("IT", "Fix computers", "Nairobi", "it", None, None).is_err());
    }
}
