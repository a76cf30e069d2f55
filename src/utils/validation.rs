//! Validation utilities

use bigdecimal::BigDecimal;

use crate::config::DepositPolicy;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> DepositResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(DepositError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: &BigDecimal) -> DepositResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(DepositError::Validation(
            "Amount cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate a lease, tenant, or property reference
pub fn validate_reference_id(field: &str, value: &str) -> DepositResult<()> {
    if value.trim().is_empty() {
        return Err(DepositError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }

    if value.len() > 64 {
        return Err(DepositError::Validation(format!(
            "{} cannot exceed 64 characters",
            field
        )));
    }

    Ok(())
}

/// Validate that a deduction description is valid
pub fn validate_description(description: &str, max_length: usize) -> DepositResult<()> {
    if description.trim().is_empty() {
        return Err(DepositError::Validation(
            "Deduction description cannot be empty".to_string(),
        ));
    }

    if description.trim().chars().count() > max_length {
        return Err(DepositError::Validation(format!(
            "Deduction description cannot exceed {} characters",
            max_length
        )));
    }

    Ok(())
}

/// Trim optional notes, treating blank notes as absent
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string)
}

/// Validate optional notes, after trimming, against a length limit
pub fn validate_notes(notes: Option<&str>, max_length: usize) -> DepositResult<()> {
    match normalize_notes(notes) {
        Some(notes) if notes.chars().count() > max_length => Err(DepositError::Validation(
            format!("Notes cannot exceed {} characters", max_length),
        )),
        _ => Ok(()),
    }
}

/// Validate the fields of a deduction request
pub fn validate_deduction_request(
    request: &AddDeductionRequest,
    policy: &DepositPolicy,
) -> DepositResult<()> {
    validate_positive_amount(&request.amount)?;
    validate_description(&request.description, policy.max_description_length)?;
    validate_notes(request.notes.as_deref(), policy.max_notes_length)?;

    if let Some(receipt) = &request.receipt {
        if receipt.trim().is_empty() {
            return Err(DepositError::Validation(
                "Receipt reference cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validate the parameters of a new deposit
pub fn validate_new_deposit(params: &NewDeposit) -> DepositResult<()> {
    validate_reference_id("Lease ID", &params.lease_id)?;
    validate_reference_id("Tenant ID", &params.tenant_id)?;
    validate_reference_id("Property ID", &params.property_id)?;
    validate_positive_amount(&params.amount)?;

    if let Some(interest) = &params.interest_accrued {
        validate_non_negative_amount(interest)?;
    }

    if !params.status.is_initial() {
        return Err(DepositError::Validation(format!(
            "A deposit cannot be created with status '{}'",
            params.status
        )));
    }

    Ok(())
}
