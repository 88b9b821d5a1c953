use model_compare_core::{CoreError, Result};

pub(crate) fn ensure_finite(test: &str, values: &[f64]) -> Result<()> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(CoreError::InvalidInput(format!(
            "{} received a non-finite value ({})",
            test, bad
        )));
    }
    Ok(())
}

pub(crate) fn ensure_len(test: &str, values: &[f64], min: usize) -> Result<()> {
    if values.len() < min {
        return Err(CoreError::InsufficientData(format!(
            "{} needs at least {} observations, got {}",
            test,
            min,
            values.len()
        )));
    }
    Ok(())
}

/// At least `min_groups` groups, each with `min_obs` finite observations.
pub(crate) fn ensure_groups(
    test: &str,
    groups: &[&[f64]],
    min_groups: usize,
    min_obs: usize,
) -> Result<()> {
    if groups.len() < min_groups {
        return Err(CoreError::InsufficientData(format!(
            "{} needs at least {} groups, got {}",
            test,
            min_groups,
            groups.len()
        )));
    }
    for group in groups {
        ensure_len(test, group, min_obs)?;
        ensure_finite(test, group)?;
    }
    Ok(())
}
