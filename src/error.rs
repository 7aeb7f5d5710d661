use thiserror::Error;

/// Errors raised before any optimization or simulation work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A forecast, plan, tank or bound value is out of range or mismatched.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The optimizer settings leave nothing to search.
    #[error("degenerate configuration: {0}")]
    DegenerateConfiguration(String),
}

impl PlanError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlanError::InvalidInput(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        PlanError::DegenerateConfiguration(msg.into())
    }

    /// Reject a plan whose length differs from the forecast horizon.
    pub(crate) fn check_horizon(forecast_days: usize, plan_days: usize) -> Result<(), Self> {
        if forecast_days != plan_days {
            return Err(PlanError::invalid(format!(
                "forecast has {forecast_days} days but usage plan has {plan_days}"
            )));
        }
        Ok(())
    }
}
