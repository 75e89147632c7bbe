use thiserror::Error;

/// Rejections raised while validating command-line parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("fewer than 4 arguments filled ({supplied} given)")]
    TooFewArguments { supplied: usize },

    #[error("no type")]
    MissingType,

    #[error("unknown type '{0}', expected diff or annuity")]
    UnknownType(String),

    #[error("missing or negative interest")]
    InvalidInterest,

    #[error("negative principal")]
    NegativePrincipal,

    #[error("negative periods")]
    NegativePeriods,

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("periods out of range")]
    PeriodsOutOfRange,

    #[error("negative payments")]
    NegativePayment,

    #[error("diff/payments illegal combo")]
    DiffWithPayment,

    #[error("diff loan needs principal and periods")]
    DiffMissingOperands,

    #[error("annuity loan needs exactly one of principal, periods, payments left out")]
    AnnuityOperands,
}

/// Inputs that pass validation but fall outside a formula's domain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("payment {payment} does not exceed the monthly interest {interest} on the principal")]
    PaymentBelowInterest { payment: f64, interest: f64 },

    #[error("annuity formulas are undefined for a zero interest rate")]
    ZeroInterest,

    #[error("loan must run for at least one period")]
    ZeroPeriods,

    #[error("{quantity} is not a finite number")]
    NotFinite { quantity: &'static str },
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("Incorrect parameters: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Cannot calculate loan: {0}")]
    Domain(#[from] DomainError),
}

pub type Result<T> = std::result::Result<T, LoanError>;
