use crate::error::{InputError, Result};
use crate::loan::{Calculation, LoanParameters, LoanType};
use clap::Parser;
use log::debug;
use std::ffi::OsString;

/// Minimum number of command-line tokens, not counting the program name.
pub const MIN_ARGUMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "loan-calculator")]
#[command(about = "Loan calculator")]
pub struct LoanArgs {
    #[arg(short = 't', long = "type", value_name = "TYPE", help = "Specify type of loan: diff or annuity")]
    pub loan_type: Option<String>,

    #[arg(short = 'v', long, allow_negative_numbers = true, help = "Value of loan principal")]
    pub principal: Option<f64>,

    #[arg(short = 'm', long, allow_negative_numbers = true, help = "Loan duration, in months")]
    pub periods: Option<i64>,

    #[arg(short = 'i', long, allow_negative_numbers = true, help = "Annual interest, in percent")]
    pub interest: Option<f64>,

    #[arg(short = 'p', long, allow_negative_numbers = true, help = "Value of each payment made. Annuity only")]
    pub payments: Option<f64>,
}

/// A request that passed every validation rule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanRequest {
    pub loan_type: LoanType,
    pub params: LoanParameters,
}

impl LoanArgs {
    /// Applies the validation rules in order; the first one violated is returned.
    pub fn validate(&self, supplied: usize) -> std::result::Result<LoanRequest, InputError> {
        if supplied < MIN_ARGUMENTS {
            return Err(InputError::TooFewArguments { supplied });
        }

        let loan_type: LoanType = self
            .loan_type
            .as_deref()
            .ok_or(InputError::MissingType)?
            .parse()?;

        let interest = match self.interest {
            Some(interest) if interest >= 0. => interest,
            Some(interest) if interest.is_nan() => return Err(InputError::NonFinite("interest")),
            _ => return Err(InputError::InvalidInterest),
        };
        check_finite("interest", interest)?;

        let principal = validate_amount("principal", self.principal, InputError::NegativePrincipal)?;
        let periods = validate_periods(self.periods)?;
        let payment = validate_amount("payments", self.payments, InputError::NegativePayment)?;

        if loan_type == LoanType::Differentiated && payment.is_some() {
            return Err(InputError::DiffWithPayment);
        }

        Ok(LoanRequest {
            loan_type,
            params: LoanParameters {
                principal,
                periods,
                interest,
                payment,
            },
        })
    }
}

impl LoanRequest {
    /// Picks the calculator from whichever quantity was left out.
    pub fn calculation(&self) -> std::result::Result<Calculation, InputError> {
        let LoanParameters {
            principal,
            periods,
            interest,
            payment,
        } = self.params;

        match (self.loan_type, principal, periods, payment) {
            (LoanType::Differentiated, Some(principal), Some(periods), None) => {
                Ok(Calculation::Differentiated {
                    principal,
                    periods,
                    interest,
                })
            }
            (LoanType::Differentiated, ..) => Err(InputError::DiffMissingOperands),
            (LoanType::Annuity, Some(principal), None, Some(payment)) => Ok(Calculation::Duration {
                principal,
                payment,
                interest,
            }),
            (LoanType::Annuity, Some(principal), Some(periods), None) => Ok(Calculation::Payment {
                principal,
                periods,
                interest,
            }),
            (LoanType::Annuity, None, Some(periods), Some(payment)) => Ok(Calculation::Principal {
                payment,
                periods,
                interest,
            }),
            (LoanType::Annuity, ..) => Err(InputError::AnnuityOperands),
        }
    }
}

fn check_finite(field: &'static str, value: f64) -> std::result::Result<(), InputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputError::NonFinite(field))
    }
}

fn validate_amount(
    field: &'static str,
    value: Option<f64>,
    negative: InputError,
) -> std::result::Result<Option<f64>, InputError> {
    match value {
        Some(amount) if amount < 0. => Err(negative),
        Some(amount) => check_finite(field, amount).map(|_| Some(amount)),
        None => Ok(None),
    }
}

fn validate_periods(value: Option<i64>) -> std::result::Result<Option<u32>, InputError> {
    match value {
        Some(periods) if periods < 0 => Err(InputError::NegativePeriods),
        Some(periods) => u32::try_from(periods)
            .map(Some)
            .map_err(|_| InputError::PeriodsOutOfRange),
        None => Ok(None),
    }
}

/// Parses and validates a full argument list, program name first.
pub fn parse_request<I, T>(args: I) -> Result<LoanRequest>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let parsed = LoanArgs::try_parse_from(&args)?;
    debug!("parsed arguments: {:?}", parsed);

    let request = parsed.validate(args.len().saturating_sub(1))?;
    debug!("validated request: {:?}", request);
    Ok(request)
}
