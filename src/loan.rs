use crate::error::{DomainError, InputError};
use log::{debug, info, trace};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoanType {
    Differentiated,
    Annuity,
}

impl FromStr for LoanType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diff" => Ok(LoanType::Differentiated),
            "annuity" => Ok(LoanType::Annuity),
            other => Err(InputError::UnknownType(other.to_string())),
        }
    }
}

/// Validated numeric inputs. Absent fields are the quantity to solve for.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanParameters {
    pub principal: Option<f64>,
    pub periods: Option<u32>,
    pub interest: f64,
    pub payment: Option<f64>,
}

/// One calculator together with exactly the operands it needs.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Calculation {
    Differentiated {
        principal: f64,
        periods: u32,
        interest: f64,
    },
    Duration {
        principal: f64,
        payment: f64,
        interest: f64,
    },
    Payment {
        principal: f64,
        periods: u32,
        interest: f64,
    },
    Principal {
        payment: f64,
        periods: u32,
        interest: f64,
    },
}

impl Calculation {
    pub fn run(&self) -> Result<LoanReport, DomainError> {
        match *self {
            Calculation::Differentiated {
                principal,
                periods,
                interest,
            } => {
                info!("calculating differentiated schedule over {} months", periods);
                differentiated_schedule(principal, periods, interest).map(LoanReport::Differentiated)
            }
            Calculation::Duration {
                principal,
                payment,
                interest,
            } => {
                info!("calculating annuity duration");
                loan_duration(principal, payment, interest).map(LoanReport::Duration)
            }
            Calculation::Payment {
                principal,
                periods,
                interest,
            } => {
                info!("calculating annuity payment");
                annuity_payment(principal, periods, interest).map(LoanReport::Payment)
            }
            Calculation::Principal {
                payment,
                periods,
                interest,
            } => {
                info!("calculating loan principal");
                loan_principal(payment, periods, interest).map(LoanReport::Principal)
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyPayment {
    pub month: u32,
    pub amount: f64,
}

impl MonthlyPayment {
    pub fn new(month: u32, amount: f64) -> Self {
        Self { month, amount }
    }
}

impl fmt::Display for MonthlyPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Month {}: payment is {}", self.month, self.amount)
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifferentiatedSchedule {
    pub principal: f64,
    pub payments: Vec<MonthlyPayment>,
    pub overpayment: f64,
}

impl DifferentiatedSchedule {
    pub fn total_paid(&self) -> f64 {
        self.payments.iter().map(|pmt| pmt.amount).sum()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanDuration {
    pub months: u32,
    pub overpayment: f64,
}

impl LoanDuration {
    pub fn phrase(&self) -> DurationPhrase {
        DurationPhrase::new(self.months)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnuityPayment {
    pub payment: f64,
    pub overpayment: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanPrincipal {
    pub principal: f64,
    pub overpayment: f64,
}

/// Result of a single calculator run, rendered for the console by `Display`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoanReport {
    Differentiated(DifferentiatedSchedule),
    Duration(LoanDuration),
    Payment(AnnuityPayment),
    Principal(LoanPrincipal),
}

impl LoanReport {
    pub fn overpayment(&self) -> f64 {
        match self {
            LoanReport::Differentiated(schedule) => schedule.overpayment,
            LoanReport::Duration(duration) => duration.overpayment,
            LoanReport::Payment(payment) => payment.overpayment,
            LoanReport::Principal(principal) => principal.overpayment,
        }
    }
}

impl fmt::Display for LoanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // whole-unit amounts print bare, real amounts keep their fraction ("52000.0")
        match self {
            LoanReport::Differentiated(schedule) => {
                for pmt in &schedule.payments {
                    writeln!(f, "{}", pmt)?;
                }
                write!(f, "\nOverpayment = {}", schedule.overpayment)
            }
            LoanReport::Duration(duration) => {
                writeln!(f, "It will take{} to repay this loan!", duration.phrase())?;
                write!(f, "\nOverpayment = {:?}", duration.overpayment)
            }
            LoanReport::Payment(payment) => {
                writeln!(f, "Your monthly payment = {}!", payment.payment)?;
                write!(f, "\nOverpayment = {:?}", payment.overpayment)
            }
            LoanReport::Principal(principal) => {
                writeln!(f, "Your loan principal = {:?}!", principal.principal)?;
                write!(f, "\nOverpayment = {:?}", principal.overpayment)
            }
        }
    }
}

/// Years, conjunction and months of a duration such as " 2 years and 1 month".
///
/// Any non-empty phrase starts with a single space so it can follow "It will take".
#[derive(Clone, PartialEq, Debug)]
pub struct DurationPhrase {
    pub years: String,
    pub conjunction: &'static str,
    pub months: String,
}

impl DurationPhrase {
    pub fn new(total_months: u32) -> Self {
        let years = total_months / 12;
        let months = total_months % 12;

        let years_phrase = match (years, months) {
            (0, 0) => String::new(),
            (0, _) => " ".to_string(),
            (1, _) => " 1 year".to_string(),
            (n, _) => format!(" {} years", n),
        };

        let months_phrase = match months {
            0 => String::new(),
            1 => "1 month".to_string(),
            n => format!("{} months", n),
        };

        let conjunction = if years > 0 && months > 0 { " and " } else { "" };

        Self {
            years: years_phrase,
            conjunction,
            months: months_phrase,
        }
    }

    pub fn parts(&self) -> (&str, &str, &str) {
        (&self.years, self.conjunction, &self.months)
    }
}

impl fmt::Display for DurationPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.years, self.conjunction, self.months)
    }
}

/// Monthly rate from an annual percentage.
pub fn nominal_interest(interest: f64) -> f64 {
    (interest / 100.) / 12.
}

// i * (1 + i)^n / ((1 + i)^n - 1), or i / (1 - (1 + i)^-n) once (1 + i)^n overflows
fn annuity_ratio(rate: f64, periods: u32) -> Result<f64, DomainError> {
    if periods == 0 {
        return Err(DomainError::ZeroPeriods);
    }
    if rate == 0. {
        return Err(DomainError::ZeroInterest);
    }

    let factor = (1. + rate).powf(f64::from(periods));
    let ratio = if factor.is_finite() {
        (rate * factor) / (factor - 1.)
    } else {
        rate / (1. - (1. + rate).powf(-f64::from(periods)))
    };
    debug!("annuity ratio {} for rate {} over {} periods", ratio, rate, periods);

    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(DomainError::NotFinite {
            quantity: "annuity ratio",
        })
    }
}

/// Payments for a loan repaying equal principal each month plus interest on
/// the outstanding balance. Each payment is rounded up before it is summed;
/// the overpayment is truncated toward zero.
pub fn differentiated_schedule(
    principal: f64,
    periods: u32,
    interest: f64,
) -> Result<DifferentiatedSchedule, DomainError> {
    if periods == 0 {
        return Err(DomainError::ZeroPeriods);
    }

    let rate = nominal_interest(interest);
    let term = f64::from(periods);
    let mut payments = Vec::new();
    let mut total_paid = 0.;

    for month in 1..=periods {
        let repaid = (principal * f64::from(month - 1)) / term;
        let amount = (principal / term + rate * (principal - repaid)).ceil();
        trace!("month {}, repaid {}, payment {}", month, repaid, amount);

        total_paid += amount;
        payments.push(MonthlyPayment::new(month, amount));
    }

    let overpayment = (total_paid - principal).trunc();
    if !overpayment.is_finite() {
        return Err(DomainError::NotFinite {
            quantity: "overpayment",
        });
    }

    Ok(DifferentiatedSchedule {
        principal,
        payments,
        overpayment,
    })
}

/// Months needed to repay `principal` at a fixed `payment`, rounded up.
pub fn loan_duration(
    principal: f64,
    payment: f64,
    interest: f64,
) -> Result<LoanDuration, DomainError> {
    let rate = nominal_interest(interest);
    if rate == 0. {
        return Err(DomainError::ZeroInterest);
    }

    // the payment has to outgrow the first month's interest or the log is undefined
    let accrued = rate * principal;
    if payment <= accrued {
        return Err(DomainError::PaymentBelowInterest {
            payment,
            interest: accrued,
        });
    }

    let months = ((payment / (payment - accrued)).ln() / (1. + rate).ln()).ceil();
    debug!("duration of {} months at rate {}", months, rate);
    if !months.is_finite() || months > f64::from(u32::MAX) {
        return Err(DomainError::NotFinite {
            quantity: "duration",
        });
    }
    let months = months as u32;

    Ok(LoanDuration {
        months,
        overpayment: payment * f64::from(months) - principal,
    })
}

/// Fixed monthly payment for an annuity, rounded up to a whole unit.
pub fn annuity_payment(
    principal: f64,
    periods: u32,
    interest: f64,
) -> Result<AnnuityPayment, DomainError> {
    let ratio = annuity_ratio(nominal_interest(interest), periods)?;
    let payment = (principal * ratio).ceil();

    Ok(AnnuityPayment {
        payment,
        overpayment: payment * f64::from(periods) - principal,
    })
}

/// Principal that a fixed payment can service. Not rounded.
pub fn loan_principal(
    payment: f64,
    periods: u32,
    interest: f64,
) -> Result<LoanPrincipal, DomainError> {
    let ratio = annuity_ratio(nominal_interest(interest), periods)?;
    let principal = payment / ratio;

    Ok(LoanPrincipal {
        principal,
        overpayment: payment * f64::from(periods) - principal,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        annuity_payment, differentiated_schedule, loan_duration, loan_principal,
        nominal_interest, Calculation, DurationPhrase, LoanReport, LoanType,
    };
    use crate::error::{DomainError, InputError};
    use test_log::test;

    #[test]
    fn test_loan_type_from_str() {
        assert_eq!("diff".parse::<LoanType>(), Ok(LoanType::Differentiated));
        assert_eq!("annuity".parse::<LoanType>(), Ok(LoanType::Annuity));
        assert_eq!(
            "mortgage".parse::<LoanType>(),
            Err(InputError::UnknownType("mortgage".to_string()))
        );
    }

    #[test]
    fn test_duration_phrase() {
        assert_eq!(DurationPhrase::new(0).parts(), ("", "", ""));
        assert_eq!(DurationPhrase::new(1).parts(), (" ", "", "1 month"));
        assert_eq!(DurationPhrase::new(12).parts(), (" 1 year", "", ""));
        assert_eq!(DurationPhrase::new(13).parts(), (" 1 year", " and ", "1 month"));
        assert_eq!(DurationPhrase::new(25).parts(), (" 2 years", " and ", "1 month"));

        assert_eq!(DurationPhrase::new(11).to_string(), " 11 months");
        assert_eq!(DurationPhrase::new(24).to_string(), " 2 years");
        assert_eq!(DurationPhrase::new(38).to_string(), " 3 years and 2 months");
    }

    #[test]
    fn test_differentiated_schedule() {
        let schedule = differentiated_schedule(1_000_000., 10, 10.).unwrap();
        let amounts: Vec<f64> = schedule.payments.iter().map(|pmt| pmt.amount).collect();

        assert_eq!(
            amounts,
            vec![
                108334., 107500., 106667., 105834., 105000., 104167., 103334., 102500., 101667.,
                100834.
            ]
        );
        assert_eq!(schedule.overpayment, 45837.);

        let schedule = differentiated_schedule(500_000., 8, 7.8).unwrap();
        assert_eq!(schedule.payments[0].amount, 65750.);
        assert_eq!(schedule.payments[7].amount, 62907.);
        assert_eq!(schedule.overpayment, 14628.);
    }

    #[test]
    fn test_differentiated_overpayment_matches_payments() {
        for (principal, periods, interest) in [
            (1_000_000., 10, 10.),
            (500_000., 8, 7.8),
            (123_456.78, 37, 3.3),
            (75_000., 240, 0.),
        ] {
            let schedule = differentiated_schedule(principal, periods, interest).unwrap();
            assert_eq!(schedule.payments.len(), periods as usize);
            assert_eq!(
                schedule.overpayment,
                (schedule.total_paid() - principal).trunc()
            );
        }
    }

    #[test]
    fn test_differentiated_payments_non_increasing() {
        for (principal, periods, interest) in [
            (1_000_000., 10, 10.),
            (250_000., 360, 4.5),
            (9_999., 13, 29.9),
            (75_000., 240, 0.),
        ] {
            let schedule = differentiated_schedule(principal, periods, interest).unwrap();
            for pair in schedule.payments.windows(2) {
                assert!(
                    pair[1].amount <= pair[0].amount,
                    "month {} payment {} exceeds month {} payment {}",
                    pair[1].month,
                    pair[1].amount,
                    pair[0].month,
                    pair[0].amount
                );
            }
        }
    }

    #[test]
    fn test_differentiated_zero_periods() {
        assert_eq!(
            differentiated_schedule(1000., 0, 5.),
            Err(DomainError::ZeroPeriods)
        );
    }

    #[test]
    fn test_annuity_payment() {
        let rate = nominal_interest(10.);
        let factor = (1. + rate).powf(10.);
        let expected = (1_000_000. * (rate * factor) / (factor - 1.)).ceil();

        let result = annuity_payment(1_000_000., 10, 10.).unwrap();
        assert_eq!(result.payment, expected);
        assert_eq!(result.payment, 104641.);
        assert_eq!(result.overpayment, expected * 10. - 1_000_000.);
        assert_eq!(result.overpayment, 46410.);

        let result = annuity_payment(1_000_000., 60, 10.).unwrap();
        assert_eq!(result.payment, 21248.);
        assert_eq!(result.overpayment, 274880.);
    }

    #[test]
    fn test_annuity_payment_long_term() {
        // (1 + i)^100000 overflows, the payment tends to the monthly interest
        let result = annuity_payment(1_000_000., 100_000, 10.).unwrap();
        assert_eq!(result.payment, 8334.);
        assert_eq!(result.overpayment, 8334. * 100_000. - 1_000_000.);

        let result = loan_principal(8334., 100_000, 10.).unwrap();
        assert!((result.principal - 1_000_080.).abs() < 1e-3);
    }

    #[test]
    fn test_differentiated_long_schedule() {
        let schedule = differentiated_schedule(1_000_000., 120_000, 6.).unwrap();
        assert_eq!(schedule.payments.len(), 120_000);
        assert_eq!(schedule.payments[119_999].month, 120_000);
        assert_eq!(
            schedule.overpayment,
            (schedule.total_paid() - 1_000_000.).trunc()
        );
    }

    #[test]
    fn test_annuity_payment_undefined() {
        assert_eq!(
            annuity_payment(1000., 12, 0.),
            Err(DomainError::ZeroInterest)
        );
        assert_eq!(
            annuity_payment(1000., 0, 5.),
            Err(DomainError::ZeroPeriods)
        );
    }

    #[test]
    fn test_loan_principal() {
        let result = loan_principal(8722., 120, 5.6).unwrap();
        assert!((result.principal - 800018.6944).abs() < 1e-3);
        assert!((result.overpayment - 246621.3056).abs() < 1e-3);
        assert_eq!(result.overpayment, 8722. * 120. - result.principal);
    }

    #[test]
    fn test_loan_duration() {
        let result = loan_duration(500_000., 23_000., 7.8).unwrap();
        assert_eq!(result.months, 24);
        assert_eq!(result.overpayment, 52000.);
        assert_eq!(result.phrase().to_string(), " 2 years");

        let result = loan_duration(1_000_000., 100_650., 10.).unwrap();
        assert_eq!(result.months, 11);
        assert_eq!(result.overpayment, 107150.);
    }

    #[test]
    fn test_loan_duration_payment_too_small() {
        // monthly interest on 1,000,000 at 12% is exactly 10,000
        assert_eq!(
            loan_duration(1_000_000., 10_000., 12.),
            Err(DomainError::PaymentBelowInterest {
                payment: 10_000.,
                interest: 10_000.
            })
        );
        assert!(matches!(
            loan_duration(1_000_000., 500., 12.),
            Err(DomainError::PaymentBelowInterest { .. })
        ));
        assert_eq!(
            loan_duration(1_000., 100., 0.),
            Err(DomainError::ZeroInterest)
        );
    }

    #[test]
    fn test_payment_round_trip() {
        for (principal, periods, interest) in [
            (1_000_000., 10, 10.),
            (1_000_000., 60, 10.),
            (500_000., 120, 7.8),
            (250_000., 360, 4.5),
            (20_000., 24, 19.9),
        ] {
            let payment = annuity_payment(principal, periods, interest).unwrap().payment;
            let duration = loan_duration(principal, payment, interest).unwrap();
            assert!(duration.months <= periods);
            assert!(duration.months + 1 >= periods);
        }
    }

    #[test]
    fn test_report_display() {
        let report = Calculation::Payment {
            principal: 1_000_000.,
            periods: 60,
            interest: 10.,
        }
        .run()
        .unwrap();
        assert_eq!(
            report.to_string(),
            "Your monthly payment = 21248!\n\nOverpayment = 274880.0"
        );

        let report = Calculation::Duration {
            principal: 500_000.,
            payment: 23_000.,
            interest: 7.8,
        }
        .run()
        .unwrap();
        assert_eq!(
            report.to_string(),
            "It will take 2 years to repay this loan!\n\nOverpayment = 52000.0"
        );

        let report = Calculation::Principal {
            payment: 8722.,
            periods: 120,
            interest: 5.6,
        }
        .run()
        .unwrap();
        let LoanReport::Principal(result) = &report else {
            panic!("expected principal report, got {:?}", report);
        };
        assert_eq!(
            report.to_string(),
            format!(
                "Your loan principal = {:?}!\n\nOverpayment = {:?}",
                result.principal, result.overpayment
            )
        );
        assert!(report.to_string().starts_with("Your loan principal = 800018.69"));

        let report = Calculation::Differentiated {
            principal: 1000.,
            periods: 2,
            interest: 12.,
        }
        .run()
        .unwrap();
        assert!(matches!(report, LoanReport::Differentiated(_)));
        assert_eq!(
            report.to_string(),
            "Month 1: payment is 510\nMonth 2: payment is 505\n\nOverpayment = 15"
        );
    }
}
