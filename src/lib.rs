pub mod error;
pub mod input;
pub mod loan;

pub use error::{DomainError, InputError, LoanError, Result};
pub use input::{parse_request, LoanArgs, LoanRequest};
pub use loan::{Calculation, DurationPhrase, LoanParameters, LoanReport, LoanType};

/// Validates `args` (program name first), then runs the selected calculator.
pub fn calculate<I, T>(args: I) -> Result<LoanReport>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString>,
{
    let request = parse_request(args)?;
    let report = request.calculation()?.run()?;
    Ok(report)
}
