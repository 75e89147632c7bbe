use log::{debug, info, LevelFilter};
use loan_calculator::{calculate, LoanError};
use simple_logger::SimpleLogger;
use std::process::ExitCode;

fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    if let Err(err) = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("logger unavailable: {}", err);
    }

    match calculate(std::env::args_os()) {
        Ok(report) => {
            info!("calculation finished, overpayment {}", report.overpayment());
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(LoanError::Args(err)) => err.exit(),
        Err(err) => {
            debug!("request rejected: {:?}", err);
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<loan_calculator::LoanReport>();
    is_normal::<loan_calculator::LoanRequest>();
    is_normal::<loan_calculator::LoanError>();
}
