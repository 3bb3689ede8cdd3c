//! Hamper command line entry point

use std::{
    io::{self, Write},
    process::ExitCode,
};

use tracing::{error, info};

use hamper::{
    analysis::{Analysis, Query},
    config::CliConfig,
    error::AnalysisError,
    observability::init_subscriber,
    report::{ReportError, write_items},
};

fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(err) => {
            // clap renders its own help/usage/errors
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialised, must use eprintln"
        )]
        {
            eprintln!("Logging error: {err}");
        }

        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match run(&config, &mut handle) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "analysis failed");

            _ = report_failure(&mut handle, &err);

            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig, out: &mut impl Write) -> Result<(), AnalysisError> {
    let thresholds = config.thresholds()?;
    let mut analysis = Analysis::open(&config.data, thresholds)?;

    if config.list_items {
        write_items(&mut *out, analysis.items())?;

        return Ok(());
    }

    let Some(item) = config.item.clone().or_else(|| analysis.default_item()) else {
        info!("transaction log is empty");

        writeln!(out, "The transaction log has no items.").map_err(ReportError::from)?;

        return Ok(());
    };

    let query = Query::new(&item)
        .with_filter(config.filter())
        .with_top_n(config.top);

    analysis.recommend(&query)?.write_to(out)?;

    Ok(())
}

fn report_failure(out: &mut impl Write, err: &AnalysisError) -> io::Result<()> {
    match err {
        AnalysisError::DataFileMissing { path } => {
            writeln!(out, "File '{}' was not found.", path.display())?;
            writeln!(
                out,
                "Make sure the file exists, or point --data at the transaction log."
            )
        }
        AnalysisError::Computation(cause) => writeln!(out, "An error occurred: {cause}"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hamper::{error::ComputationError, transactions::FilterError};
    use testresult::TestResult;

    use super::*;

    fn render(err: &AnalysisError) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        report_failure(&mut out, err)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn missing_file_names_the_path_and_remedy() -> TestResult {
        let message = render(&AnalysisError::DataFileMissing {
            path: PathBuf::from("bread basket.csv"),
        })?;

        assert_eq!(
            message,
            "File 'bread basket.csv' was not found.\n\
             Make sure the file exists, or point --data at the transaction log.\n"
        );

        Ok(())
    }

    #[test]
    fn other_failures_include_the_cause() -> TestResult {
        let message = render(&AnalysisError::Computation(ComputationError::Filter(
            FilterError::MonthOutOfRange(13),
        )))?;

        assert_eq!(message, "An error occurred: month must be between 1 and 12, got 13\n");

        Ok(())
    }
}
