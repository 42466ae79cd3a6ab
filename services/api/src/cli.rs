use crate::demo::{run_demo, run_export, run_report, DemoArgs, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use vehicle_cancellation::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Vehicle Cancellation Tracker",
    about = "Track vehicle credential cancellations, settlement due dates, and reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the cancellation report for a JSON request file
    Report(ReportArgs),
    /// Export a JSON request file as a spreadsheet-friendly CSV
    Export(ExportArgs),
    /// Seed sample requests and print the resulting report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["tracker"]).expect("parses without subcommand");
        assert!(cli.command.is_none());
    }

    #[test]
    fn report_parses_dates() {
        let cli = Cli::try_parse_from([
            "tracker",
            "report",
            "--requests",
            "requests.json",
            "--today",
            "2024-05-10",
            "--list-rows",
        ])
        .expect("report args parse");
        match cli.command {
            Some(Command::Report(args)) => {
                assert!(args.list_rows);
                assert_eq!(args.today.map(|day| day.to_string()).as_deref(), Some("2024-05-10"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from([
            "tracker",
            "report",
            "--requests",
            "requests.json",
            "--today",
            "10/05/2024",
        ])
        .is_err());
    }
}
