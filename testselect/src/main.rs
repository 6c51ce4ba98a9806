use tracing::Level;

fn main() {
    let args = match testselect::args::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    testselect::telemetry::init_tracing(args.json_logs, level);

    if let Err(err) = testselect::run::run(&args) {
        let causes = std::iter::successors(std::error::Error::source(&err), |e| e.source())
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        tracing::error!(error = %err, causes = ?causes, "test selection failed");
        std::process::exit(1);
    }
}
