//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = fairway_cli::run() {
        if let fairway_cli::CliError::ArgumentParsing(clap_err) = &err
            && !clap_err.use_stderr()
        {
            // --help and --version arrive as errors from clap.
            let _ = clap_err.print();
            return;
        }
        eprintln!("fairway: {err}");
        std::process::exit(1);
    }
}
