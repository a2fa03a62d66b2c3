fn main() {
    let cli = import_atlas::cli::parse();
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let code = import_atlas::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
