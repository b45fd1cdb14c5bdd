fn main() {
    std::process::exit(agent_teams::cli::run_cli());
}
