use curlgenie::context::Environment;
use curlgenie::core;
use curlgenie::status::ExitStatus;

/// Entry point - collects argv and calls core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    let env = Environment::init();

    core::run(args, env)
}
