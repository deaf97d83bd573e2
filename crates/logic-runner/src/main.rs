use clap::Parser;
use logic_runner::{
    execute_eval, execute_hello, execute_plan, execute_serve, execute_transform, init_tracing, load_config, Cli,
    Commands, RunnerError,
};

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(Some(output)) => {
            println!("{output}");
        }
        Ok(None) => {}
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<Option<String>, RunnerError> {
    let config = load_config(cli.config.as_deref())?;
    init_tracing(config.log_level.as_deref());
    match cli.command {
        Commands::Eval(command) => execute_eval(&config, &command).map(Some),
        Commands::Transform(command) => execute_transform(&config, &command).map(Some),
        Commands::Plan(command) => execute_plan(&config, &command).map(Some),
        Commands::Hello(command) => execute_hello(&config, &command).map(Some),
        Commands::Serve(command) => {
            let mut stdout = std::io::stdout().lock();
            execute_serve(&config, &command, &mut stdout).map(|_| None)
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
