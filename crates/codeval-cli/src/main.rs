use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeval_core::{
    CodeWrapper, ConfigLoader, ConsoleAuthClient, ConsoleCodeGenerator, EvalConfig, Evaluator,
    EvaluatorSettings, SandboxClient, TestCaseLoader,
};
use log::LevelFilter;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "codeval",
    author,
    version = "0.1.0",
    about = "Evaluate generated code against known test cases in a remote sandbox"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, global = true, default_value = "info")]
    log_level: String,

    #[clap(long, global = true, help = "Write logs to this file instead of stderr")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every test case and print the accuracy report
    Run {
        #[clap(
            long,
            short,
            help = "YAML configuration file; without it configuration comes from the environment"
        )]
        config: Option<PathBuf>,

        #[clap(long, short, help = "Test case file (YAML, or JSON with a .json extension)")]
        test_cases: Option<PathBuf>,

        #[clap(long, default_value = ".env", help = "Environment file loaded before configuration")]
        env_file: PathBuf,

        #[clap(long, help = "Exit with an error when accuracy is below this percentage")]
        fail_under: Option<f64>,
    },
    /// Print the program that would be sent to the sandbox, without running it
    Wrap {
        #[clap(long, help = "Transformer language, e.g. python3 or javascript")]
        language: String,

        #[clap(long, help = "File containing the generated main function")]
        code_file: PathBuf,

        #[clap(long, default_value = "{}", help = "Inputs as a JSON object")]
        inputs: String,
    },
    /// List the languages a program can be wrapped for
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    init_logging(log_level_filter, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            config,
            test_cases,
            env_file,
            fail_under,
        } => run_evaluation(config, test_cases, env_file, fail_under).await,
        Commands::Wrap {
            language,
            code_file,
            inputs,
        } => wrap_program(&language, &code_file, &inputs),
        Commands::Languages => {
            for language in CodeWrapper::new().supported_languages() {
                println!("{}", language);
            }
            Ok(())
        }
    }
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let Some(path) = log_file {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

async fn load_config(config: Option<PathBuf>, env_file: &Path) -> Result<EvalConfig> {
    if env_file.exists() {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
        log::info!("Loaded environment from {}", env_file.display());
    }

    let config = match config {
        Some(path) => ConfigLoader::from_file(&path).await?,
        None => ConfigLoader::from_env()?,
    };
    Ok(config)
}

async fn run_evaluation(
    config: Option<PathBuf>,
    test_cases: Option<PathBuf>,
    env_file: PathBuf,
    fail_under: Option<f64>,
) -> Result<()> {
    let config = load_config(config, &env_file)
        .await
        .context("Failed to load configuration")?;

    let test_cases_path = test_cases
        .or_else(|| config.evaluation.test_cases.clone())
        .context("No test case file given; pass --test-cases or set evaluation.test_cases")?;

    let sandbox = SandboxClient::new(&config.sandbox)?;

    let access_token = ConsoleAuthClient::new(&config.console.base_url)
        .login_with(&config.console)
        .await
        .context("Failed to log in to the console")?;

    let cases = TestCaseLoader::from_file(&test_cases_path)
        .await
        .context("Failed to load test cases")?;

    let generator = ConsoleCodeGenerator::new(&config.console.base_url, access_token);
    let evaluator = Evaluator::new(
        Box::new(generator),
        Box::new(sandbox),
        EvaluatorSettings::from(&config),
    );

    log::info!(
        "Evaluating {} test cases with {}/{}",
        cases.len(),
        config.model.provider,
        config.model.name
    );
    let metrics = evaluator.run(&cases).await;

    println!("{}", metrics);

    if let Some(threshold) = fail_under {
        if metrics.total() == 0 || metrics.accuracy() < threshold {
            anyhow::bail!(
                "Accuracy below threshold of {:.2}% ({} of {} passed)",
                threshold,
                metrics.successful(),
                metrics.total()
            );
        }
    }

    Ok(())
}

fn wrap_program(language: &str, code_file: &Path, inputs: &str) -> Result<()> {
    let code = std::fs::read_to_string(code_file)
        .with_context(|| format!("Failed to read code file {}", code_file.display()))?;

    let inputs: Map<String, Value> =
        serde_json::from_str(inputs).context("Inputs must be a JSON object")?;

    let program = CodeWrapper::new().wrap(language, &code, &inputs)?;

    println!("{}", program.final_code);
    if !program.preload_script.is_empty() {
        eprintln!("--- preload ---\n{}", program.preload_script);
    }
    Ok(())
}
