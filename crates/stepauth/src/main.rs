use anyhow::{Context, Result};
use clap::Parser;
use stepauth::cli::{login_cmd, Cli, Command};
use stepauth::config::{
    ParamValues, ADDITIONAL_COOKIES, ADDITIONAL_HEADERS, DYNAMIC_PARAMETER_NAMES, LOGIN_URLS,
    POST_DATA, SESSION_JSON_PATH,
};
use stepauth::steps::{self, DeclarativeSteps, StepSource, UrlListSteps};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json {
        std::env::set_var("STEPAUTH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("STEPAUTH_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("STEPAUTH_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("STEPAUTH_NO_COLOR", "1");
    }

    init_tracing(&cli);

    let ok = match &cli.command {
        Command::Steps { file, params, run } => {
            let json = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let credentials = match params {
                Some(path) => ParamValues::from_file(path)?.credentials(),
                None => None,
            };
            let source = DeclarativeSteps::new(json);
            login_cmd::run(&source, credentials, run).await?
        }
        Command::Urls {
            login_urls,
            post_data,
            dynamic_names,
            cookies,
            headers,
            json_path,
            run,
        } => {
            let mut params = ParamValues::new()
                .with(LOGIN_URLS, login_urls.as_str())
                .with(POST_DATA, post_data.as_str());
            let optional = [
                (DYNAMIC_PARAMETER_NAMES, dynamic_names),
                (ADDITIONAL_COOKIES, cookies),
                (ADDITIONAL_HEADERS, headers),
                (SESSION_JSON_PATH, json_path),
            ];
            for (name, value) in optional {
                if let Some(value) = value {
                    params.insert(name, value.as_str());
                }
            }
            let source = UrlListSteps::from_params(&params)?;
            login_cmd::run(&source, None, run).await?
        }
        Command::Params { file, run } => {
            let params = ParamValues::from_file(file)?;
            let source: Box<dyn StepSource> = steps::source_from_params(&params)?;
            debug!(
                required = ?source.required_params(),
                optional = ?source.optional_params(),
                "using {} step source",
                source.label()
            );
            login_cmd::run(source.as_ref(), params.credentials(), run).await?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "stepauth=debug"
    } else if cli.quiet || cli.json {
        "stepauth=warn"
    } else {
        "stepauth=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
