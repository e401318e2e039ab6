// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;
mod session;

use anyhow::{Context, Result, anyhow};
use config::Config;
use loandesk_api::Client;
use loandesk_app::{AppState, SessionToken};
use runtime::{ApiRuntime, DemoRuntime};
use session::TokenStore;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `loandesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let store = TokenStore::new(config.token_path()?);
    if options.logout {
        store.clear()?;
        println!("signed out; removed {}", store.path().display());
        return Ok(());
    }

    let client = Client::new(
        config.api_base_url(),
        config.api_resource()?,
        config.api_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/resource/timeout values",
            options.config_path.display()
        )
    })?;

    if !options.check_only && !options.demo {
        let seeded = options
            .token
            .clone()
            .or_else(|| env::var("LOANDESK_TOKEN").ok())
            .filter(|raw| !raw.trim().is_empty());
        if let Some(raw) = seeded {
            let token = SessionToken::parse(&raw).context("--token / LOANDESK_TOKEN")?;
            store.save(&token)?;
        }
    }

    let log_file = config.log_file()?;
    if options.check_only {
        store.load()?;
        println!("config ok: {}", options.config_path.display());
        println!("api: {}", client.base_url());
        println!("token file: {}", store.path().display());
        println!("log file: {}", log_file.display());
        return Ok(());
    }

    let _log_guard = logging::init(&log_file, config.log_level())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %options.config_path.display(),
        demo = options.demo,
        "loandesk starting"
    );

    let mut state = AppState::default();
    if options.demo {
        let mut runtime = DemoRuntime::new(OffsetDateTime::now_utc());
        return loandesk_tui::run_app(&mut state, &mut runtime);
    }

    let extra_settings = vec![
        (
            "config".to_owned(),
            options.config_path.display().to_string(),
        ),
        ("log file".to_owned(), log_file.display().to_string()),
    ];
    let mut runtime = ApiRuntime::new(client, store, config.downloads_dir(), extra_settings);
    loandesk_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    token: Option<String>,
    logout: bool,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        token: None,
        logout: false,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--token" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--token requires the session token value"))?;
                options.token = Some(value.as_ref().to_owned());
            }
            "--logout" => {
                options.logout = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("loandesk: loan application admin console");
    println!("  --config <path>          Use a specific config path");
    println!("  --token <value>          Store this session token, then start signed in");
    println!("  --logout                 Remove the stored session token and exit");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with generated applications (no backend)");
    println!("  --check                  Validate config + token store and exit");
    println!("  --help                   Show this help");
    println!();
    println!("environment: LOANDESK_CONFIG_PATH, LOANDESK_TOKEN, LOANDESK_TOKEN_PATH, RUST_LOG");
}
