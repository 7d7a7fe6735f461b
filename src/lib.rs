pub mod api;
pub mod clients;
pub mod config;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod sanitize;
pub mod scheduler;
pub mod state;

use std::sync::Arc;
use tokio::signal;

pub use config::Config;
use scheduler::Scheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => {
            config.validate()?;
            run_daemon(config).await
        }

        "generate" | "g" => {
            let topic = args.get(2).cloned();
            let main_page_url = args.get(3).cloned();
            cmd_generate(config, topic, main_page_url).await
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Blogarr - Scheduled Blog Generation Daemon");
    println!("Generates blog posts with an LLM, saves them to Firebase, and emails you");
    println!();
    println!("USAGE:");
    println!("  blogarr <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  generate [topic] [url]  Run the pipeline once and exit");
    println!("  daemon                  Run with the daily scheduler and HTTP trigger");
    println!("  init                    Create default config file");
    println!("  help                    Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  blogarr generate                          # Use configured defaults");
    println!("  blogarr generate \"GraphQL API testing\"    # Override the topic");
    println!("  blogarr daemon                            # Start the background service");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml for the schedule, SMTP relay, and database URL.");
    println!("  Secrets come from the environment (.env is loaded): OPENROUTER_API_KEY,");
    println!("  SMTP_EMAIL, SMTP_PASSWORD, RECIPIENT_EMAIL, FIREBASE_AUTH_TOKEN.");
}

async fn cmd_generate(
    config: Config,
    topic: Option<String>,
    main_page_url: Option<String>,
) -> anyhow::Result<()> {
    let topic = topic.unwrap_or_else(|| config.content.default_topic.clone());
    let main_page_url =
        main_page_url.unwrap_or_else(|| config.content.default_main_page_url.clone());

    let state = SharedState::new(config)?;

    println!("Generating blog post for topic: {topic}");

    match state.pipeline.run(&topic, &main_page_url).await {
        Ok(post) => {
            println!();
            println!("✓ Published: {}", post.title);
            println!("  ID:  {}", post.blog_id);
            println!("  URL: {}", post.firebase_url);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Blogarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let state = Arc::new(SharedState::new(config.clone())?);

    let scheduler = Scheduler::new(Arc::clone(&state), config.scheduler.clone());
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {e}");
        }
    });

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        let app = api::router(Arc::clone(&state));
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("HTTP trigger listening at http://{addr}");
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {e}");
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {e}"),
    }

    scheduler_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}
