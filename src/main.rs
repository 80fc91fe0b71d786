use clap::Parser;
use sqlx::postgres::PgPoolOptions;

mod models;
mod repositories;
pub mod services;
pub mod sessions;
pub mod settings;

#[derive(Parser)]
#[command(name = "questinvest", about = "Quest reward platform server")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging()?;

    let config = settings::Settings::new(&args.config)?;

    let conn = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.postgres.url)
        .await?;

    sqlx::migrate!("./migrations").run(&conn).await?;

    log::info!("Starting HTTP server.");
    services::http::start_http_server(conn, config).await
}

fn init_logging() -> Result<(), anyhow::Error> {
    use log4rs::append::console::ConsoleAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(log::LevelFilter::Info))?;

    log4rs::init_config(config)?;
    Ok(())
}
