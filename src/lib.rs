#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use bson::doc;
use mongodb::Client;
use rocket::http::Method;
use rocket::Rocket;
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::error::{BackendError, ConfigurationError};
use crate::gateway::StripeGateway;
use crate::route::mount_api;

pub mod config;
pub mod data;
pub mod error;
pub mod gateway;
pub mod resp;
pub mod role;
pub mod route;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<rocket::Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => Config::default(),
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let db = client.database(c.mongodb_db.as_str());

    if let Err(e) = db.run_command(doc! { "ping": 1 }, None).await {
        tracing::error!("Unable to connect to MongoDB: {}", e);
        return Err(e.into());
    }

    tracing::info!("Setting up CORS...");
    let allowed_origins = AllowedOrigins::some_exact(&c.allowed_origins);

    let cors = rocket_cors::CorsOptions {
        allowed_origins,
        allowed_methods: vec![
            Method::Get,
            Method::Put,
            Method::Post,
            Method::Patch,
            Method::Delete,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    let gateway = StripeGateway::new(c.stripe_secret_key.clone());

    tracing::info!("Starting HTTP server...");
    let figment = rocket::Config::figment().merge(("port", c.port));
    let mut r = rocket::custom(figment)
        .manage(c)
        .manage(db)
        .manage(gateway)
        .attach(cors);
    r = mount_api(r);

    Ok(r)
}
