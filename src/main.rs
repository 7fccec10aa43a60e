use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use piscine_poney_api::config::Config;
use piscine_poney_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState { db: pool };

    let api = Router::new()
        // Activities
        .route(
            "/activities",
            get(routes::activities::list_activities).post(routes::activities::create_activity),
        )
        .route(
            "/activities/{id}",
            get(routes::activities::get_activity)
                .put(routes::activities::update_activity)
                .delete(routes::activities::delete_activity),
        )
        // Parents
        .route(
            "/parents",
            get(routes::parents::list_parents).post(routes::parents::create_parent),
        )
        .route(
            "/parents/{id}",
            get(routes::parents::get_parent)
                .put(routes::parents::update_parent)
                .delete(routes::parents::delete_parent),
        )
        .route(
            "/parents/{id}/children",
            get(routes::parents::get_parent_with_children),
        )
        // Children
        .route(
            "/children",
            get(routes::children::list_children).post(routes::children::create_child),
        )
        .route(
            "/children/{id}",
            get(routes::children::get_child)
                .put(routes::children::update_child)
                .delete(routes::children::delete_child),
        )
        .route(
            "/children/parent/{parent_id}",
            get(routes::children::list_children_by_parent),
        )
        .route(
            "/children/activity/{activity_id}",
            get(routes::children::list_children_by_activity),
        )
        .route(
            "/children/{id}/activities/{activity_id}",
            post(routes::children::add_activity_to_child)
                .delete(routes::children::remove_activity_from_child),
        )
        .route(
            "/children/{id}/parent",
            delete(routes::children::remove_parent_from_child),
        )
        .route(
            "/children/{id}/parent/{parent_id}",
            post(routes::children::set_parent_for_child)
                .delete(routes::children::remove_child_from_parent),
        )
        // Transports
        .route(
            "/transports",
            get(routes::transports::list_transports).post(routes::transports::create_transport),
        )
        .route(
            "/transports/{id}",
            get(routes::transports::get_transport)
                .put(routes::transports::update_transport)
                .delete(routes::transports::delete_transport),
        )
        .route(
            "/transports/activity/{activity_id}",
            get(routes::transports::list_transports_by_activity),
        )
        .route(
            "/transports/parent/{parent_id}",
            get(routes::transports::list_transports_by_parent),
        )
        .route(
            "/transports/vehicle/{vehicle_id}",
            get(routes::transports::list_transports_by_vehicle),
        )
        // Vehicles
        .route(
            "/vehicles",
            get(routes::vehicles::list_vehicles).post(routes::vehicles::create_vehicle),
        )
        .route(
            "/vehicles/available",
            get(routes::vehicles::list_available_vehicles),
        )
        .route(
            "/vehicles/{id}",
            get(routes::vehicles::get_vehicle)
                .put(routes::vehicles::update_vehicle)
                .delete(routes::vehicles::delete_vehicle),
        )
        .route(
            "/vehicles/{id}/availability",
            get(routes::vehicles::check_vehicle_availability),
        )
        .route(
            "/vehicles/parent/{parent_id}",
            get(routes::vehicles::list_vehicles_by_parent),
        )
        .route(
            "/vehicles/transport/{transport_id}",
            get(routes::vehicles::list_vehicles_by_transport),
        );

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("piscine-poney API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
