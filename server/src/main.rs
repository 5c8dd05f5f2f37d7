use minefield_server::{build, config::ServerConfig};
use rocket::{Build, Rocket};
use tracing::info;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting Minefield server");

    let config = ServerConfig::from_env();
    info!("⚙️ Configuration: {:?}", config);

    let rocket = build(config);

    info!("🌐 Server configured with CORS, cleanup task, and routes");
    info!("📡 Endpoints: POST /create, GET /ws");

    rocket
}
