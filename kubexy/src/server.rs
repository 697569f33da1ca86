use std::net::{
    IpAddr,
    Ipv4Addr,
};
use std::path::{
    Path,
    PathBuf,
};

use kx_core::prelude::*;
use rocket::fs::FileServer;
use rocket::http::{
    ContentType,
    Status,
};
use rocket::{
    get,
    routes,
    Build,
    Rocket,
    State,
};
use tracing::*;

type Exporter = Box<dyn SnapshotSource>;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn new(port: u16, static_dir: &Path) -> ServerConfig {
        ServerConfig { port, static_dir: static_dir.into() }
    }
}

#[get("/view/pods")]
fn view_pods(exporter: &State<Exporter>) -> Result<(ContentType, String), Status> {
    match exporter.export_json() {
        Ok(body) => Ok((ContentType::JSON, body)),
        Err(err) => {
            error!("could not export pod view: {err:#}");
            Err(Status::InternalServerError)
        },
    }
}

pub fn build<S: SnapshotSource + 'static>(exporter: S, config: &ServerConfig) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
        .merge(("port", config.port));

    let server = rocket::custom(figment).manage(Box::new(exporter) as Exporter).mount("/", routes![view_pods]);
    if config.static_dir.is_dir() {
        info!("serving static assets from {}", config.static_dir.display());
        server.mount("/", FileServer::from(&config.static_dir))
    } else {
        warn!("static asset directory {} not found, only /view/pods will be served", config.static_dir.display());
        server
    }
}
