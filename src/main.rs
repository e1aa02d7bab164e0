use chirpy::api;
use chirpy::logger::*;
use chirpy::server::*;
use chirpy::settings::*;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let settings = parse_settings(cli.settings.as_deref())?;
    let logger_config = LogConfig {
        filter: settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = settings.http.address.parse()?;
    let server = Arc::new(Server::try_new(&settings).await?);

    let routes = api::v1::routes(server.clone()).recover(api::v1::recover_error);

    info!("listening on http://{}", address);
    warp::serve(routes)
        .bind_with_graceful_shutdown(address, async {
            signal::ctrl_c().await.expect("Could not register SIGINT");
        })
        .1
        .await;

    server.shutdown().await;

    Ok(())
}
