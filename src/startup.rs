use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::JwtSettings;
use crate::middleware::JwtMiddleware;
use crate::routes::{health_check, login, logout, me, refresh, register};
use crate::store::UserStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let store = web::Data::from(store);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        // map body deserialization failures into the response envelope
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": err.to_string()
            }));
            actix_web::error::InternalError::from_response(err, response).into()
        });

        App::new()
            .app_data(store.clone())
            .app_data(jwt_config_data.clone())
            .app_data(json_config)
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/v1/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout))
                    .service(
                        web::scope("/me")
                            .wrap(JwtMiddleware::new(jwt_config.clone()))
                            .route("", web::get().to(me)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
