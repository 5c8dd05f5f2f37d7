use rocket::http::Method;
use rocket_cors::{AllowedOrigins, CorsOptions};

pub fn create_cors(allowed_origins: &[String]) -> rocket_cors::Cors {
    let allowed_origins = AllowedOrigins::some_exact(allowed_origins);

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Options]
            .into_iter()
            .map(|m| m.into())
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&[
            "Accept",
            "Content-Type",
            "X-Requested-With",
        ]),
        allow_credentials: false,
        ..Default::default()
    }
    .to_cors()
    .expect("Failed to create CORS configuration")
}
