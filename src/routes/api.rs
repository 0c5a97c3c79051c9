use actix_web::{HttpResponse, Responder, get, web};

use crate::services::catalog::SettingsCache;

#[get("/v1/settings")]
/// Return the brand configuration and catalog the kiosk is running with.
///
/// Public: kiosks read it before any customer interaction.
pub async fn api_v1_settings(cache: web::Data<SettingsCache>) -> impl Responder {
    HttpResponse::Ok().json(&*cache.current())
}
