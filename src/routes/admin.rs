use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::catalog::SaveSettingsForm;
use crate::forms::orders::{ChangeStatusForm, OrdersQuery};
use crate::realtime::OrderFeed;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::catalog::{self, SettingsCache};
use crate::services::{ServiceError, orders};

#[get("/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    cache: web::Data<SettingsCache>,
) -> impl Responder {
    match catalog::load_admin_settings(&cache, &user) {
        Ok(settings) => HttpResponse::Ok().json(&*settings),
        Err(err) => error_response(&err, "Failed to load settings"),
    }
}

#[post("/settings")]
pub async fn save_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<SettingsCache>,
    form: web::Json<SaveSettingsForm>,
) -> impl Responder {
    match catalog::save_settings(repo.get_ref(), &cache, &user, form.into_inner()) {
        Ok(settings) => HttpResponse::Ok().json(&*settings),
        // The admin is expected to act on store failures, so they are
        // reported as is.
        Err(ServiceError::Repository(err)) => {
            log::error!("Failed to save settings: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
        Err(err) => error_response(&err, "Failed to save settings"),
    }
}

#[get("/orders")]
pub async fn show_orders(
    params: web::Query<OrdersQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match orders::load_recent_orders(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(&err, "Failed to list orders"),
    }
}

#[post("/orders/{order_id}/status")]
pub async fn change_order_status(
    order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    feed: web::Data<OrderFeed>,
    form: web::Json<ChangeStatusForm>,
) -> impl Responder {
    match orders::change_order_status(
        repo.get_ref(),
        feed.get_ref(),
        &user,
        order_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(order) => {
            let next_statuses = orders::next_statuses(&order);
            HttpResponse::Ok().json(json!({
                "order": order,
                "next_statuses": next_statuses,
            }))
        }
        Err(err) => error_response(&err, "Failed to change order status"),
    }
}
