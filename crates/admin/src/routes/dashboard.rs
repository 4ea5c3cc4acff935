//! Dashboard route handler.

use axum::Json;
use serde::Serialize;

use crate::middleware::auth::{MenuItem, RequireSession, menu_for};
use crate::models::CurrentUser;

/// Fallback overview for roles without a dedicated description.
const GENERIC_OVERVIEW: &str =
    "Manage every document and book administration activity from one panel.";

/// Dashboard page context.
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub page: &'static str,
    pub user: CurrentUser,
    pub overview: &'static str,
    pub menu: Vec<MenuItem>,
}

/// Dashboard with the signed-in role's overview and navigation.
pub async fn index(RequireSession(user): RequireSession) -> Json<DashboardPage> {
    Json(DashboardPage {
        page: "dashboard",
        user,
        overview: user.role.overview().unwrap_or(GENERIC_OVERVIEW),
        menu: menu_for(user.role),
    })
}
