//! Role-gated page handlers.
//!
//! Pages render as JSON contexts; the gate redirects instead of returning
//! status codes.

use axum::Json;
use serde::Serialize;

use berkasman_core::{Role, RoleSet};

use crate::middleware::auth::{MenuItem, RequireSession, RequireSuperAdmin, menu_for};
use crate::models::CurrentUser;

/// Book categories shown on the production log page.
pub const DEFAULT_BOOK_CATEGORIES: [&str; 6] =
    ["Pertek", "Rintek", "RKL-RPL", "UKL-UPL", "AMDAL", "IMPLE"];

/// Context shared by every page, plus page-specific fields.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub page: &'static str,
    pub user: CurrentUser,
    pub menu: Vec<MenuItem>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Page<T> {
    fn new(page: &'static str, user: CurrentUser, data: T) -> Json<Self> {
        Json(Self {
            page,
            user,
            menu: menu_for(user.role),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoData {}

#[derive(Debug, Serialize)]
pub struct BukuData {
    pub can_manage_categories: bool,
    pub categories: [&'static str; 6],
}

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub list_endpoint: &'static str,
    pub action_endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreateUserData {
    pub submit_endpoint: &'static str,
    pub roles: Vec<Role>,
}

/// Document intake page.
pub async fn dokumen(RequireSession(user): RequireSession) -> Json<Page<NoData>> {
    Page::new("dokumen", user, NoData {})
}

/// Book production log page. Only Super Admins may manage categories.
pub async fn buku(RequireSession(user): RequireSession) -> Json<Page<BukuData>> {
    Page::new(
        "buku",
        user,
        BukuData {
            can_manage_categories: RoleSet::SUPER_ADMIN.permits(user.role),
            categories: DEFAULT_BOOK_CATEGORIES,
        },
    )
}

/// User management page.
pub async fn users(RequireSuperAdmin(user): RequireSuperAdmin) -> Json<Page<UsersData>> {
    Page::new(
        "super-admin/users",
        user,
        UsersData {
            list_endpoint: "/api/admin/get-users",
            action_endpoint: "/api/admin/user-action",
        },
    )
}

/// New user form.
pub async fn create_user(
    RequireSuperAdmin(user): RequireSuperAdmin,
) -> Json<Page<CreateUserData>> {
    Page::new(
        "super-admin/create-user",
        user,
        CreateUserData {
            submit_endpoint: "/api/admin/create-user",
            roles: Role::ALL.to_vec(),
        },
    )
}
