//! Server-rendered table fragments for the console pages

pub mod sections;
pub mod table;

pub use table::{Cell, Table};

use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use shared::error::{AppError, AppResult};

use crate::auth::ConsoleIdentity;
use crate::db;
use crate::db::activity::ActivityFilter;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/console/tables/{section}", get(section_table))
}

/// Table sections; `users` and `backups` are admin-only like their APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Users,
    Branches,
    Employees,
    Products,
    Customers,
    Backups,
    Activity,
}

impl Section {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "users" => Self::Users,
            "branches" => Self::Branches,
            "employees" => Self::Employees,
            "products" => Self::Products,
            "customers" => Self::Customers,
            "backups" => Self::Backups,
            "activity" => Self::Activity,
            _ => return None,
        })
    }

    fn admin_only(&self) -> bool {
        matches!(self, Self::Users | Self::Backups)
    }
}

/// Load and render one section with the store's currency symbol
pub async fn render_section(state: &AppState, section: Section) -> AppResult<String> {
    let db = state.db.as_ref();
    let currency = db::settings::get(db).await?.currency_symbol;
    let currency = if currency.is_empty() {
        state.config.currency_symbol.clone()
    } else {
        currency
    };

    let table = match section {
        Section::Users => sections::users(&db::users::list(db).await?),
        Section::Branches => sections::branches(&db::branches::list(db).await?),
        Section::Employees => {
            let (employees, branches) =
                futures::try_join!(db::employees::list(db), db::branches::list(db))?;
            sections::employees(&employees, &branches, &currency)
        }
        Section::Products => sections::products(&db::products::list(db).await?, &currency),
        Section::Customers => sections::customers(&db::customers::list(db).await?, &currency),
        Section::Backups => sections::backups(&db::backups::list(db).await?),
        Section::Activity => {
            sections::activity(&db::activity::list(db, &ActivityFilter::default()).await?)
        }
    };
    Ok(table.render())
}

/// GET /console/tables/{section}
pub async fn section_table(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<ConsoleIdentity>,
    Path(section): Path<String>,
) -> Result<Html<String>, AppError> {
    let section = Section::parse(&section).ok_or_else(|| AppError::not_found(section.clone()))?;
    if section.admin_only() && !identity.is_admin() {
        return Err(AppError::admin_required());
    }
    Ok(Html(render_section(&state, section).await?))
}
