use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use service_core::error::AppError;

use crate::{dtos::CreateSuperAdminRequest, middleware::CallerContext, AppState};

/// `POST /admin/superadmins` — provision a super-administrator account.
///
/// The workflow decides everything: this handler only bridges the HTTP
/// boundary to [`ProvisioningService::create_super_admin`] and maps the
/// failure taxonomy onto the coarse `permission-denied` / `internal` kinds.
///
/// [`ProvisioningService::create_super_admin`]: crate::services::ProvisioningService::create_super_admin
pub async fn create_super_admin(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Json(request): Json<CreateSuperAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state
        .provisioning
        .create_super_admin(request, &context)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(response)))
}
