use serde::Deserialize;

/// Body of `POST /api/users/{user_id}/profile`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    /// Required when the profile already exists
    pub selected_avatar: Option<String>,
    pub email: Option<String>,
}
