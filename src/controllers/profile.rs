use crate::errors::Unsupported;
use crate::models::UserProfile;
use crate::page::Page;
use crate::samples;
use crate::source::AttendanceApi;
use base64::Engine;
use std::collections::HashMap;
use tracing::{error, info};

pub const PROFILE_PICTURE: &str = "profile-picture";
pub const ERROR_CLASS: &str = "error";

/// Fields the profile form marks `required`.
pub const PROFILE_FORM_REQUIRED: [&str; 2] = ["email", "department"];
pub const PROFILE_FORM_FIELDS: [&str; 3] = ["email", "department", "phone"];

pub struct UserProfileController<'a, A> {
    api: &'a A,
}

impl<'a, A: AttendanceApi + Sync> UserProfileController<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn activate(&self, page: &mut Page) {
        info!("initializing user profile page");
        let profile = self.api.profile().await.unwrap_or_else(|err| {
            error!("error fetching user data: {err}");
            samples::profile()
        });
        show_profile(page, &profile);
    }
}

pub fn show_profile(page: &mut Page, profile: &UserProfile) {
    page.set_text("profile-name", profile.username.as_str());
    page.set_text("profile-role", profile.role.as_str());
    page.set_src(PROFILE_PICTURE, profile.profile_image.as_str());
    page.set_text(
        "stat-attendance",
        format!("{}%", profile.attendance_percentage),
    );
    page.set_text("stat-days-present", profile.days_present.to_string());
    page.set_value("email", profile.email.as_str());
    page.set_value("department", profile.department.as_str());
}

/// An image picked in the browser's file dialog.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.content_type)
    }

    /// Storing profile pictures server-side does not exist yet.
    pub fn persist(&self) -> Result<(), Unsupported> {
        Err(Unsupported("profile image upload"))
    }
}

/// Shows the upload as the profile picture. The picture is not stored; the
/// returned error says so.
pub fn preview_image(page: &mut Page, upload: &ImageUpload) -> Result<(), Unsupported> {
    page.set_src(PROFILE_PICTURE, upload.data_url());
    info!("uploading profile image: {}", upload.file_name);
    upload.persist()
}

/// Marks empty required fields with the error class and clears it from the
/// rest. Returns whether the submission may proceed.
pub fn validate_required(
    page: &mut Page,
    required: &[&str],
    submitted: &HashMap<String, String>,
) -> bool {
    let mut valid = true;
    for field in required {
        let filled = submitted
            .get(*field)
            .is_some_and(|value| !value.trim().is_empty());
        page.toggle_class(field, ERROR_CLASS, !filled);
        valid &= filled;
    }

    if valid {
        info!("form validation passed");
    } else {
        info!("form validation failed");
    }
    valid
}

/// Puts submitted values back into their fields so a blocked form keeps
/// what the user typed.
pub fn refill_form(page: &mut Page, fields: &[&str], submitted: &HashMap<String, String>) {
    for field in fields {
        if let Some(value) = submitted.get(*field) {
            page.set_value(field, value.as_str());
        }
    }
}
