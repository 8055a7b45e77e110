use crate::commands::session::Screen;
use crate::error::AppError;

pub fn render_screen_json(screen: &Screen) -> Result<String, AppError> {
    serde_json::to_string_pretty(screen).map_err(|e| AppError {
        message: format!("Failed to serialize screen: {}", e),
    })
}
