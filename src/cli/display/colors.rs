//! Color theme for CLI output

use crate::domain::graph::ResourceType;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Providers are muted, in-cluster objects use the info color, cloud
    /// resources the success color.
    pub fn resource_color(&self, resource_type: ResourceType) -> TableColor {
        if resource_type.is_provider() {
            self.muted
        } else if resource_type.is_kubernetes_object()
            || resource_type == ResourceType::HelmRelease
        {
            self.info
        } else {
            self.success
        }
    }

    pub fn secret_color(&self, secret: bool) -> TableColor {
        if secret {
            self.warning
        } else {
            self.success
        }
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}
