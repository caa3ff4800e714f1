//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::stack::{ResolvedOutput, Stack, StackOutputs};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the creation plan: one row per resource, grouped by wave
    pub fn render_plan(&self, stack: &Stack) -> String {
        let plan = stack.plan();
        if plan.is_empty() {
            return "No resources described".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("WAVE").set_alignment(CellAlignment::Center),
                Cell::new("").set_alignment(CellAlignment::Center),
                Cell::new("KIND").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("PROVIDER").set_alignment(CellAlignment::Left),
                Cell::new("DEPENDS ON").set_alignment(CellAlignment::Left),
            ]);

        for step in &plan {
            table.add_row(vec![
                Cell::new(step.wave).set_alignment(CellAlignment::Center),
                Cell::new(StatusIcon::for_step(step)).set_alignment(CellAlignment::Center),
                Cell::new(step.resource_type.kind())
                    .fg(self.theme.resource_color(step.resource_type)),
                Cell::new(&step.name),
                Cell::new(step.provider.as_deref().unwrap_or("-")).fg(self.theme.muted),
                Cell::new(if step.depends_on.is_empty() {
                    "-".to_string()
                } else {
                    step.depends_on.join(", ")
                }),
            ]);
        }

        let waves = plan.last().map_or(0, |s| s.wave + 1);
        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Stack {} ({}) {} ─╮\n",
            stack.name,
            stack.project,
            format!("[{} resources, {} waves]", plan.len(), waves).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} create  {} secret inputs  {} protected\n",
            StatusIcon::PLAIN.green(),
            StatusIcon::SECRET.yellow(),
            StatusIcon::PROTECTED.cyan()
        ));
        output
    }

    /// Render output expressions before anything is created. Secret
    /// expressions are masked.
    pub fn render_output_expressions(&self, outputs: &StackOutputs) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("OUTPUT").set_alignment(CellAlignment::Left),
                Cell::new("SECRET").set_alignment(CellAlignment::Center),
                Cell::new("VALUE").set_alignment(CellAlignment::Left),
            ]);

        for output in outputs.iter() {
            let secret = output.is_secret();
            table.add_row(vec![
                Cell::new(&output.name),
                Cell::new(StatusIcon::for_secret(secret))
                    .fg(self.theme.secret_color(secret))
                    .set_alignment(CellAlignment::Center),
                Cell::new(output.describe()),
            ]);
        }
        table.to_string()
    }

    /// Render resolved outputs. Secret values are masked unless `reveal` is set.
    pub fn render_outputs(&self, outputs: &[ResolvedOutput], reveal: bool) -> String {
        if outputs.is_empty() {
            return "No outputs".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("OUTPUT").set_alignment(CellAlignment::Left),
                Cell::new("SECRET").set_alignment(CellAlignment::Center),
                Cell::new("VALUE").set_alignment(CellAlignment::Left),
            ]);

        for output in outputs {
            let secret = output.is_secret();
            table.add_row(vec![
                Cell::new(&output.name),
                Cell::new(StatusIcon::for_secret(secret))
                    .fg(self.theme.secret_color(secret))
                    .set_alignment(CellAlignment::Center),
                Cell::new(output.value.render(reveal)),
            ]);
        }
        table.to_string()
    }
}
