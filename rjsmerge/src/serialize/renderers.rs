//! Document renderer implementations.

use crate::model::MergedConfig;
use crate::Result;

use super::{to_value, DocumentRenderer};

/// Pretty JSON with two-space indentation and no trailing newline.
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, config: &MergedConfig) -> Result<String> {
        Ok(serde_json::to_string_pretty(&to_value(config)?)?)
    }
}

/// The JSON body wrapped in parentheses, as the optimizer expects.
pub struct BuildFileRenderer;

impl DocumentRenderer for BuildFileRenderer {
    fn render(&self, config: &MergedConfig) -> Result<String> {
        let body = JsonRenderer.render(config)?;
        Ok(format!("({body})"))
    }
}
