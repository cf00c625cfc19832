/* Analyze command - print encoding plans instead of code */

use super::codegen::write_output;
use crate::config::Config;
use crate::plan::EncodingPlan;
use anyhow::Context;
use clap::ValueEnum;

/* Format used by --print-plan */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum PlanOutputFormat {
  Json,
  Yaml,
}

/* Execute the analyze command */
pub fn run(config: &Config, format: PlanOutputFormat, out: &str) -> anyhow::Result<()> {
  let plans = config
    .plans()
    .with_context(|| format!("failed to plan types in {}", config.dir.display()))?;
  tracing::debug!(types = plans.len(), format = ?format, "printing encoding plans");

  let text = render_plans(&plans, format)?;
  write_output(out, text.as_bytes())
}

pub fn render_plans(plans: &[EncodingPlan], format: PlanOutputFormat) -> anyhow::Result<String> {
  match format {
    PlanOutputFormat::Json => {
      let mut json = serde_json::to_string_pretty(plans)?;
      json.push('\n');
      Ok(json)
    }
    PlanOutputFormat::Yaml => Ok(serde_yml::to_string(plans)?),
  }
}
