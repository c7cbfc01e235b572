use serde_json::Value;

use crate::error::RdeError;
use crate::invoice::{self, section_mut, SECTION_BASIC};
use crate::metadata::{MetadataDefinition, MetadataDocument};
use crate::pipeline::{ProcessingContext, Processor};

/// Appends `_feature` metadata constants to `basic.description`.
pub struct DescriptionUpdater;

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Processor for DescriptionUpdater {
    fn name(&self) -> &'static str {
        "DescriptionUpdater"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let def_path = ctx.srcpaths.metadata_def_json();
        let metadata_path = ctx.metadata_dst();
        if !def_path.is_file() || !metadata_path.is_file() {
            return Ok(());
        }

        let definition = MetadataDefinition::load(&def_path)?;
        let metadata = MetadataDocument::load(&metadata_path)?;

        let lines: Vec<String> = definition
            .features()?
            .iter()
            .filter_map(|entry| {
                let value = metadata.constant_value(&entry.key)?;
                Some(match &entry.unit {
                    Some(unit) => format!("{}({}):{}", entry.label(), unit, render(value)),
                    None => format!("{}:{}", entry.label(), render(value)),
                })
            })
            .collect();
        if lines.is_empty() {
            return Ok(());
        }

        let invoice_path = ctx.invoice_dst();
        let mut document = invoice::load_invoice(&invoice_path)?;
        let basic = section_mut(&mut document, SECTION_BASIC);
        let mut description = basic
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        for line in lines {
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(&line);
        }
        basic.insert("description".to_string(), Value::String(description));
        invoice::save_invoice(&invoice_path, &document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::UnitSource;
    use crate::processor::test_support::Workspace;

    #[test]
    fn test_appends_feature_lines() {
        let ws = Workspace::new();
        ws.write(
            "tasksupport/metadata-def.json",
            r#"{
                "temp": {"name": {"ja": "温度", "en": "Temperature"}, "unit": "K", "_feature": true},
                "op": {"name": {"en": "Operator"}, "_feature": true},
                "hidden": {"name": "Hidden"}
            }"#,
        );
        ws.write(
            "out/meta/metadata.json",
            r#"{"constant":{"temp":{"value":300,"unit":"K"},"op":{"value":"ann"},"hidden":{"value":1}},"variable":[]}"#,
        );
        ws.write("out/invoice/invoice.json", r#"{"basic":{"description":"base"}}"#);
        let mut ctx = ws.context(Config::default(), UnitSource::Plain, 0, vec![]);

        DescriptionUpdater.process(&mut ctx).unwrap();

        let invoice = ws.read_json("out/invoice/invoice.json");
        assert_eq!(invoice["basic"]["description"], "base\n温度(K):300\nOperator:ann");
    }

    #[test]
    fn test_noop_without_metadata() {
        let ws = Workspace::new();
        ws.write("tasksupport/metadata-def.json", r#"{"a":{"_feature":true}}"#);
        let original = r#"{"basic":{"description":"base"}}"#;
        ws.write("out/invoice/invoice.json", original);
        let mut ctx = ws.context(Config::default(), UnitSource::Plain, 0, vec![]);

        DescriptionUpdater.process(&mut ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(ws.path("out/invoice/invoice.json")).unwrap(),
            original
        );
    }
}
