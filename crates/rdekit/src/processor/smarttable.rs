use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::RdeError;
use crate::invoice::{
    self, apply_column, apply_magic_variables, contains_placeholder, ColumnKey, InvoiceSchema,
    SECTION_BASIC, SECTION_CUSTOM, SECTION_SAMPLE,
};
use crate::metadata::apply_meta_columns;
use crate::pipeline::{ProcessingContext, Processor};
use crate::sanitize::redact_path;
use crate::smarttable::{self, SmartTableRow};
use crate::workflow::InvoiceSnapshotCache;

/// Materialises the unit's invoice from one SmartTable row.
pub struct SmartTableInvoiceInitializer {
    snapshots: Arc<InvoiceSnapshotCache>,
}

impl SmartTableInvoiceInitializer {
    pub fn new(snapshots: Arc<InvoiceSnapshotCache>) -> Self {
        Self { snapshots }
    }

    fn base_invoice(&self, ctx: &ProcessingContext) -> Result<Value, RdeError> {
        Ok(self
            .snapshots
            .get(&ctx.resource_paths.invoice_org)?
            .unwrap_or_else(invoice::empty_invoice))
    }
}

impl Processor for SmartTableInvoiceInitializer {
    fn name(&self) -> &'static str {
        "SmartTableInvoiceInitializer"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        if ctx.smarttable_file().is_none() {
            return Err(RdeError::MissingSmartTableFile);
        }

        let row_csvs = smarttable::row_csvs(&ctx.resource_paths.rawfiles);
        let [row_csv] = row_csvs.as_slice() else {
            return Err(RdeError::RowCsvCount {
                found: row_csvs.len(),
            });
        };
        let row_csv = (*row_csv).clone();
        let row = smarttable::read_row_csv(&row_csv)?;
        debug!(file = %redact_path(&row_csv), columns = row.len(), "Loaded SmartTable row");

        let schema_path = &ctx.resource_paths.invoice_schema_json;
        let schema = if schema_path.is_file() {
            InvoiceSchema::load(schema_path).ok()
        } else {
            None
        };

        let mut invoice = self.base_invoice(ctx)?;
        let meta_columns = apply_row(&mut invoice, &row, schema.as_ref())?;

        let required = schema.as_ref().and_then(InvoiceSchema::required_sections);
        reconcile_required_sections(&mut invoice, required.as_deref());
        sync_owner_id(&mut invoice);

        let invoice_dst = ctx.invoice_dst();
        invoice::save_invoice(&invoice_dst, &invoice)?;

        let metadata_dst = ctx.metadata_dst();
        apply_meta_columns(&meta_columns, &ctx.srcpaths.metadata_def_json(), &metadata_dst)?;

        if invoice::data_name(&invoice).is_some_and(contains_placeholder) {
            apply_magic_variables(
                &invoice_dst,
                ctx.primary_rawfile(),
                Some(metadata_dst.as_path()),
                true,
            )?;
        }

        ctx.resource_paths.smarttable_rowfile = Some(row_csv);
        ctx.resource_paths.smarttable_row_data = Some(row);
        Ok(())
    }
}

/// Applies every non-empty column; returns the `meta/` columns for casting.
fn apply_row(
    invoice: &mut Value,
    row: &SmartTableRow,
    schema: Option<&InvoiceSchema>,
) -> Result<Vec<(String, String)>, RdeError> {
    let mut meta = Vec::new();
    for (key, value) in row.iter() {
        if value.is_empty() {
            continue;
        }
        match ColumnKey::parse(key) {
            ColumnKey::Meta(name) => meta.push((name.to_string(), value.to_string())),
            ColumnKey::FileMapping => {}
            ColumnKey::Unknown => debug!(column = %key, "Ignoring unmapped SmartTable column"),
            column => {
                apply_column(invoice, column, value, schema)?;
            }
        }
    }
    Ok(meta)
}

/// Creates required-but-absent `custom`/`sample` sections and drops present
/// ones the schema does not require. `None` treats both as required.
fn reconcile_required_sections(invoice: &mut Value, required: Option<&[String]>) {
    let Some(root) = invoice.as_object_mut() else {
        return;
    };
    for section in [SECTION_CUSTOM, SECTION_SAMPLE] {
        let is_required = required.map_or(true, |names| names.iter().any(|n| n == section));
        match (is_required, root.contains_key(section)) {
            (true, false) => {
                root.insert(section.to_string(), Value::Object(Map::new()));
            }
            (false, true) => {
                root.remove(section);
            }
            _ => {}
        }
    }
}

/// `sample.ownerId` follows `basic.dataOwnerId` when the latter is set.
fn sync_owner_id(invoice: &mut Value) {
    let owner = invoice
        .get(SECTION_BASIC)
        .and_then(|basic| basic.get("dataOwnerId"))
        .and_then(Value::as_str)
        .filter(|owner| !owner.trim().is_empty())
        .map(str::to_string);

    let Some(owner) = owner else {
        warn!("basic.dataOwnerId is empty, keeping existing sample.ownerId");
        return;
    };
    if let Some(sample) = invoice.get_mut(SECTION_SAMPLE).and_then(Value::as_object_mut) {
        sample.insert("ownerId".to_string(), Value::String(owner));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::UnitSource;
    use crate::processor::test_support::Workspace;
    use serde_json::json;
    use std::path::PathBuf;

    fn smarttable_source(ws: &Workspace) -> UnitSource {
        UnitSource::SmartTable {
            file: ws.path("inputdata/smarttable_t.csv"),
        }
    }

    fn initializer() -> SmartTableInvoiceInitializer {
        SmartTableInvoiceInitializer::new(Arc::new(InvoiceSnapshotCache::new()))
    }

    #[test]
    fn test_requires_smarttable_file() {
        let ws = Workspace::new();
        let mut ctx = ws.context(Config::default(), UnitSource::Plain, 0, vec![]);
        assert!(matches!(
            initializer().process(&mut ctx),
            Err(RdeError::MissingSmartTableFile)
        ));
    }

    #[test]
    fn test_requires_exactly_one_row_csv() {
        let ws = Workspace::new();
        let rawfiles = vec![
            PathBuf::from("fsmarttable_t_0000.csv"),
            PathBuf::from("fsmarttable_t_0001.csv"),
        ];
        let mut ctx = ws.context(Config::default(), smarttable_source(&ws), 0, rawfiles);
        assert!(matches!(
            initializer().process(&mut ctx),
            Err(RdeError::RowCsvCount { found: 2 })
        ));

        let mut ctx = ws.context(Config::default(), smarttable_source(&ws), 0, vec![]);
        assert!(matches!(
            initializer().process(&mut ctx),
            Err(RdeError::RowCsvCount { found: 0 })
        ));
    }

    #[test]
    fn test_builds_invoice_from_row() {
        let ws = Workspace::new();
        ws.write(
            "out/temp/invoice_org.json",
            r#"{"basic":{"dataName":"tmpl","dataOwnerId":"owner-a"},"custom":{},"sample":{"ownerId":"stale"}}"#,
        );
        ws.write(
            "tasksupport/invoice.schema.json",
            r#"{"required":["custom","sample"],"properties":{"custom":{"properties":{"temp":{"type":"number"}}}}}"#,
        );
        let row_csv = ws.write(
            "out/temp/fsmarttable_t_0000.csv",
            "basic/dataName,custom/temp,sample/names,sample/ownerId,other/x\nrun-1,25.5,S1,from-csv,ignored\n",
        );
        let mut ctx = ws.context(
            Config::default(),
            smarttable_source(&ws),
            0,
            vec![row_csv.clone()],
        );

        initializer().process(&mut ctx).unwrap();

        let invoice = ws.read_json("out/invoice/invoice.json");
        assert_eq!(invoice["basic"]["dataName"], "run-1");
        assert_eq!(invoice["custom"]["temp"], json!(25.5));
        assert_eq!(invoice["sample"]["names"], json!(["S1"]));
        assert_eq!(invoice["sample"]["ownerId"], "owner-a");
        assert_eq!(ctx.resource_paths.smarttable_rowfile, Some(row_csv));
        assert_eq!(
            ctx.resource_paths
                .smarttable_row_data
                .as_ref()
                .and_then(|r| r.get("basic/dataName")),
            Some("run-1")
        );
        assert!(!ws.path("out/meta/metadata.json").exists());
    }

    #[test]
    fn test_reconcile_required_sections() {
        let mut invoice = json!({ "basic": {}, "custom": { "a": 1 } });
        reconcile_required_sections(&mut invoice, Some(&["sample".to_string()]));
        assert_eq!(invoice, json!({ "basic": {}, "sample": {} }));

        let mut invoice = json!({ "basic": {} });
        reconcile_required_sections(&mut invoice, None);
        assert_eq!(invoice, json!({ "basic": {}, "custom": {}, "sample": {} }));
    }

    #[test]
    fn test_owner_id_copies_data_owner_verbatim() {
        let mut invoice = json!({
            "basic": { "dataOwnerId": " owner-a " },
            "sample": { "ownerId": "stale" }
        });
        sync_owner_id(&mut invoice);
        assert_eq!(invoice["sample"]["ownerId"], invoice["basic"]["dataOwnerId"]);
        assert_eq!(invoice["sample"]["ownerId"], " owner-a ");

        let mut blank = json!({
            "basic": { "dataOwnerId": "   " },
            "sample": { "ownerId": "kept" }
        });
        sync_owner_id(&mut blank);
        assert_eq!(blank["sample"]["ownerId"], "kept");
    }

    #[test]
    fn test_owner_id_kept_when_data_owner_missing() {
        let mut invoice = json!({ "basic": { "dataOwnerId": "" }, "sample": { "ownerId": "keep" } });
        sync_owner_id(&mut invoice);
        assert_eq!(invoice["sample"]["ownerId"], "keep");
    }

    #[test]
    fn test_meta_columns_and_magic_variables() {
        let ws = Workspace::new();
        ws.write("out/temp/invoice_org.json", r#"{"basic":{},"sample":{}}"#);
        ws.write(
            "tasksupport/metadata-def.json",
            r#"{"temp":{"schema":{"type":"integer"},"unit":"K"}}"#,
        );
        let data = ws.write("inputdata/scan.dat", "x");
        let row_csv = ws.write(
            "out/temp/fsmarttable_t_0000.csv",
            "basic/dataName,meta/temp,inputdata1\nT${metadata:constant:temp}_${filename},300,scan.dat\n",
        );
        let mut ctx =
            ws.context(Config::default(), smarttable_source(&ws), 0, vec![row_csv, data]);

        initializer().process(&mut ctx).unwrap();

        let metadata = ws.read_json("out/meta/metadata.json");
        assert_eq!(metadata["constant"]["temp"], json!({ "value": 300, "unit": "K" }));
        let invoice = ws.read_json("out/invoice/invoice.json");
        assert_eq!(invoice["basic"]["dataName"], "T300_scan.dat");
    }
}
