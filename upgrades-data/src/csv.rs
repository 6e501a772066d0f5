use upgrades_core::UpgradeRecord;

pub const CSV_HEADER: &str = "date,upgrade,items,layer,block_number,fork_epoch";

/// One row per record, items joined with `;`. Fields are quoted only when
/// they contain a delimiter, quote or line break.
pub fn export_csv(records: &[UpgradeRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let row = [
            record.date.format("%Y-%m-%d").to_string(),
            record.upgrade_name.clone(),
            record.items.join(";"),
            record
                .layer
                .map(|layer| layer.as_str().to_string())
                .unwrap_or_default(),
            record
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            record.fork_epoch.map(|n| n.to_string()).unwrap_or_default(),
        ];
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_cell(&mut out, cell);
        }
        out.push('\n');
    }
    out
}

fn push_cell(out: &mut String, cell: &str) {
    if cell.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&cell.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use upgrades_core::Layer;

    #[test]
    fn quotes_only_when_needed() {
        let records = vec![UpgradeRecord {
            date: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
            upgrade_name: "Shapella, \"Shanghai\"".into(),
            items: vec!["EIP-4895".into(), "EIP-3651".into()],
            layer: Some(Layer::Execution),
            block_number: Some(17_034_870),
            fork_epoch: None,
        }];
        let csv = export_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some(r#"2023-04-12,"Shapella, ""Shanghai""",EIP-4895;EIP-3651,execution,17034870,"#)
        );
        assert_eq!(lines.next(), None);
    }
}
