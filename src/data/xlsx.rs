//! Spreadsheet reading: first worksheet of an `.xlsx` workbook into a DataFrame.

use calamine::{open_workbook, Data, Reader, Xlsx};
use polars::prelude::*;
use std::path::Path;

use super::loader::LoaderError;

/// Read the first worksheet. The first row is the header; a sheet with no
/// data rows below it is an error.
pub fn load_xlsx(path: &Path) -> Result<DataFrame, LoaderError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoaderError::NoWorksheet)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(LoaderError::EmptySheet)?;
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i + 1),
            other => other.to_string(),
        })
        .collect();

    let body: Vec<&[Data]> = rows.collect();
    if body.is_empty() {
        return Err(LoaderError::EmptySheet);
    }
    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(i).unwrap_or(&Data::Empty))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Type a column from its cells: integers, then floats, then text.
fn build_column(name: &str, cells: &[&Data]) -> Column {
    let numeric = cells
        .iter()
        .all(|c| matches!(c, Data::Empty | Data::Int(_) | Data::Float(_)));

    if numeric {
        let integral = cells.iter().all(|c| match c {
            Data::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
            _ => true,
        });

        if integral {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            return Column::new(name.into(), values);
        }

        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|c| match c {
            Data::Empty => None,
            other => Some(other.to_string()),
        })
        .collect();
    Column::new(name.into(), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};
    use ::zip::write::FileOptions;
    use ::zip::ZipWriter;

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    const PKG_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Write a minimal workbook. `sheet_data` is the `<sheetData>` body of
    /// the single worksheet; `None` writes a workbook without sheets.
    fn workbook(sheet_data: Option<&str>) -> NamedTempFile {
        let file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut zip = ZipWriter::new(file.reopen().unwrap());
        let options = FileOptions::default();

        let (sheets, rels) = match sheet_data {
            Some(_) => (
                r#"<sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#.to_string(),
                format!(
                    r#"<Relationship Id="rId1" Type="{REL_NS}/worksheet" Target="worksheets/sheet1.xml"/>"#
                ),
            ),
            None => (String::new(), String::new()),
        };

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#,
        )
        .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        )
        .unwrap();

        zip.start_file("xl/workbook.xml", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{sheets}</sheets></workbook>"#
        )
        .unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_NS}">{rels}</Relationships>"#
        )
        .unwrap();

        if let Some(data) = sheet_data {
            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}"><sheetData>{data}</sheetData></worksheet>"#
            )
            .unwrap();
        }

        zip.finish().unwrap();
        file
    }

    fn text(cell: &str, value: &str) -> String {
        format!(r#"<c r="{cell}" t="inlineStr"><is><t>{value}</t></is></c>"#)
    }

    fn number(cell: &str, value: f64) -> String {
        format!(r#"<c r="{cell}"><v>{value}</v></c>"#)
    }

    #[test]
    fn test_load_workbook_through_loader() {
        // B1 is blank so the second column gets a generated name.
        let rows = [
            format!(r#"<row r="1">{}{}</row>"#, text("A1", "month"), text("C1", "sales")),
            format!(
                r#"<row r="2">{}{}{}</row>"#,
                number("A2", 1.0),
                text("B2", "east"),
                number("C2", 10.5)
            ),
            format!(
                r#"<row r="3">{}{}{}</row>"#,
                number("A3", 2.0),
                text("B3", "west"),
                number("C3", 12.0)
            ),
        ]
        .concat();
        let file = workbook(Some(&rows));

        let df = DataLoader::load_file(file.path()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["month", "column_2", "sales"]);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("month").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("column_2").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("sales").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_empty_sheet_is_error() {
        let file = workbook(Some(""));
        let err = load_xlsx(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::EmptySheet));
    }

    #[test]
    fn test_header_only_sheet_is_error() {
        let header = format!(r#"<row r="1">{}</row>"#, text("A1", "month"));
        let file = workbook(Some(&header));
        let err = load_xlsx(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::EmptySheet));
    }

    #[test]
    fn test_workbook_without_sheets() {
        let file = workbook(None);
        let err = load_xlsx(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::NoWorksheet));
    }

    #[test]
    fn test_integer_column() {
        let cells = [Data::Int(1), Data::Float(2.0), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        let col = build_column("n", &refs);
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn test_float_column() {
        let cells = [Data::Float(1.5), Data::Int(2)];
        let refs: Vec<&Data> = cells.iter().collect();
        let col = build_column("x", &refs);
        assert_eq!(col.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_mixed_column_is_text() {
        let cells = [Data::Float(1.5), Data::String("n/a".to_string())];
        let refs: Vec<&Data> = cells.iter().collect();
        let col = build_column("x", &refs);
        assert_eq!(col.dtype(), &DataType::String);
        assert_eq!(col.len(), 2);
    }
}
