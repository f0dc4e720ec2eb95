use crate::error::ExtractError;
use crate::error::SheetError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::open_spreadsheet;
use crate::table::Table;
use std::path::Path;

fn load_error(path: &Path, error: SheetError) -> ExtractError {
    log::warn!("Load '{}' failed: {}", path.display(), error);
    ExtractError::Load {
        path: path.to_path_buf(),
        cause: error.to_string(),
    }
}

/// Lists the sheet names of a workbook in workbook order.
pub fn list_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ExtractError> {
    let path = path.as_ref();
    let spreadsheet = open_spreadsheet(path).map_err(|error| load_error(path, error))?;
    Ok(spreadsheet.sheet_names())
}

/// Loads the selected sheets of a workbook into one table of text cells.
///
/// Selected sheets are concatenated in workbook order. A selection matching no
/// sheet gives an empty table, while an exact sheet name that the workbook
/// lacks is a load error.
pub fn load_table<P: AsRef<Path>>(path: P, criteria: &Criteria) -> Result<Table, ExtractError> {
    read_table(path.as_ref(), criteria).map(|(_, table)| table)
}

/// Like [`load_table`], also returning the names of the sheets that were read.
pub(crate) fn read_table(path: &Path, criteria: &Criteria) -> Result<(Vec<String>, Table), ExtractError> {
    log::info!("Loading '{}'", path.display());
    let mut spreadsheet = open_spreadsheet(path).map_err(|error| load_error(path, error))?;
    let sheets = spreadsheet
        .read_sheets(criteria)
        .map_err(|error| load_error(path, error))?;

    let names: Vec<String> = sheets.iter().map(|sheet| sheet.name.to_owned()).collect();
    let tables = sheets.iter().map(Table::from_sheet).collect();
    let table = Table::concat(tables);
    log::info!(
        "Loaded '{}' sheets {:?}: {} rows, {} columns",
        spreadsheet.name(),
        names,
        table.len(),
        table.columns().len()
    );
    Ok((names, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::zip::ZipPartWriter;
    use std::io::Cursor;
    use std::path::PathBuf;
    use zip::ZipWriter;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="April" sheetId="1" r:id="rId1"/><sheet name="May" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy/mm/dd"/></numFmts>
<cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs>
<cellXfs count="2"><xf numFmtId="0" xfId="0"/><xf numFmtId="164" xfId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

    const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
<si><t>id</t></si><si><t>name</t></si><si><t>007</t></si><si><r><t>Ka</t></r><r><t>tou</t></r><rPh sb="0" eb="1"><t>カトウ</t></rPh></si>
</sst>"#;

    const APRIL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="str"><v>opened</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2" t="s"><v>3</v></c><c r="C2" s="1"><v>45292</v></c></row>
<row r="4"><c r="A4"><v>8</v></c><c r="B4" t="b"><v>1</v></c><c r="C4" t="e"><v>#N/A</v></c></row>
</sheetData></worksheet>"#;

    const MAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>id</t></is></c><c r="B1" t="inlineStr"><is><t>branch</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>9</t></is></c><c r="B2" t="inlineStr"><is><t>north</t></is></c></row>
</sheetData></worksheet>"#;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn fixture(directory: &Path) -> Result<PathBuf, SheetError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.write_part("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes())?;
        zip.write_part("xl/workbook.xml", WORKBOOK.as_bytes())?;
        zip.write_part("xl/styles.xml", STYLES.as_bytes())?;
        zip.write_part("xl/sharedStrings.xml", SHARED_STRINGS.as_bytes())?;
        zip.write_part("xl/worksheets/sheet1.xml", APRIL.as_bytes())?;
        zip.write_part("xl/worksheets/sheet2.xml", MAY.as_bytes())?;
        let path = directory.join("loans.xlsx");
        std::fs::write(&path, zip.finish()?.into_inner())?;
        Ok(path)
    }

    #[test]
    fn sheets_are_listed_in_workbook_order() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let path = fixture(directory.path())?;
        assert_eq!(list_sheets(&path).unwrap(), strings(&["April", "May"]));
        Ok(())
    }

    #[test]
    fn cells_are_loaded_as_text() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let path = fixture(directory.path())?;
        let table = load_table(&path, &Criteria::named(["April"])).unwrap();
        assert_eq!(table.columns(), strings(&["id", "name", "opened"]).as_slice());
        assert_eq!(table.rows(), &[
            strings(&["007", "Katou", "2024-01-01"]),
            strings(&["8", "true", "#N/A"]),
        ]);
        Ok(())
    }

    #[test]
    fn all_sheets_are_concatenated() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let path = fixture(directory.path())?;
        let table = load_table(&path, &Criteria::all()).unwrap();
        assert_eq!(table.columns(), strings(&["id", "name", "opened", "branch"]).as_slice());
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2], strings(&["9", "", "", "north"]));
        Ok(())
    }

    #[test]
    fn pattern_and_empty_selections() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let path = fixture(directory.path())?;
        let may = load_table(&path, &Criteria::parse(["M*"]).unwrap()).unwrap();
        assert_eq!(may.columns(), strings(&["id", "branch"]).as_slice());

        let none = load_table(&path, &Criteria::named(Vec::<String>::new())).unwrap();
        assert_eq!(none, Table::default());
        Ok(())
    }

    #[test]
    fn absent_sheet_is_a_load_error() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let path = fixture(directory.path())?;
        let error = load_table(&path, &Criteria::named(["June"])).unwrap_err();
        assert!(matches!(error, ExtractError::Load { .. }));
        assert!(error.to_string().contains("Sheet 'June' not found"));
        Ok(())
    }

    #[test]
    fn corrupt_and_missing_files_are_load_errors() -> Result<(), SheetError> {
        let directory = tempfile::tempdir()?;
        let corrupt = directory.path().join("corrupt.xlsx");
        std::fs::write(&corrupt, b"not a zip archive")?;
        assert!(matches!(load_table(&corrupt, &Criteria::all()), Err(ExtractError::Load { .. })));

        let missing = directory.path().join("missing.xlsx");
        let error = list_sheets(&missing).unwrap_err();
        assert!(matches!(&error, ExtractError::Load { path, .. } if path == &missing));
        Ok(())
    }
}
