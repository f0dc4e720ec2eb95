//! Writes a single-sheet Office Open XML workbook in which every cell is text.
use crate::error::SheetError;
use crate::helpers::xml::XmlPartWriter;
use crate::helpers::zip::ZipPartWriter;
use crate::spreadsheet::reference::index_to_reference;
use std::io::Cursor;
use std::path::Path;
use zip::ZipWriter;

const SPREADSHEET_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_RELATIONSHIP_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Name of the only worksheet in written workbooks
pub(crate) const SHEET_NAME: &str = "Sheet1";

/// Serializes a header row and data rows into workbook bytes.
///
/// Output depends on the content only, so equal tables give byte-identical files.
pub(crate) fn to_workbook_bytes(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, SheetError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.write_part("[Content_Types].xml", &content_types()?)?;
    zip.write_part("_rels/.rels", &package_relationships()?)?;
    zip.write_part("xl/workbook.xml", &workbook()?)?;
    zip.write_part("xl/_rels/workbook.xml.rels", &workbook_relationships()?)?;
    zip.write_part("xl/styles.xml", &styles()?)?;
    zip.write_part("xl/worksheets/sheet1.xml", &worksheet(header, rows)?)?;
    Ok(zip.finish()?.into_inner())
}

/// Writes the workbook to `path`, replacing any existing file.
pub(crate) fn write_workbook(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), SheetError> {
    let bytes = to_workbook_bytes(header, rows)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn content_types() -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("Types", &[("xmlns", CONTENT_TYPES_NAMESPACE)])?;
    xml.empty("Default", &[
        ("Extension", "rels"),
        ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
    ])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty("Override", &[
        ("PartName", "/xl/workbook.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
    ])?;
    xml.empty("Override", &[
        ("PartName", "/xl/worksheets/sheet1.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"),
    ])?;
    xml.empty("Override", &[
        ("PartName", "/xl/styles.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
    ])?;
    xml.close("Types")?;
    Ok(xml.finish())
}

fn package_relationships() -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("Relationships", &[("xmlns", PACKAGE_RELATIONSHIP_NAMESPACE)])?;
    xml.empty("Relationship", &[
        ("Id", "rId1"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument"),
        ("Target", "xl/workbook.xml"),
    ])?;
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn workbook() -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("workbook", &[("xmlns", SPREADSHEET_NAMESPACE), ("xmlns:r", RELATIONSHIP_NAMESPACE)])?;
    xml.open("sheets", &[])?;
    xml.empty("sheet", &[("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")])?;
    xml.close("sheets")?;
    xml.close("workbook")?;
    Ok(xml.finish())
}

fn workbook_relationships() -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("Relationships", &[("xmlns", PACKAGE_RELATIONSHIP_NAMESPACE)])?;
    xml.empty("Relationship", &[
        ("Id", "rId1"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet"),
        ("Target", "worksheets/sheet1.xml"),
    ])?;
    xml.empty("Relationship", &[
        ("Id", "rId2"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles"),
        ("Target", "styles.xml"),
    ])?;
    xml.close("Relationships")?;
    Ok(xml.finish())
}

/// Minimal stylesheet with the default font, fill, border and the text format (49).
fn styles() -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("styleSheet", &[("xmlns", SPREADSHEET_NAMESPACE)])?;
    xml.open("fonts", &[("count", "1")])?;
    xml.open("font", &[])?;
    xml.empty("sz", &[("val", "11")])?;
    xml.empty("name", &[("val", "Calibri")])?;
    xml.close("font")?;
    xml.close("fonts")?;
    xml.open("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        xml.open("fill", &[])?;
        xml.empty("patternFill", &[("patternType", pattern)])?;
        xml.close("fill")?;
    }
    xml.close("fills")?;
    xml.open("borders", &[("count", "1")])?;
    xml.empty("border", &[])?;
    xml.close("borders")?;
    xml.open("cellStyleXfs", &[("count", "1")])?;
    xml.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
    xml.close("cellStyleXfs")?;
    xml.open("cellXfs", &[("count", "2")])?;
    xml.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0"), ("xfId", "0")])?;
    xml.empty("xf", &[
        ("numFmtId", "49"),
        ("fontId", "0"),
        ("fillId", "0"),
        ("borderId", "0"),
        ("xfId", "0"),
        ("applyNumberFormat", "1"),
    ])?;
    xml.close("cellXfs")?;
    xml.close("styleSheet")?;
    Ok(xml.finish())
}

fn worksheet(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, SheetError> {
    let mut xml = XmlPartWriter::new()?;
    xml.open("worksheet", &[("xmlns", SPREADSHEET_NAMESPACE), ("xmlns:r", RELATIONSHIP_NAMESPACE)])?;
    xml.open("sheetData", &[])?;
    for (row, values) in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)).enumerate() {
        let number = (row + 1).to_string();
        xml.open("row", &[("r", number.as_str())])?;
        for (col, value) in values.iter().enumerate() {
            // Empty cells are left out entirely
            if value.is_empty() {
                continue;
            }
            let reference = index_to_reference(row, col);
            xml.open("c", &[("r", reference.as_str()), ("s", "1"), ("t", "inlineStr")])?;
            xml.open("is", &[])?;
            xml.open("t", &[("xml:space", "preserve")])?;
            xml.text(value)?;
            xml.close("t")?;
            xml.close("is")?;
            xml.close("c")?;
        }
        xml.close("row")?;
    }
    xml.close("sheetData")?;
    xml.close("worksheet")?;
    Ok(xml.finish())
}
