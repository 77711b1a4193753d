//! Workbook reading: cell values via calamine, indentation from the xlsx package

use crate::diagnostics::Diagnostics;
use crate::error::{Result, TrnError};
use crate::sheet::{CellValue, RawCell, RawSheet};
use calamine::{open_workbook, Data, Reader, Xlsx};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Cell position (0-based row, 0-based column) to indent level
pub type IndentMap = HashMap<(usize, usize), u32>;

/// Read `sheet_name` from the workbook at `path` into a [`RawSheet`].
///
/// The grid is anchored at A1 so that row 0 is always the sheet's first row.
/// When the indentation metadata cannot be read every indent defaults to 0 and
/// a warning is emitted; the values are still returned.
pub fn read_sheet(path: &Path, sheet_name: &str, diagnostics: &dyn Diagnostics) -> Result<RawSheet> {
    if !path.is_file() {
        return Err(TrnError::source_read(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(TrnError::sheet_not_found(sheet_name));
    }
    let range = workbook.worksheet_range(sheet_name)?;

    let indents = match read_indents(path, sheet_name) {
        Ok(indents) => indents,
        Err(e) => {
            diagnostics.warn(&format!(
                "Could not read indentation for sheet '{}': {}",
                sheet_name, e
            ));
            IndentMap::new()
        }
    };

    let (height, width) = match range.end() {
        Some((row, col)) => (row as usize + 1, col as usize + 1),
        None => (0, 0),
    };

    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            let value = range
                .get_value((row as u32, col as u32))
                .map(convert_value)
                .unwrap_or_default();
            let indent = indents.get(&(row, col)).copied().unwrap_or(0);
            cells.push(RawCell { value, indent });
        }
        rows.push(cells);
    }

    diagnostics.info(&format!(
        "Read sheet '{}' from {} ({} rows x {} columns)",
        sheet_name,
        path.display(),
        height,
        width
    ));

    Ok(RawSheet::from_rows(rows))
}

fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

/// Resolve the sheet part inside the package and map its cells to indent levels
pub fn read_indents(path: &Path, sheet_name: &str) -> Result<IndentMap> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let workbook_xml = read_zip_entry(&mut archive, "xl/workbook.xml")?
        .ok_or_else(|| TrnError::source_read("Workbook part xl/workbook.xml is missing"))?;
    let rel_id = find_sheet_rel_id(&workbook_xml, sheet_name)?
        .ok_or_else(|| TrnError::sheet_not_found(sheet_name))?;

    let rels_xml = read_zip_entry(&mut archive, "xl/_rels/workbook.xml.rels")?
        .ok_or_else(|| TrnError::source_read("Workbook relationships are missing"))?;
    let target = find_relationship_target(&rels_xml, &rel_id)?.ok_or_else(|| {
        TrnError::source_read(format!("No relationship target for sheet '{}'", sheet_name))
    })?;
    let sheet_part = resolve_part_path(&target);

    let style_indents = match read_zip_entry(&mut archive, "xl/styles.xml")? {
        Some(xml) => parse_style_indents(&xml)?,
        None => Vec::new(),
    };
    if style_indents.iter().all(|indent| *indent == 0) {
        return Ok(IndentMap::new());
    }

    let sheet_xml = read_zip_entry(&mut archive, &sheet_part)?
        .ok_or_else(|| TrnError::source_read(format!("Sheet part {} is missing", sheet_part)))?;
    parse_cell_indents(&sheet_xml, &style_indents)
}

fn read_zip_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name {
            let raw = std::str::from_utf8(&attr.value).map_err(quick_xml::Error::from)?;
            let value = unescape(raw).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Relationship id (`r:id`) of the `<sheet>` named `sheet_name`
fn find_sheet_rel_id(workbook_xml: &str, sheet_name: &str) -> Result<Option<String>> {
    let mut reader = XmlReader::from_str(workbook_xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if attribute(&e, b"name")?.as_deref() == Some(sheet_name) {
                    return attribute(&e, b"id");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn find_relationship_target(rels_xml: &str, rel_id: &str) -> Result<Option<String>> {
    let mut reader = XmlReader::from_str(rels_xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(&e, b"Id")?.as_deref() == Some(rel_id) {
                    return attribute(&e, b"Target");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Indent level of each `cellXfs` entry, indexed by style id
pub fn parse_style_indents(styles_xml: &str) -> Result<Vec<u32>> {
    let mut reader = XmlReader::from_str(styles_xml);
    let mut indents = Vec::new();
    let mut in_cell_xfs = false;
    let mut in_xf = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    indents.push(0);
                    in_xf = true;
                }
                b"alignment" if in_xf => set_last_indent(&mut indents, &e)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"xf" if in_cell_xfs => indents.push(0),
                b"alignment" if in_xf => set_last_indent(&mut indents, &e)?,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = false,
                b"xf" => in_xf = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(indents)
}

fn set_last_indent(indents: &mut [u32], alignment: &BytesStart<'_>) -> Result<()> {
    if let (Some(last), Some(indent)) = (indents.last_mut(), attribute(alignment, b"indent")?) {
        *last = indent.trim().parse().unwrap_or(0);
    }
    Ok(())
}

/// Map every styled cell of a worksheet part to its indent level
pub fn parse_cell_indents(sheet_xml: &str, style_indents: &[u32]) -> Result<IndentMap> {
    let mut reader = XmlReader::from_str(sheet_xml);
    let mut indents = IndentMap::new();
    // Positions for cells that omit the `r` attribute
    let mut row_cursor: Option<usize> = None;
    let mut col_cursor = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    let row = attribute(&e, b"r")?
                        .and_then(|r| r.trim().parse::<usize>().ok())
                        .and_then(|r| r.checked_sub(1))
                        .unwrap_or_else(|| row_cursor.map_or(0, |r| r + 1));
                    row_cursor = Some(row);
                    col_cursor = 0;
                }
                b"c" => {
                    let (row, col) = match attribute(&e, b"r")?.as_deref().and_then(parse_cell_ref) {
                        Some(pos) => pos,
                        None => (row_cursor.unwrap_or(0), col_cursor),
                    };
                    col_cursor = col + 1;

                    let style = attribute(&e, b"s")?.and_then(|s| s.trim().parse::<usize>().ok());
                    if let Some(indent) = style.and_then(|s| style_indents.get(s)) {
                        if *indent > 0 {
                            indents.insert((row, col), *indent);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(indents)
}

/// `"B12"` to `(11, 1)`
pub fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    let row: usize = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}
