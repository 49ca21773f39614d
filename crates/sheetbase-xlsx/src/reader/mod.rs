//! XLSX reader

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::reference::parse_cell_ref;
use sheetbase_core::{Column, Table, Value, Workbook, MAX_COLS, MAX_ROWS};

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    ///
    /// Sheets are returned in the order `xl/workbook.xml` lists them.
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        // Read shared strings (if present)
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        // Read workbook.xml to get sheet info
        let sheet_info = Self::read_workbook_xml(&mut archive)?;

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();
        for (name, r_id) in &sheet_info {
            let path = sheet_paths.get(r_id).ok_or_else(|| {
                XlsxError::InvalidFormat(format!(
                    "Sheet '{}' has no worksheet relationship '{}'",
                    name, r_id
                ))
            })?;
            let table = Self::read_worksheet(&mut archive, path, &shared_strings)?;
            log::debug!(
                "read sheet '{}' ({} rows x {} columns)",
                name,
                table.row_count(),
                table.column_count()
            );
            workbook.add_sheet(name.as_str(), table)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading and trailing spaces inside <t> are significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current_string.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    let name = attribute(&e, b"name")?;
                    let r_id = attribute(&e, b"r:id")?;

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let id = attribute(&e, b"Id")?;
                    let target = attribute(&e, b"Target")?;
                    let rel_type = attribute(&e, b"Type")?;

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet into a table (row 1 = headers)
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Table> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut grid = SheetGrid::default();

        // Position of the next row / cell when `r` attributes are omitted
        let mut next_row = 0usize;
        let mut current_row = 0usize;
        let mut next_col = 0usize;

        // Current cell state
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = row_position(&e, next_row)?;
                        next_row = current_row + 1;
                        next_col = 0;
                        grid.touch_row(current_row);
                    }
                    b"c" => {
                        cell = Some(PendingCell::start(&e, current_row, next_col)?);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"is" => {
                        if let Some(c) = cell.as_mut() {
                            c.inline = Some(String::new());
                        }
                    }
                    b"t" if cell.as_ref().is_some_and(|c| c.inline.is_some()) => {
                        in_inline_text = true;
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = row_position(&e, next_row)?;
                        next_row = current_row + 1;
                        next_col = 0;
                        grid.touch_row(current_row);
                    }
                    b"c" => {
                        // A cell with no content still occupies its column position
                        let pending = PendingCell::start(&e, current_row, next_col)?;
                        next_col = pending.col + 1;
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if let Some(c) = cell.as_mut() {
                        if in_value {
                            c.value.get_or_insert_with(String::new).push_str(&e.unescape()?);
                        } else if in_inline_text {
                            if let Some(text) = c.inline.as_mut() {
                                text.push_str(&e.unescape()?);
                            }
                        }
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            next_col = pending.col + 1;
                            let (row, col) = (pending.row, pending.col);
                            let value = pending.into_value(shared_strings)?;
                            grid.put(row, col, value);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        grid.into_table()
    }
}

/// Read an attribute value by key
fn attribute(e: &BytesStart, key: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// 0-based row index from a `<row r="..">` element
fn row_position(e: &BytesStart, fallback: usize) -> XlsxResult<usize> {
    let row = match attribute(e, b"r")? {
        Some(r) => {
            let r: usize = r
                .parse()
                .map_err(|_| XlsxError::Parse(format!("Invalid row number: {}", r)))?;
            if r == 0 {
                return Err(XlsxError::Parse("Row number must be >= 1".into()));
            }
            r - 1
        }
        None => fallback,
    };
    if row >= MAX_ROWS {
        return Err(XlsxError::Parse(format!(
            "Row number {} exceeds the limit of {}",
            row + 1,
            MAX_ROWS
        )));
    }
    Ok(row)
}

/// A `<c>` element being parsed
struct PendingCell {
    row: usize,
    col: usize,
    cell_type: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn start(e: &BytesStart, row: usize, next_col: usize) -> XlsxResult<Self> {
        let (row, col) = match attribute(e, b"r")? {
            Some(r) => parse_cell_ref(&r)?,
            None if next_col >= MAX_COLS => {
                return Err(XlsxError::Parse(format!(
                    "Row {} has more than {} cells",
                    row + 1,
                    MAX_COLS
                )))
            }
            None => (row, next_col),
        };
        Ok(Self {
            row,
            col,
            cell_type: attribute(e, b"t")?,
            value: None,
            inline: None,
        })
    }

    /// Convert the raw cell content according to its type attribute
    ///
    /// Formula cells carry their cached result in `<v>`, so they load as the
    /// last computed value. Error cells load as their text (`#N/A`).
    fn into_value(self, shared_strings: &[String]) -> XlsxResult<Value> {
        if let Some(text) = self.inline {
            return Ok(Value::string(decode_excel_escapes(&text)));
        }
        let Some(value) = self.value else {
            return Ok(Value::Empty);
        };

        let cell_value = match self.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                Value::string(s.as_str())
            }

            // Boolean
            Some("b") => {
                let v = value.trim();
                Value::Boolean(v == "1" || v.eq_ignore_ascii_case("true"))
            }

            // String results, errors, ISO dates
            Some("str") | Some("inlineStr") | Some("e") | Some("d") => {
                Value::string(decode_excel_escapes(&value))
            }

            // Number (default type or explicit "n")
            None | Some("n") => {
                let v = value.trim();
                if v.is_empty() {
                    Value::Empty
                } else {
                    match v.parse::<f64>() {
                        Ok(n) => Value::Number(n),
                        Err(_) => Value::string(value.as_str()),
                    }
                }
            }

            // Unknown type - treat as string
            Some(_) => Value::string(value),
        };

        Ok(cell_value)
    }
}

/// Cells collected from one worksheet before the header is applied
#[derive(Default)]
struct SheetGrid {
    cells: Vec<(usize, usize, Value)>,
    rows: usize,
    cols: usize,
}

impl SheetGrid {
    fn touch_row(&mut self, row: usize) {
        self.rows = self.rows.max(row + 1);
    }

    fn put(&mut self, row: usize, col: usize, value: Value) {
        self.touch_row(row);
        if !value.is_empty() {
            self.cols = self.cols.max(col + 1);
            self.cells.push((row, col, value));
        }
    }

    /// Row 1 becomes the column names; later rows become records
    fn into_table(self) -> XlsxResult<Table> {
        if self.rows == 0 {
            return Ok(Table::new());
        }

        let mut headers = vec![Value::Empty; self.cols];
        let data_rows = self.rows - 1;
        let mut columns = Vec::with_capacity(self.cols);
        for _ in 0..self.cols {
            columns.push(blank_column(data_rows)?);
        }

        for (row, col, value) in self.cells {
            if row == 0 {
                headers[col] = value;
            } else {
                columns[col][row - 1] = value;
            }
        }

        let names = header_names(&headers);
        let columns = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect();

        Ok(Table::from_columns(columns)?)
    }
}

/// A column of `len` empty cells, or an error when it cannot be allocated
fn blank_column(len: usize) -> XlsxResult<Vec<Value>> {
    let mut values = Vec::new();
    values.try_reserve_exact(len).map_err(|e| {
        XlsxError::InvalidFormat(format!("Sheet too large ({} rows): {}", len, e))
    })?;
    values.resize(len, Value::Empty);
    Ok(values)
}

/// Column names from header cells
///
/// Blank headers become `Unnamed: <index>`; repeated names get `.1`, `.2`, …
/// appended so every column name is unique.
fn header_names(headers: &[Value]) -> Vec<String> {
    let mut used = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());

    for (i, header) in headers.iter().enumerate() {
        let base = match header.to_string() {
            s if s.is_empty() => format!("Unnamed: {}", i),
            s => s,
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    /// Build a minimal package around the given worksheet XML parts
    fn package(sheets: &[(&str, &str)], shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            let mut workbook = String::from(r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
            let mut rels = String::from(r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
            for (i, (name, _)) in sheets.iter().enumerate() {
                workbook.push_str(&format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    name,
                    i + 1,
                    i + 1
                ));
                rels.push_str(&format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    i + 1,
                    i + 1
                ));
            }
            workbook.push_str("</sheets></workbook>");
            rels.push_str("</Relationships>");

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(workbook.as_bytes()).unwrap();
            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            for (i, (_, xml)) in sheets.iter().enumerate() {
                zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                    .unwrap();
                zip.write_all(xml.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_sheet() {
        let buf = package(
            &[("Sheet1", r#"<worksheet><sheetData></sheetData></worksheet>"#)],
            None,
        );
        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();

        assert_eq!(workbook.names().collect::<Vec<_>>(), vec!["Sheet1"]);
        assert_eq!(workbook.table("Sheet1"), Some(&Table::new()));
    }

    #[test]
    fn test_read_header_and_records() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>1</v></c><c r="B2" t="s"><v>2</v></c></row>
            <row r="3"><c r="A3"><v>2.5</v></c></row>
        </sheetData></worksheet>"#;
        let sst = r#"<sst><si><t>ID</t></si><si><t>Name</t></si><si><r><t>app</t></r><r><t>le</t></r></si></sst>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("Main", sheet)], Some(sst)))).unwrap();
        let table = workbook.table("Main").unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["ID", "Name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "Name"), Some(&Value::from("apple")));
        assert_eq!(table.value(1, "ID"), Some(&Value::from(2.5)));
        assert_eq!(table.value(1, "Name"), Some(&Value::Empty));
    }

    #[test]
    fn test_read_cell_types() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>v</t></is></c></row>
            <row r="2"><c r="A2" t="b"><v>1</v></c></row>
            <row r="3"><c r="A3" t="e"><v>#N/A</v></c></row>
            <row r="4"><c r="A4" t="str"><f>"x"&amp;"y"</f><v>xy</v></c></row>
            <row r="5"><c r="A5"><f>1+1</f><v>2</v></c></row>
            <row r="6"><c r="A6" t="inlineStr"><is><t xml:space="preserve">  padded  </t></is></c></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None))).unwrap();
        let values = workbook.table("T").unwrap().column("v").unwrap().values().to_vec();

        assert_eq!(
            values,
            vec![
                Value::Boolean(true),
                Value::from("#N/A"),
                Value::from("xy"),
                Value::from(2),
                Value::from("  padded  "),
            ]
        );
    }

    #[test]
    fn test_read_blank_and_duplicate_headers() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>x</t></is></c><c r="C1" t="inlineStr"><is><t>x</t></is></c></row>
            <row r="2"><c r="B2"><v>5</v></c></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None))).unwrap();
        let table = workbook.table("T").unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["x", "Unnamed: 1", "x.1"]
        );
        assert_eq!(table.value(0, "Unnamed: 1"), Some(&Value::from(5)));
    }

    #[test]
    fn test_read_cells_without_references() {
        let sheet = r#"<worksheet><sheetData>
            <row><c t="inlineStr"><is><t>a</t></is></c><c t="inlineStr"><is><t>b</t></is></c></row>
            <row><c/><c><v>7</v></c></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None))).unwrap();
        let table = workbook.table("T").unwrap();

        assert_eq!(table.value(0, "a"), Some(&Value::Empty));
        assert_eq!(table.value(0, "b"), Some(&Value::from(7)));
    }

    #[test]
    fn test_trailing_blank_rows_are_kept() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>ID</t></is></c></row>
            <row r="2"><c r="A2"><v>1</v></c></row>
            <row r="3"/>
            <row r="4"></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None))).unwrap();

        assert_eq!(workbook.table("T").unwrap().row_count(), 3);
    }

    #[test]
    fn test_sheet_order_follows_workbook_xml() {
        let empty = r#"<worksheet><sheetData/></worksheet>"#;
        let buf = package(&[("Zeta", empty), ("Alpha", empty), ("Mid", empty)], None);
        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();

        assert_eq!(
            workbook.names().collect::<Vec<_>>(),
            vec!["Zeta", "Alpha", "Mid"]
        );
    }

    #[test]
    fn test_row_beyond_sheet_limit() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>ID</t></is></c><c r="B1" t="inlineStr"><is><t>N</t></is></c></row>
            <row r="4000000000"/>
        </sheetData></worksheet>"#;
        let result = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None)));
        assert!(matches!(result, Err(XlsxError::Parse(_))));

        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>ID</t></is></c></row>
            <row><c r="A1048577"><v>1</v></c></row>
        </sheetData></worksheet>"#;
        let result = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None)));
        assert!(matches!(result, Err(XlsxError::Parse(_))));
    }

    #[test]
    fn test_last_allowed_row() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>ID</t></is></c></row>
            <row r="1048576"><c r="A1048576"><v>9</v></c></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(package(&[("T", sheet)], None))).unwrap();
        let table = workbook.table("T").unwrap();

        assert_eq!(table.row_count(), MAX_ROWS - 1);
        assert_eq!(table.value(MAX_ROWS - 2, "ID"), Some(&Value::from(9)));
    }

    #[test]
    fn test_not_a_zip() {
        let result = XlsxReader::read(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(XlsxError::Zip(_))));
    }

    #[test]
    fn test_header_names() {
        let names = header_names(&[
            Value::from("a"),
            Value::from("a"),
            Value::from("a.1"),
            Value::from(3),
            Value::from(""),
        ]);
        assert_eq!(names, vec!["a", "a.1", "a.1.1", "3", "Unnamed: 4"]);
    }
}
