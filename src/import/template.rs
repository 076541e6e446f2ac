//! Header-only CSV templates

use csv::WriterBuilder;

const BOM: &str = "\u{feff}";

/// Render a CSV containing only a header row built from `fields`
///
/// With `bom` set the output starts with a UTF-8 byte-order mark, which
/// spreadsheet applications need to detect the encoding of CJK headers.
pub fn render_template<S: AsRef<str>>(fields: &[S], bom: bool) -> Result<String, csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.as_ref()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let header = String::from_utf8_lossy(&bytes);
    Ok(if bom {
        format!("{}{}", BOM, header)
    } else {
        header.into_owned()
    })
}
