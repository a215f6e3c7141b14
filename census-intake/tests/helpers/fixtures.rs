//! Census spreadsheet fixtures

use std::path::Path;

use rust_xlsxwriter::Workbook;

/// Three members under assorted header spellings
pub const MEMBERS_CSV: &str = "\
First Name,LAST_NAME,E-mail,Phone Number,Zip,DOB,Shoe Size
ann,lee,Ann.Lee@Example.org,(555) 123-4567,2134,01/02/1985,9
BOB,o'brien-smith, bob@x.org ,555.010.9999,02134-1234,1985-03-04,10
cy,oh,,,,,11
";

/// Two spellings of the same person
pub const DUPLICATE_MEMBERS_CSV: &str = "\
Email,FIRST,Last Name
A@X.ORG ,ann,lee
a@x.org,Ann,LEE
";

/// Build an xlsx workbook whose first sheet holds `rows` as strings
pub fn xlsx_from_rows(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Write `contents` to `path`, creating parent directories
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
