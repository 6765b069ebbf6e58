use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};

pub const TEMPLATE_FILE_NAME: &str = "group_template.csv";
pub const TEMPLATE_MIME: &str = "text/csv;charset=utf-8";

const TEMPLATE: [(&str, &str); 12] = [
    ("First Name", "Example"),
    ("Last Name", "User"),
    ("Email", "foobar@example.com"),
    ("Position", "Systems Administrator"),
    ("Department", "Department of justice"),
    ("DepNumber", "1838"),
    ("Age", "41"),
    ("Gender", "Male"),
    ("Site", "Washington"),
    ("Phone", "+1 5124901128"),
    ("Degree", "Phd."),
    ("Desc", "Some serious person"),
];

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(csv_field).collect::<Vec<_>>().join(",")
}

/// Header plus one example row.
pub fn template_csv() -> String {
    format!(
        "{}\r\n{}",
        csv_line(TEMPLATE.iter().map(|(header, _)| *header)),
        csv_line(TEMPLATE.iter().map(|(_, example)| *example))
    )
}

/// Where the template goes: downloads, else home, else the working directory.
pub fn download_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn write_template(dir: &Path) -> std::io::Result<PathBuf> {
    let path = dir.join(TEMPLATE_FILE_NAME);
    fs::write(&path, template_csv())?;
    log::info!("Wrote CSV template ({}) to {}", TEMPLATE_MIME, path.display());
    Ok(path)
}

/// Only `.csv` and `.txt` files are sent to the import endpoint.
pub fn is_importable(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_header_and_example_row() {
        let csv = template_csv();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "First Name,Last Name,Email,Position,Department,DepNumber,Age,Gender,Site,Phone,Degree,Desc"
        );
        assert_eq!(
            lines[1],
            "Example,User,foobar@example.com,Systems Administrator,Department of justice,1838,41,Male,Washington,+1 5124901128,Phd.,Some serious person"
        );
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(csv_field("Smith, John"), "\"Smith, John\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn writes_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), TEMPLATE_FILE_NAME);
        assert_eq!(fs::read_to_string(path).unwrap(), template_csv());
    }

    #[test]
    fn import_accepts_csv_and_txt_only() {
        assert!(is_importable("contacts.csv"));
        assert!(is_importable("contacts.txt"));
        assert!(is_importable("CONTACTS.CSV"));
        assert!(is_importable("archive.2024.TxT"));
        assert!(!is_importable("contacts.pdf"));
        assert!(!is_importable("contacts"));
        assert!(!is_importable("contacts.csv.pdf"));
    }
}
