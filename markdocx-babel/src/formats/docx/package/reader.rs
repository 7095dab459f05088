//! Named-part access to a DOCX (ZIP) package.

use crate::error::FormatError;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened package. Parts are read on demand.
pub struct PackageReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> PackageReader<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, zip::result::ZipError> {
        Ok(PackageReader {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Names of all entries, in archive order
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Raw bytes of a part, `None` when the part is absent
    pub fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, FormatError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(FormatError::ParseError(format!(
                    "Failed to open package part {name}: {e}"
                )))
            }
        };
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|e| {
            FormatError::ParseError(format!("Failed to read package part {name}: {e}"))
        })?;
        Ok(Some(data))
    }

    /// A part decoded as UTF-8 text (a leading byte-order mark is dropped)
    pub fn read_text(&mut self, name: &str) -> Result<Option<String>, FormatError> {
        let Some(bytes) = self.read_bytes(name)? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes).map_err(|e| {
            FormatError::ParseError(format!("Package part {name} is not UTF-8: {e}"))
        })?;
        Ok(Some(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        }))
    }
}
