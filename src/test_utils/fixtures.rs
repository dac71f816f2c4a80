//! In-memory release artifacts.

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Value, json};
use std::io::{Cursor, Write};

/// Build a `.tar.gz` containing `entries` as regular files (mode 0755).
pub fn build_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).expect("append tar entry");
    }

    builder.into_inner().expect("finish tar").finish().expect("finish gzip")
}

/// Like [`build_tar_gz`] but writes entry names verbatim into the header,
/// bypassing the path checks of `tar::Builder`. Used to build hostile archives.
pub fn build_tar_gz_raw_names(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        let gnu = header.as_gnu_mut().expect("gnu header");
        gnu.name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *data).expect("append tar entry");
    }

    builder.into_inner().expect("finish tar").finish().expect("finish gzip")
}

/// Build a `.zip` containing `entries`. Names ending in `/` become directories.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o755);

    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add zip directory");
        } else {
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(data).expect("write zip entry");
        }
    }

    writer.finish().expect("finish zip").into_inner()
}

/// JSON body of a release index response.
#[derive(Debug, Clone, Default)]
pub struct ReleaseFixture {
    pub tag: String,
    pub notes: String,
    pub assets: Vec<(String, String)>,
}

impl ReleaseFixture {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Add an asset with its download URL.
    pub fn asset(mut self, name: &str, url: impl Into<String>) -> Self {
        self.assets.push((name.to_string(), url.into()));
        self
    }

    pub fn to_json(&self) -> Value {
        let assets: Vec<Value> = self
            .assets
            .iter()
            .map(|(name, url)| json!({ "name": name, "browser_download_url": url }))
            .collect();

        json!({
            "tag_name": self.tag,
            "body": self.notes,
            "assets": assets,
        })
    }
}
