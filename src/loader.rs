//! Dataset retrieval and table parsing.
//!
//! Resolves the storm event file (explicit path, local cache or fresh
//! download), undoes bzip2 compression when present and parses the
//! comma-separated text into a [`DataFrame`] whose columns are all text.
//! Type conversion is left to the projector so that unused columns can
//! never fail the load.

use crate::config::AnalysisConfig;
use crate::constants::{BZIP2_MAGIC, PARTIAL_DOWNLOAD_SUFFIX};
use crate::error::{Result, StormError};

use bzip2::read::MultiBzDecoder;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Where the raw dataset comes from
#[derive(Debug, Clone)]
pub struct DatasetSource {
    url: String,
    cache_path: PathBuf,
    local_file: Option<PathBuf>,
}

impl DatasetSource {
    pub fn new(url: impl Into<String>, cache_path: PathBuf, local_file: Option<PathBuf>) -> Self {
        Self {
            url: url.into(),
            cache_path,
            local_file,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.cached_dataset_path(),
            config.data_file.clone(),
        )
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Return a local path to the dataset, downloading it only when no
    /// explicit file was given and the cache is empty
    pub async fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = &self.local_file {
            if !path.is_file() {
                return Err(StormError::DatasetNotFound { path: path.clone() });
            }
            debug!("Using local dataset file {}", path.display());
            return Ok(path.clone());
        }

        if let Ok(metadata) = fs::metadata(&self.cache_path).await {
            if metadata.is_file() && metadata.len() > 0 {
                info!("Using cached dataset {}", self.cache_path.display());
                return Ok(self.cache_path.clone());
            }
        }

        self.download().await?;
        Ok(self.cache_path.clone())
    }

    /// Stream the remote file into `<cache>.part`, then rename it into place
    async fn download(&self) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        info!("Downloading {} to {}", self.url, self.cache_path.display());
        let response = reqwest::get(&self.url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.download_error(e))?;

        let pb = match response.content_length() {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };
        pb.set_message("Downloading storm data");

        let partial = partial_path(&self.cache_path);
        let mut file = fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.download_error(e))?;
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        drop(file);

        fs::rename(&partial, &self.cache_path).await?;
        pb.finish_with_message("Download complete");
        Ok(())
    }

    fn download_error(&self, error: reqwest::Error) -> StormError {
        StormError::Download {
            url: self.url.clone(),
            reason: error.to_string(),
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    PathBuf::from(name)
}

/// Read a dataset file from disk, decompressing bzip2 content on the fly
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let raw = std::fs::read(path).map_err(|e| StormError::load(path, e.to_string()))?;

    let bytes = if raw.starts_with(BZIP2_MAGIC) {
        debug!("Decompressing bzip2 dataset {}", path.display());
        decompress_bzip2(&raw)
            .map_err(|e| StormError::load(path, format!("bzip2 decompression failed: {}", e)))?
    } else {
        raw
    };

    parse_table(bytes).map_err(|e| match e {
        StormError::Polars(err) => StormError::load(path, err.to_string()),
        other => other,
    })
}

fn decompress_bzip2(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = MultiBzDecoder::new(raw);
    let mut out = Vec::with_capacity(raw.len() * 8);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Parse comma-separated text with a header row; every column is read as text
pub fn parse_table(bytes: Vec<u8>) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    debug!(
        "Parsed table with {} rows and {} columns",
        frame.height(),
        frame.width()
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::Compression;
    use bzip2::write::BzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "STATE,EVTYPE,FATALITIES\nAL,TORNADO,3.00\nTX,\"HAIL, SMALL\",0.00\n";

    #[test]
    fn test_parse_table_reads_all_columns_as_text() {
        let frame = parse_table(SAMPLE.as_bytes().to_vec()).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 3);
        for column in frame.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }

        let evtype = frame.column("EVTYPE").unwrap().as_materialized_series();
        let values: Vec<_> = evtype.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("TORNADO"), Some("HAIL, SMALL")]);
    }

    #[test]
    fn test_read_table_plain_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storm.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let frame = read_table(&path).unwrap();
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn test_read_table_bzip2_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storm.csv.bz2");

        let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let frame = read_table(&path).unwrap();
        assert_eq!(frame.height(), 2);
        assert!(frame.column("FATALITIES").is_ok());
    }

    #[test]
    fn test_read_table_corrupt_bzip2() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.csv.bz2");
        std::fs::write(&path, b"BZh9 definitely not bzip2").unwrap();

        match read_table(&path) {
            Err(StormError::Load { path: p, reason }) => {
                assert_eq!(p, path);
                assert!(reason.contains("bzip2"));
            }
            other => panic!("Expected Load error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_table_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.csv");
        assert!(matches!(read_table(&path), Err(StormError::Load { .. })));
    }

    #[tokio::test]
    async fn test_resolve_missing_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.csv");
        let source = DatasetSource::new(
            "http://127.0.0.1:9/unused",
            temp_dir.path().join("cache.csv.bz2"),
            Some(missing.clone()),
        );

        match source.resolve().await {
            Err(StormError::DatasetNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected DatasetNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_prefers_cached_file() {
        let temp_dir = TempDir::new().unwrap();
        let cached = temp_dir.path().join("cache").join("storm.csv.bz2");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, SAMPLE).unwrap();

        // Unroutable URL: any download attempt would fail the test
        let source = DatasetSource::new("http://127.0.0.1:9/unused", cached.clone(), None);
        assert_eq!(source.resolve().await.unwrap(), cached);
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        let path = Path::new("/tmp/data/storm.csv.bz2");
        assert_eq!(
            partial_path(path),
            PathBuf::from("/tmp/data/storm.csv.bz2.part")
        );
    }
}
