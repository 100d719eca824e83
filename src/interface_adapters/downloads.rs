use crate::domain::{Clock, DownloadError, DownloadSink};
use chrono::{NaiveDate, Utc};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

// Current UTC calendar date, the same day an ISO-8601 timestamp carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

// `<stem>_<YYYY-MM-DD>.<extension>`
pub fn dated_file_name(stem: &str, date: NaiveDate, extension: &str) -> String {
    format!("{stem}_{}.{extension}", date.format("%Y-%m-%d"))
}

// Saves downloads into a directory. Bytes are staged in a temporary file
// next to the destination and renamed into place; the staging file is
// removed on every path, including failures.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownloadSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        validate_file_name(file_name)?;
        std::fs::create_dir_all(&self.dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let destination = self.dir.join(file_name);
        staged
            .persist(&destination)
            .map_err(|err| DownloadError::Io(err.error))?;
        Ok(destination)
    }
}

// A download name is a single path component; anything else could escape
// the target directory.
fn validate_file_name(file_name: &str) -> Result<(), DownloadError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(DownloadError::InvalidFileName(file_name.to_string())),
    }
}
