//! Fetch-and-save for rendered audio.

use crate::tts::VoiceResult;
use futari_core::error::RenderingError;
use std::fs;
use std::path::{Path, PathBuf};

/// Downloads `url` to `save_path`. HTTP failures and I/O failures stay
/// distinguishable (`Download` vs `Io`).
pub fn download_file(
    client: &reqwest::blocking::Client,
    url: &str,
    save_path: &Path,
) -> VoiceResult<()> {
    let res = client
        .get(url)
        .send()
        .map_err(|e| RenderingError::Download(e.to_string()))?;
    if !res.status().is_success() {
        return Err(RenderingError::Download(format!(
            "HTTP {} fetching {url}",
            res.status()
        )));
    }
    let bytes = res
        .bytes()
        .map_err(|e| RenderingError::Download(e.to_string()))?;
    if let Some(parent) = save_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(save_path, &bytes)?;
    Ok(())
}

/// `{speaker}_{Y-m-d_H-M-S}.mp3` under `dir`, matching the reference file
/// naming.
pub fn audio_file_path(dir: &Path, speaker: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("{speaker}_{timestamp}.mp3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_file_path_is_speaker_and_timestamp() {
        let path = audio_file_path(Path::new("voices"), "アリス");
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("アリス_"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(path.parent().unwrap(), Path::new("voices"));
    }

    #[test]
    fn refused_connection_is_a_download_error() {
        // Nothing listens on port 1; the error class must be Download, not
        // a panic or a silent success.
        let client = reqwest::blocking::Client::new();
        let err = download_file(&client, "http://127.0.0.1:1/missing.mp3", Path::new("x.mp3"))
            .unwrap_err();
        assert!(matches!(err, RenderingError::Download(_)));
    }
}
