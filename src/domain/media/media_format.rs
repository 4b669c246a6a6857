//! Media format value object

use std::fmt;

/// Audio container formats accepted by the transcription service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp3,
    Mp4,
    Wav,
    Flac,
    Ogg,
    Webm,
}

impl MediaFormat {
    /// Get the service's wire value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
        }
    }

    /// Map a file extension (without the dot) to a format.
    ///
    /// `m4a` files are MPEG-4 audio and are submitted as `mp4`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "mp4" | "m4a" => Some(Self::Mp4),
            "wav" => Some(Self::Wav),
            "flac" => Some(Self::Flac),
            "ogg" => Some(Self::Ogg),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    /// Detect the format from a file name or object key
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || stem.ends_with('/') {
            return None;
        }
        Self::from_extension(ext)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(MediaFormat::from_extension("mp3"), Some(MediaFormat::Mp3));
        assert_eq!(MediaFormat::from_extension("m4a"), Some(MediaFormat::Mp4));
        assert_eq!(MediaFormat::from_extension("FLAC"), Some(MediaFormat::Flac));
        assert_eq!(MediaFormat::from_extension("txt"), None);
    }

    #[test]
    fn from_file_name_uses_last_extension() {
        assert_eq!(
            MediaFormat::from_file_name("calls/2024.01.05-call.wav"),
            Some(MediaFormat::Wav)
        );
        assert_eq!(MediaFormat::from_file_name("notes.wav.txt"), None);
    }

    #[test]
    fn from_file_name_rejects_missing_extension() {
        assert_eq!(MediaFormat::from_file_name("recording"), None);
        assert_eq!(MediaFormat::from_file_name(".mp3"), None);
        assert_eq!(MediaFormat::from_file_name("calls/.mp3"), None);
    }

    #[test]
    fn wire_values() {
        assert_eq!(MediaFormat::Mp4.to_string(), "mp4");
        assert_eq!(MediaFormat::Webm.as_str(), "webm");
    }
}
